#[macro_use]
mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{BankCountry, InMemoryStorage, OrderStatus};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use settlement_api::views::{CustomerOrder, OrderEnvelope};

use support::*;

#[actix_web::test]
async fn create_then_fetch_order() {
    let app = test::init_service(app(state(InMemoryStorage::new()))).await;

    let id = create_order!(&app, order_body());
    assert!(id > 0);

    let req = test::TestRequest::get()
        .uri(&format!("/customer/order?id={id}"))
        .insert_header(("X-API-Key", API_KEY))
        .insert_header(("X-Merchant-Name", MERCHANT))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let order = &body["order"];
    assert_eq!(order["id"], id);
    assert_eq!(order["status"], "Processing");
    assert_eq!(order["transaction_network"], "TRON");
    assert_eq!(order["transaction_asset"], "USDT");
    assert_eq!(order["bank_country"], "Canada");
    assert_eq!(order["amount"], 1500.5);
    assert_eq!(order["reference_note"], "invoice 42");
    assert!(order.get("merchant_name").is_none());
    assert!(order.get("created_at").is_some());

    let typed: OrderEnvelope<CustomerOrder> = serde_json::from_value(body).unwrap();
    assert_eq!(typed.order.amount, Some(dec!(1500.5)));
    assert_eq!(typed.order.status, OrderStatus::Processing);
    assert_eq!(typed.order.bank_country, BankCountry::Canada);
}

#[actix_web::test]
async fn blank_note_and_missing_amount_are_stored_as_null() {
    let app = test::init_service(app(state(InMemoryStorage::new()))).await;

    let mut body = order_body();
    body["reference_note"] = json!("   ");
    body.as_object_mut().unwrap().remove("amount");
    body["bank_country"] = json!("United States");
    body["transaction_network"] = json!("Ethereum");
    let id = create_order!(&app, body);

    let req = test::TestRequest::get()
        .uri(&format!("/customer/order?id={id}"))
        .insert_header(("X-API-Key", API_KEY))
        .insert_header(("X-Merchant-Name", MERCHANT))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["order"]["reference_note"], Value::Null);
    assert_eq!(body["order"]["amount"], Value::Null);
    assert_eq!(body["order"]["bank_country"], "United States");
    assert_eq!(body["order"]["transaction_network"], "Ethereum");
}

#[actix_web::test]
async fn body_is_read_as_json_whatever_the_content_type() {
    let app = test::init_service(app(state(InMemoryStorage::new()))).await;

    let req = test::TestRequest::post()
        .uri("/customer/createOrder")
        .insert_header(("X-API-Key", API_KEY))
        .insert_header(("X-Merchant-Name", MERCHANT))
        .insert_header(("Content-Type", "text/plain"))
        .set_payload(order_body().to_string())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["id"].as_i64().unwrap() > 0);

    let req = test::TestRequest::post()
        .uri("/customer/createOrder")
        .insert_header(("X-API-Key", API_KEY))
        .insert_header(("X-Merchant-Name", MERCHANT))
        .set_payload("not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid json body");
}

#[actix_web::test]
async fn customer_credentials_must_match() {
    let app = test::init_service(app(state(InMemoryStorage::new()))).await;

    for (key, merchant) in [
        (Some("wrong-key"), Some(MERCHANT)),
        (Some(API_KEY), Some("Other Merchant")),
        (None, Some(MERCHANT)),
        (Some(API_KEY), None),
    ] {
        let mut req = test::TestRequest::post()
            .uri("/customer/createOrder")
            .set_json(order_body());
        if let Some(key) = key {
            req = req.insert_header(("X-API-Key", key));
        }
        if let Some(merchant) = merchant {
            req = req.insert_header(("X-Merchant-Name", merchant));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{key:?} {merchant:?}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "unauthorized");
    }

    let req = test::TestRequest::get()
        .uri("/customer/orders")
        .insert_header(("X-API-Key", "wrong-key"))
        .insert_header(("X-Merchant-Name", MERCHANT))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn create_rejects_invalid_payloads() {
    let app = test::init_service(app(state(InMemoryStorage::new()))).await;

    let cases = [
        ("transaction_network", json!("SOLANA"), "invalid transaction_network"),
        ("transaction_asset", json!("DAI"), "invalid transaction_asset"),
        ("bank_country", json!("Mexico"), "invalid bank_country"),
        ("amount", json!(-10), "amount must be non-negative"),
    ];

    for (field, value, message) in cases {
        let mut body = order_body();
        body[field] = value;
        let req = test::TestRequest::post()
            .uri("/customer/createOrder")
            .insert_header(("X-API-Key", API_KEY))
            .insert_header(("X-Merchant-Name", MERCHANT))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{field}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], message);
    }

    let mut body = order_body();
    body.as_object_mut().unwrap().remove("iban");
    let req = test::TestRequest::post()
        .uri("/customer/createOrder")
        .insert_header(("X-API-Key", API_KEY))
        .insert_header(("X-Merchant-Name", MERCHANT))
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "missing required fields");
}

#[actix_web::test]
async fn orders_are_scoped_to_the_merchant() {
    let storage = InMemoryStorage::new();
    let app = test::init_service(app(state(storage.clone()))).await;

    let own = create_order!(&app, order_body());
    let own_second = create_order!(&app, order_body());

    let foreign = {
        let draft: common::OrderDraft = serde_json::from_value(order_body()).unwrap();
        let order = draft.validate().unwrap();
        common::Storage::insert_order(&storage, "Other Merchant", &order)
            .await
            .unwrap()
    };

    let req = test::TestRequest::get()
        .uri("/customer/orders?page=1&page_size=10")
        .insert_header(("X-API-Key", API_KEY))
        .insert_header(("X-Merchant-Name", MERCHANT))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: Value = test::read_body_json(resp).await;
    assert_eq!(list["total"], 2);
    assert_eq!(list["page"], 1);
    assert_eq!(list["page_size"], 10);
    let ids: Vec<i64> = list["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![own_second, own]);

    let req = test::TestRequest::get()
        .uri(&format!("/customer/order?id={foreign}"))
        .insert_header(("X-API-Key", API_KEY))
        .insert_header(("X-Merchant-Name", MERCHANT))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "order not found");

    let req = test::TestRequest::get()
        .uri("/customer/orders?page_size=0")
        .insert_header(("X-API-Key", API_KEY))
        .insert_header(("X-Merchant-Name", MERCHANT))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn wrong_method_returns_json_405() {
    let app = test::init_service(app(state(InMemoryStorage::new()))).await;

    for (method, uri) in [
        (actix_web::http::Method::GET, "/customer/createOrder"),
        (actix_web::http::Method::POST, "/customer/orders"),
        (actix_web::http::Method::GET, "/admin/login"),
        (actix_web::http::Method::DELETE, "/health"),
    ] {
        let req = test::TestRequest::default()
            .method(method)
            .uri(uri)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "method not allowed");
    }
}

#[actix_web::test]
async fn health_reports_ok() {
    let app = test::init_service(app(state(InMemoryStorage::new()))).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "status": "ok" }));
}
