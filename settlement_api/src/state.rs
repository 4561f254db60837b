use std::sync::Arc;

use common::{CustomerCredentials, Storage};

use crate::config::AuthConfig;

/// Shared, read-only state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub auth: AuthConfig,
    pub customer: CustomerCredentials,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, auth: AuthConfig, customer: CustomerCredentials) -> Self {
        AppState {
            storage,
            auth,
            customer,
        }
    }
}
