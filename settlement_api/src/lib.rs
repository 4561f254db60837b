pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod state;
pub mod views;

pub use config::AppConfig;
pub use error::ApiError;
pub use handlers::configure;
pub use state::AppState;
