pub mod credentials;
mod db;
mod memory;
pub mod pagination;
mod schema;
mod storage;
pub mod token;

pub use credentials::{CredentialError, CustomerCredentials};
pub use db::*;
pub use memory::*;
pub use pagination::{Page, PaginationError};
pub use schema::*;
pub use storage::*;
pub use token::{ADMIN_ROLE, TokenError, VerifiedClaims};
