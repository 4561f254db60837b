mod admin;
mod order;

pub use admin::*;
pub use order::*;
