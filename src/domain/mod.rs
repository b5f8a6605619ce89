pub mod catalog;
pub mod errors;
pub mod models;
pub mod services;

pub use catalog::*;
pub use errors::*;
pub use models::*;
pub use services::*;
