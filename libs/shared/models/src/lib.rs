pub mod auth;
pub mod error;

pub use auth::Identity;
pub use error::StorageError;
