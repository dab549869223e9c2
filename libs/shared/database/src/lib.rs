pub mod api;
pub mod store;

pub use api::{paths, ApiResponse, ApiTransport, HmsApiClient};
pub use store::{keys, FileStore, KeyValueStore, MemoryStore};
