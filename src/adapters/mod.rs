// Adapters layer: concrete implementations of the domain ports (local files, HTTP API).

pub mod http;
pub mod storage;

pub use http::HttpCastApi;
pub use storage::LocalStorage;
