//! Convenient re-exports of http types that are part of `mockserver_client`'s public API.
pub use http::{Method, StatusCode};
pub use url::Url;
