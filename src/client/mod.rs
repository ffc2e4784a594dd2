//! All bits and pieces concerning the connection to a remote MockServer are in this module.
//!
//! `exposed_client::MockServerClient` is the front-end crate users interact with: it turns
//! [`Expectation`]s and [`RequestPattern`]s into payloads and interprets the server answers.
//! `builder::MockServerClientBuilder` collects its configuration.
//!
//! [`Expectation`]: crate::Expectation
//! [`RequestPattern`]: crate::RequestPattern
mod builder;
mod exposed_client;

pub use builder::MockServerClientBuilder;
pub use exposed_client::MockServerClient;
