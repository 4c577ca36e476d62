//! HTTP/JSON client for the place-pinning backend.
//!
//! Client logic is written against the [`Transport`] trait so every flow
//! (including the transparent refresh-and-retry on 401) can be exercised in
//! tests with scripted exchanges; `ReqwestTransport` is the production
//! implementation for native hosts.

pub mod client;
pub mod error;
pub mod feed;
pub mod places;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use feed::FeedPager;
pub use places::PlacesClient;
pub use transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};

#[cfg(not(target_arch = "wasm32"))]
pub use transport::ReqwestTransport;
