//! Common types for the in-memory host.
//!
//! Requests and responses are standard `http` types with a `Full<Bytes>`
//! body, so handlers written for the host look like handlers written for a
//! real server.

use bytes::Bytes;
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The HTTP request type dispatched into the hosted pipeline.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by the hosted pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// The boxed future a [`Handler`] returns.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// The terminal application handler installed via
/// [`AppBuilder::run`](crate::AppBuilder::run).
pub type Handler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;
