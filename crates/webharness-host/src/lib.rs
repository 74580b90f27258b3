//! # Webharness Host
//!
//! The hosted-server capability for `webharness`: an in-memory HTTP
//! "server" that runs an application pipeline without binding to a real
//! network socket, plus the pipeline-callable client used to drive it.
//!
//! Tests configure an application by installing a terminal handler on an
//! [`AppBuilder`]; the resulting [`TestServer`] dispatches requests straight
//! into that handler, so there are no ports, no listeners, and no flaky
//! network I/O.
//!
//! ## Example
//!
//! ```ignore
//! use webharness_host::{Response, TestServer};
//! use bytes::Bytes;
//! use http_body_util::Full;
//!
//! let server = TestServer::create(|app| {
//!     app.run(|_req| async {
//!         http::Response::builder()
//!             .status(200)
//!             .body(Full::new(Bytes::from("OK")))
//!             .expect("valid response")
//!     });
//! })?;
//!
//! let client = server.client();
//! let response = client.send(request).await?;
//! ```

#![doc(html_root_url = "https://docs.rs/webharness-host/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod client;
mod error;
mod server;
mod types;

pub use app::AppBuilder;
pub use client::Client;
pub use error::HostError;
pub use server::TestServer;
pub use types::{Handler, HandlerFuture, Request, Response};
