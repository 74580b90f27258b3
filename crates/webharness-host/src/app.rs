//! Application-configuration surface.

use crate::error::HostError;
use crate::types::{Handler, Request, Response};
use std::future::Future;
use std::sync::Arc;

/// The configuration surface handed to an application-configuration
/// callback.
///
/// The callback installs the pipeline's terminal handler with [`run`].
/// Routing, middleware, and business logic all live inside that handler;
/// the host only cares that there is exactly one entry point.
///
/// [`run`]: AppBuilder::run
#[must_use]
pub struct AppBuilder {
    handler: Option<Handler>,
}

impl AppBuilder {
    pub(crate) fn new() -> Self {
        Self { handler: None }
    }

    /// Installs the terminal handler for the application.
    ///
    /// Calling `run` again replaces the previously installed handler.
    ///
    /// # Example
    ///
    /// ```ignore
    /// app.run(|req| async move {
    ///     http::Response::builder()
    ///         .status(200)
    ///         .body(Full::new(Bytes::from("OK")))
    ///         .expect("valid response")
    /// });
    /// ```
    pub fn run<F, Fut>(&mut self, handler: F)
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.handler = Some(Arc::new(move |req| Box::pin(handler(req))));
    }

    /// Finishes configuration, yielding the installed handler.
    pub(crate) fn build(self) -> Result<Handler, HostError> {
        self.handler.ok_or(HostError::NoApplication)
    }
}
