//! The in-memory test server.

use crate::app::AppBuilder;
use crate::client::Client;
use crate::error::HostError;
use crate::types::Handler;
use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use std::sync::Arc;

/// An in-memory HTTP server for a single application under test.
///
/// Created from an application-configuration callback; dispatches requests
/// directly into the configured pipeline without ever touching a socket.
///
/// # Example
///
/// ```ignore
/// let server = TestServer::create(|app| {
///     app.run(my_pipeline);
/// })?;
/// let client = server.client();
/// ```
pub struct TestServer {
    handler: Handler,
}

impl TestServer {
    /// Creates a server by running `configure` against a fresh
    /// [`AppBuilder`].
    ///
    /// The callback runs exactly once, here; the server keeps whatever
    /// handler it installed for the rest of its lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NoApplication`] if the callback never called
    /// [`AppBuilder::run`].
    pub fn create<F>(configure: F) -> Result<Self, HostError>
    where
        F: FnOnce(&mut AppBuilder),
    {
        let mut app = AppBuilder::new();
        configure(&mut app);
        let handler = app.build()?;
        tracing::debug!("in-memory test server created");
        Ok(Self { handler })
    }

    /// Creates a server whose application echoes the request method and
    /// path back as a JSON body.
    pub fn echo() -> Self {
        Self {
            handler: Arc::new(|req| {
                Box::pin(async move {
                    let body = serde_json::json!({
                        "method": req.method().as_str(),
                        "path": req.uri().path(),
                    });
                    http::Response::builder()
                        .status(StatusCode::OK)
                        .header("content-type", "application/json")
                        .body(Full::new(Bytes::from(body.to_string())))
                        .expect("valid response")
                })
            }),
        }
    }

    /// Creates a server whose application always returns a fixed status
    /// and body.
    pub fn fixed_response(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            handler: Arc::new(move |_req| {
                let body = body.clone();
                Box::pin(async move {
                    http::Response::builder()
                        .status(status)
                        .body(Full::new(Bytes::from(body)))
                        .expect("valid response")
                })
            }),
        }
    }

    /// Hands out a client that calls this server's pipeline.
    ///
    /// Clients are cheap to create; each carries its own default-header
    /// set but they all dispatch into the same pipeline.
    #[must_use]
    pub fn client(&self) -> Client {
        Client::new(Arc::clone(&self.handler))
    }

    /// Releases the server.
    ///
    /// Dropping has the same effect; this exists so teardown code can be
    /// explicit about when the application pipeline goes away.
    pub fn close(self) {
        tracing::debug!("in-memory test server closed");
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn request(method: Method, path: &str) -> crate::Request {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn create_runs_configure_once() {
        let mut calls = 0;
        let server = TestServer::create(|app| {
            calls += 1;
            app.run(|_req| async {
                http::Response::builder()
                    .status(200)
                    .body(Full::new(Bytes::from("hi")))
                    .unwrap()
            });
        })
        .unwrap();

        assert_eq!(calls, 1);
        let response = server
            .client()
            .send(request(Method::GET, "/x"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn create_without_handler_fails() {
        let result = TestServer::create(|_app| {});
        assert!(matches!(result, Err(HostError::NoApplication)));
    }

    #[tokio::test]
    async fn echo_reports_method_and_path() {
        let server = TestServer::echo();
        let response = server
            .client()
            .send(request(Method::DELETE, "/items/7"))
            .await
            .unwrap();

        use http_body_util::BodyExt;
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["method"], "DELETE");
        assert_eq!(value["path"], "/items/7");
    }

    #[tokio::test]
    async fn fixed_response_is_fixed() {
        let server = TestServer::fixed_response(StatusCode::IM_A_TEAPOT, "short and stout");
        let response = server
            .client()
            .send(request(Method::GET, "/anything"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
