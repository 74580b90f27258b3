//! The request harness.

use crate::content;
use crate::error::HarnessError;
use crate::response::AssertableResponse;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::Method;
use http_body_util::{BodyExt, Full};
use parking_lot::Mutex;
use webharness_host::{AppBuilder, Client, HostError, TestServer};

type ConfigureApp = Box<dyn FnOnce(&mut AppBuilder) + Send>;
type LogSink = Box<dyn Fn(&str) + Send + Sync>;
type ClientConfig = Box<dyn Fn(&mut Client) + Send + Sync>;

/// The hosted server and its shared client, created on first use.
struct Started {
    server: TestServer,
    client: Client,
}

/// Memoized startup state: the one-shot configuration callback until the
/// first verb call, the started server afterwards.
struct Slot {
    configure: Option<ConfigureApp>,
    started: Option<Started>,
}

/// Drives an in-process web API from tests.
///
/// Built from an application-configuration callback; the hosted server is
/// created lazily on the first verb call and reused for every call after
/// that, so constructing a harness is free until a request is actually
/// made.
///
/// Each verb method returns a [`HarnessRequest`] builder. Calls enforce a
/// 2xx status by default and always write a diagnostic line (verb, path,
/// and full response detail) to the log sink before any success-check
/// failure is raised.
///
/// Concurrent first use is serialized by a lock, but the configuration
/// callback is consumed when it runs: if it panics, the harness cannot be
/// started again. Trigger startup from a single caller before sharing the
/// harness.
///
/// # Example
///
/// ```ignore
/// let harness = Harness::new(|app| app.run(my_application))
///     .with_log_sink(|line| println!("{line}"));
///
/// let response = harness.get("/health").send().await?;
/// assert!(response.is_success());
/// ```
pub struct Harness {
    slot: Mutex<Slot>,
    log_sink: Option<LogSink>,
    client_config: Option<ClientConfig>,
}

impl Harness {
    /// Creates a harness for the application configured by `configure_app`.
    ///
    /// The callback is not invoked here; it runs exactly once, on the first
    /// verb call.
    pub fn new<F>(configure_app: F) -> Self
    where
        F: FnOnce(&mut AppBuilder) + Send + 'static,
    {
        Self {
            slot: Mutex::new(Slot {
                configure: Some(Box::new(configure_app)),
                started: None,
            }),
            log_sink: None,
            client_config: None,
        }
    }

    /// Sets the diagnostic log sink.
    ///
    /// The sink receives one line per verb call. Without a sink the
    /// diagnostics are silently dropped (the `tracing` events remain).
    #[must_use]
    pub fn with_log_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.log_sink = Some(Box::new(sink));
        self
    }

    /// Sets a client-configuration hook applied before every call.
    ///
    /// The hook mutates the shared client, so changes it makes (default
    /// headers, for instance) persist across calls.
    #[must_use]
    pub fn with_client_config<F>(mut self, config: F) -> Self
    where
        F: Fn(&mut Client) + Send + Sync + 'static,
    {
        self.client_config = Some(Box::new(config));
        self
    }

    /// Starts a GET request.
    pub fn get(&self, path: impl Into<String>) -> HarnessRequest<'_> {
        self.request(Method::GET, path)
    }

    /// Starts a POST request.
    pub fn post(&self, path: impl Into<String>) -> HarnessRequest<'_> {
        self.request(Method::POST, path)
    }

    /// Starts a PUT request.
    pub fn put(&self, path: impl Into<String>) -> HarnessRequest<'_> {
        self.request(Method::PUT, path)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, path: impl Into<String>) -> HarnessRequest<'_> {
        self.request(Method::DELETE, path)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, path: impl Into<String>) -> HarnessRequest<'_> {
        self.request(Method::PATCH, path)
    }

    /// Starts an OPTIONS request.
    pub fn options(&self, path: impl Into<String>) -> HarnessRequest<'_> {
        self.request(Method::OPTIONS, path)
    }

    /// Starts a request with an arbitrary method.
    pub fn request(&self, method: Method, path: impl Into<String>) -> HarnessRequest<'_> {
        HarnessRequest {
            harness: self,
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
            ensure_success: true,
            client_config: None,
        }
    }

    /// Starts the hosted server if this is the first call, applies the
    /// client-configuration hooks, and returns a snapshot of the shared
    /// client for this call.
    fn client_for_call(
        &self,
        per_call: Option<Box<dyn FnOnce(&mut Client) + Send + '_>>,
    ) -> Result<Client, HarnessError> {
        let mut slot = self.slot.lock();

        if slot.started.is_none() {
            // The callback is gone only if a previous startup panicked.
            let configure = slot.configure.take().ok_or(HostError::NoApplication)?;
            let server = TestServer::create(configure)?;
            let client = server.client();
            slot.started = Some(Started { server, client });
            tracing::debug!("hosted server started on first use");
        }

        let Some(started) = slot.started.as_mut() else {
            return Err(HostError::NoApplication.into());
        };

        if let Some(config) = &self.client_config {
            config(&mut started.client);
        }
        if let Some(config) = per_call {
            config(&mut started.client);
        }

        Ok(started.client.clone())
    }

    fn emit(&self, line: &str) {
        if let Some(sink) = &self.log_sink {
            sink(line);
        }
    }
}

impl Drop for Harness {
    /// Releases the hosted server if and only if it was ever created.
    fn drop(&mut self) {
        if let Some(started) = self.slot.get_mut().started.take() {
            started.server.close();
        }
    }
}

/// One pending verb call against a [`Harness`].
///
/// Sending enforces a successful status by default; disable that with
/// [`ensure_success(false)`](HarnessRequest::ensure_success) to inspect
/// failure responses directly.
#[must_use]
pub struct HarnessRequest<'a> {
    harness: &'a Harness,
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Result<Bytes, serde_json::Error>>,
    ensure_success: bool,
    client_config: Option<Box<dyn FnOnce(&mut Client) + Send + 'a>>,
}

impl<'a> HarnessRequest<'a> {
    /// Attaches a JSON payload: serialized with indentation and sent as
    /// `application/json; charset=utf-8`.
    ///
    /// Serialization happens now; a failure surfaces unchanged from
    /// [`send`](HarnessRequest::send). Every verb may carry a payload,
    /// including PATCH and OPTIONS.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.body = Some(content::json_content(value));
        self
    }

    /// Sets a header on this request only.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Controls whether [`send`](HarnessRequest::send) fails on a non-2xx
    /// status. Defaults to `true`.
    pub fn ensure_success(mut self, ensure: bool) -> Self {
        self.ensure_success = ensure;
        self
    }

    /// Applies a one-shot client-configuration hook immediately before
    /// this call.
    ///
    /// Runs after the harness-level hook; mutations persist on the shared
    /// client.
    pub fn configure_client<F>(mut self, config: F) -> Self
    where
        F: FnOnce(&mut Client) + Send + 'a,
    {
        self.client_config = Some(Box::new(config));
        self
    }

    /// Issues the call and returns the captured response.
    ///
    /// The first call on a harness also starts the hosted server. The
    /// diagnostic log line is emitted before the success check, so failing
    /// calls still show the full response.
    ///
    /// # Errors
    ///
    /// [`HarnessError::UnsuccessfulStatus`] when success is enforced and
    /// the status is outside 2xx; transport, serialization, and
    /// request-assembly failures pass through unchanged.
    pub async fn send(self) -> Result<AssertableResponse, HarnessError> {
        let Self {
            harness,
            method,
            path,
            headers,
            body,
            ensure_success,
            client_config,
        } = self;

        let client = harness.client_for_call(client_config)?;

        let mut builder = http::Request::builder()
            .method(method.clone())
            .uri(path.as_str());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let payload = match body {
            Some(encoded) => {
                builder = builder.header(CONTENT_TYPE, content::JSON_CONTENT_TYPE);
                encoded?
            }
            None => Bytes::new(),
        };
        let request = builder.body(Full::new(payload))?;

        let response = client.send(request).await?;
        let (parts, response_body) = response.into_parts();
        let bytes = match response_body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(infallible) => match infallible {},
        };
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let capture = AssertableResponse::new(parts.status, text, parts.headers);

        harness.emit(&format!("{method} {path}\nResponse:\n{capture}"));
        tracing::debug!(
            method = %method,
            path = %path,
            status = capture.status().as_u16(),
            "verb call completed"
        );

        if ensure_success {
            capture.ensure_success()?;
        }

        Ok(capture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// An application that answers 200 `OK` to everything.
    fn ok_app(app: &mut AppBuilder) {
        app.run(|_req| async {
            http::Response::builder()
                .status(StatusCode::OK)
                .body(Full::new(Bytes::from("OK")))
                .unwrap()
        });
    }

    /// An application that echoes method, content type, and payload back
    /// as JSON.
    fn echo_app(app: &mut AppBuilder) {
        app.run(|req| async move {
            let method = req.method().to_string();
            let content_type = req
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let bytes = req.into_body().collect().await.unwrap().to_bytes();
            let body = serde_json::json!({
                "method": method,
                "content_type": content_type,
                "payload": String::from_utf8_lossy(&bytes),
            });
            http::Response::builder()
                .status(StatusCode::OK)
                .header(CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from(body.to_string())))
                .unwrap()
        });
    }

    /// An application that echoes the `x-test` request header back as the
    /// body.
    fn header_echo_app(app: &mut AppBuilder) {
        app.run(|req| async move {
            let value = req
                .headers()
                .get("x-test")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("absent")
                .to_string();
            http::Response::builder()
                .status(StatusCode::OK)
                .body(Full::new(Bytes::from(value)))
                .unwrap()
        });
    }

    #[tokio::test]
    async fn startup_happens_exactly_once() {
        let startups = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&startups);
        let harness = Harness::new(move |app| {
            counter.fetch_add(1, Ordering::SeqCst);
            ok_app(app);
        });

        assert_eq!(startups.load(Ordering::SeqCst), 0, "startup must be lazy");
        harness.get("/one").send().await.unwrap();
        harness.get("/two").send().await.unwrap();
        assert_eq!(startups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_verb_reaches_the_application() {
        let harness = Harness::new(echo_app);

        for (request, expected) in [
            (harness.get("/r"), "GET"),
            (harness.post("/r"), "POST"),
            (harness.put("/r"), "PUT"),
            (harness.delete("/r"), "DELETE"),
            (harness.patch("/r"), "PATCH"),
            (harness.options("/r"), "OPTIONS"),
        ] {
            let response = request.send().await.unwrap();
            let seen: serde_json::Value = response.json().unwrap();
            assert_eq!(seen["method"], expected);
        }
    }

    #[tokio::test]
    async fn json_payload_is_indented_and_tagged() {
        let harness = Harness::new(echo_app);
        let response = harness
            .post("/items")
            .json(&serde_json::json!({"name": "x"}))
            .send()
            .await
            .unwrap();

        let seen: serde_json::Value = response.json().unwrap();
        assert_eq!(seen["content_type"], "application/json; charset=utf-8");
        assert_eq!(seen["payload"], "{\n  \"name\": \"x\"\n}");
    }

    #[tokio::test]
    async fn patch_and_options_carry_their_payload() {
        let harness = Harness::new(echo_app);

        for request in [harness.patch("/r"), harness.options("/r")] {
            let response = request
                .json(&serde_json::json!({"k": 1}))
                .send()
                .await
                .unwrap();
            let seen: serde_json::Value = response.json().unwrap();
            assert_eq!(seen["payload"], "{\n  \"k\": 1\n}");
        }
    }

    #[tokio::test]
    async fn failure_is_logged_before_it_is_raised() {
        let lines = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink_lines = Arc::clone(&lines);
        let harness = Harness::new(|app| {
            app.run(|_req| async {
                http::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Full::new(Bytes::from("boom")))
                    .unwrap()
            });
        })
        .with_log_sink(move |line| sink_lines.lock().push(line.to_string()));

        let err = harness.get("/explode").send().await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("InternalServerError"), "{message}");
        assert!(message.contains("boom"), "{message}");

        let lines = lines.lock();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("GET /explode\nResponse:\n"), "{}", lines[0]);
        assert!(lines[0].contains("StatusCode: InternalServerError"), "{}", lines[0]);
    }

    #[tokio::test]
    async fn ensure_success_can_be_disabled() {
        let harness = Harness::new(|app| {
            app.run(|_req| async {
                http::Response::builder()
                    .status(StatusCode::BAD_REQUEST)
                    .body(Full::new(Bytes::from("nope")))
                    .unwrap()
            });
        });

        let response = harness
            .get("/bad")
            .ensure_success(false)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body(), "nope");
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn harness_level_client_config_runs_before_every_call() {
        let applications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&applications);
        let harness = Harness::new(header_echo_app).with_client_config(move |client| {
            counter.fetch_add(1, Ordering::SeqCst);
            client.insert_default_header("x-test", "configured").unwrap();
        });

        let first = harness.get("/").send().await.unwrap();
        let second = harness.get("/").send().await.unwrap();
        assert_eq!(first.body(), "configured");
        assert_eq!(second.body(), "configured");
        assert_eq!(applications.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn per_call_client_config_persists_on_the_shared_client() {
        let harness = Harness::new(header_echo_app);

        let configured = harness
            .get("/")
            .configure_client(|client| {
                client.insert_default_header("x-test", "one-shot").unwrap();
            })
            .send()
            .await
            .unwrap();
        assert_eq!(configured.body(), "one-shot");

        // The hook mutated the shared client, so the header survives.
        let following = harness.get("/").send().await.unwrap();
        assert_eq!(following.body(), "one-shot");
    }

    #[tokio::test]
    async fn per_request_header_is_sent() {
        let harness = Harness::new(header_echo_app);
        let response = harness
            .get("/")
            .header("x-test", "inline")
            .send()
            .await
            .unwrap();
        assert_eq!(response.body(), "inline");
    }

    #[tokio::test]
    async fn invalid_path_fails_request_assembly() {
        let harness = Harness::new(ok_app);
        let err = harness.get("http://[bad").send().await.unwrap_err();
        assert!(matches!(err, HarnessError::InvalidRequest(_)));
    }
}
