//! The pipeline-callable client.

use crate::error::HostError;
use crate::types::{Handler, Request, Response};
use http::{HeaderName, HeaderValue};

/// A client bound to one [`TestServer`](crate::TestServer)'s pipeline.
///
/// The client carries a persistent set of default headers that are applied
/// to every outgoing request. Configuration hooks in the harness mutate the
/// shared client, so a header added before one call is still present on the
/// next — the same lifetime semantics as a shared `HttpClient`.
#[derive(Clone)]
pub struct Client {
    handler: Handler,
    default_headers: http::HeaderMap,
}

impl Client {
    pub(crate) fn new(handler: Handler) -> Self {
        Self {
            handler,
            default_headers: http::HeaderMap::new(),
        }
    }

    /// Sets a default header applied to every request sent by this client.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidHeader`] if the name or value is not a
    /// legal HTTP header.
    pub fn insert_default_header(
        &mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<(), HostError> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| HostError::InvalidHeader(e.to_string()))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| HostError::InvalidHeader(e.to_string()))?;
        self.default_headers.insert(name, value);
        Ok(())
    }

    /// Removes a previously set default header, if present.
    pub fn remove_default_header(&mut self, name: impl AsRef<str>) {
        self.default_headers.remove(name.as_ref());
    }

    /// The default headers currently applied to outgoing requests.
    #[must_use]
    pub fn default_headers(&self) -> &http::HeaderMap {
        &self.default_headers
    }

    /// Sends a request through the hosted pipeline and returns its
    /// response.
    ///
    /// Default headers are filled in without overriding headers already
    /// present on the request.
    ///
    /// # Errors
    ///
    /// The in-memory transport itself cannot fail; the `Result` is the
    /// capability surface through which a real transport would report I/O
    /// failures.
    pub async fn send(&self, mut request: Request) -> Result<Response, HostError> {
        for (name, value) in &self.default_headers {
            if !request.headers().contains_key(name) {
                request.headers_mut().insert(name.clone(), value.clone());
            }
        }
        Ok((self.handler)(request).await)
    }
}
