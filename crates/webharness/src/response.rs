//! The assertable response capture.

use crate::error::HarnessError;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;

/// An immutable capture of one HTTP response: status code, headers, and
/// body, stored exactly as received.
///
/// Captures are plain values; clone them, compare them, or hold on to them
/// across assertions. The pretty-printed body view is derived on demand and
/// never alters the stored body.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertableResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl AssertableResponse {
    /// Creates a capture from raw parts, stored verbatim.
    ///
    /// No validation is performed; any status, body, and header set is
    /// accepted.
    pub fn new(status: StatusCode, body: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// The exact status code returned by the server.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The exact textual body received, untransformed and untruncated.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// A header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// True iff the status code lies in `[200, 300)`.
    ///
    /// This is the sole success classification rule; no individual codes
    /// are special-cased.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Fails unless the status code is in the 2xx range.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnsuccessfulStatus`] carrying the status
    /// code's display name and the full raw body.
    pub fn ensure_success(&self) -> Result<(), HarnessError> {
        if self.is_success() {
            return Ok(());
        }

        Err(HarnessError::UnsuccessfulStatus {
            name: status_display_name(self.status),
            status: self.status,
            body: self.body.clone(),
        })
    }

    /// The body re-serialized as indented JSON, or the literal `{}` if the
    /// body does not parse as JSON.
    ///
    /// A pure function of the stored body, recomputed each call. The
    /// fallback keeps diagnostics readable for non-JSON bodies instead of
    /// failing.
    #[must_use]
    pub fn pretty_body(&self) -> String {
        serde_json::from_str::<serde_json::Value>(&self.body)
            .and_then(|value| serde_json::to_string_pretty(&value))
            .unwrap_or_else(|_| String::from("{}"))
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Json`] if the body is not valid JSON for
    /// `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HarnessError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Headers flattened into a JSON object; multi-valued headers become
    /// arrays. Empty headers render as `{}`.
    fn headers_as_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for name in self.headers.keys() {
            let mut values: Vec<serde_json::Value> = self
                .headers
                .get_all(name)
                .iter()
                .map(|v| {
                    serde_json::Value::String(String::from_utf8_lossy(v.as_bytes()).into_owned())
                })
                .collect();
            let entry = if values.len() == 1 {
                values.remove(0)
            } else {
                serde_json::Value::Array(values)
            };
            map.insert(name.as_str().to_string(), entry);
        }
        serde_json::Value::Object(map)
    }
}

impl fmt::Display for AssertableResponse {
    /// Renders status, flattened headers, and the pretty-printed body, one
    /// per line, for logs and failure messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatusCode: {}\nHeaders: {}\nBody: {}",
            status_display_name(self.status),
            self.headers_as_json(),
            self.pretty_body()
        )
    }
}

/// The status code's display name: the canonical reason phrase with
/// non-alphanumerics removed (`Internal Server Error` →
/// `InternalServerError`), or the numeric code for unnamed statuses.
pub(crate) fn status_display_name(status: StatusCode) -> String {
    status.canonical_reason().map_or_else(
        || status.as_u16().to_string(),
        |reason| reason.chars().filter(char::is_ascii_alphanumeric).collect(),
    )
}
