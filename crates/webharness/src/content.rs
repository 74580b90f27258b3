//! JSON request-body encoding.

use bytes::Bytes;
use serde::Serialize;

/// Content type applied to JSON request bodies.
pub(crate) const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Serializes a payload as indented JSON body bytes.
///
/// Indented output keeps request bodies readable when they show up in
/// handler-side logs; the wire format is otherwise unchanged.
pub(crate) fn json_content<T: Serialize>(value: &T) -> Result<Bytes, serde_json::Error> {
    serde_json::to_vec_pretty(value).map(Bytes::from)
}
