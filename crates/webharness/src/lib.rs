//! # Webharness
//!
//! Test support for driving an in-process web API and asserting on its HTTP
//! responses.
//!
//! A [`Harness`] boots an application pipeline in memory (no sockets, no
//! ports) the first time a verb is called, issues requests against it, and
//! wraps every response in an [`AssertableResponse`] that normalizes status
//! code, headers, and body for assertions and diagnostic logging.
//!
//! ## Key behaviors
//!
//! - **Lazy startup**: the application-configuration callback runs at most
//!   once per harness, on the first verb call.
//! - **Diagnostics first**: every call emits its verb, path, and full
//!   response detail to the log sink before any success check can fail, so
//!   test output always shows what was actually received.
//! - **Opt-out success enforcement**: calls fail on non-2xx status codes by
//!   default; `ensure_success(false)` returns the capture for manual
//!   inspection instead.
//!
//! ## Example
//!
//! ```ignore
//! use webharness::Harness;
//!
//! #[tokio::test]
//! async fn health_check() {
//!     let harness = Harness::new(|app| {
//!         app.run(my_application);
//!     })
//!     .with_log_sink(|line| println!("{line}"));
//!
//!     let response = harness.get("/health").send().await.unwrap();
//!     assert_eq!(response.status().as_u16(), 200);
//!     assert_eq!(response.body(), "OK");
//!
//!     let created = harness
//!         .post("/items")
//!         .json(&serde_json::json!({"name": "x"}))
//!         .send()
//!         .await
//!         .unwrap();
//!     assert!(created.is_success());
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/webharness/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod content;
mod error;
mod harness;
mod response;

pub use error::HarnessError;
pub use harness::{Harness, HarnessRequest};
pub use response::AssertableResponse;

// The hosted-server capability, re-exported so tests only need one import.
pub use webharness_host::{AppBuilder, Client, HostError, TestServer};
