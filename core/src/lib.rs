//! Synchronous client for the JotForm REST API.
//!
//! # Overview
//! Every operation builds a resource path, encodes its parameters for the
//! HTTP method in use, sends one request and returns the decoded payload as
//! raw bytes for the caller to parse further.
//!
//! # Design
//! - `JotformClient` is immutable: API key, output format, base URL and
//!   timeout are fixed at construction, so one instance can be shared
//!   across threads.
//! - Request building and response parsing are pure (`build_request` /
//!   `parse_response`); a `Transport` performs the I/O in between.
//! - Failures come back as `ApiError` values, never as process exits.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fields;
pub mod http;
pub mod query;
mod resources;
pub mod transport;

pub use client::JotformClient;
pub use config::{ClientConfig, OutputFormat};
pub use envelope::Envelope;
pub use error::{ApiError, Result};
pub use fields::FormFields;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestParams};
pub use query::{HistoryQuery, ListOptions, Query};
pub use transport::{Transport, UreqTransport};
