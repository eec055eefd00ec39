//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The client
//! builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network; a `Transport` executes the round-trip in between.
//!
//! Bodies are raw bytes: form-encoded POST bodies and pre-serialized PUT
//! payloads travel unchanged.

use crate::fields::FormFields;
use crate::query::Query;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Per-method request parameters.
///
/// The variant decides both the HTTP method and how the parameters are
/// encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestParams {
    /// GET with a query string appended to the URL.
    Query(Query),
    /// POST with a form-url-encoded body.
    Form(FormFields),
    /// PUT with a caller-serialized body sent verbatim.
    Raw(Vec<u8>),
    /// DELETE without a body.
    None,
}

impl RequestParams {
    pub fn method(&self) -> HttpMethod {
        match self {
            RequestParams::Query(_) => HttpMethod::Get,
            RequestParams::Form(_) => HttpMethod::Post,
            RequestParams::Raw(_) => HttpMethod::Put,
            RequestParams::None => HttpMethod::Delete,
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Value of the first header matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
