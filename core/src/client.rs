//! Request dispatcher for the JotForm API.
//!
//! # Design
//! `JotformClient` holds only its configuration and a transport and carries
//! no mutable state between calls. Dispatch is split into `build_request`,
//! which produces an `HttpRequest` from a resource path and parameters, and
//! `parse_response`, which turns an `HttpResponse` into the payload bytes.
//! Both halves are pure; `dispatch` runs them around a `Transport`.

use tracing::{debug, warn};

use crate::config::{ClientConfig, OutputFormat};
use crate::envelope;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse, RequestParams};
use crate::transport::{Transport, UreqTransport};

const API_KEY_HEADER: &str = "apikey";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Synchronous client for the JotForm REST API.
///
/// Every resource operation returns the decoded payload: the `content` field
/// of the JSON envelope, or the whole XML document.
#[derive(Debug, Clone)]
pub struct JotformClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl JotformClient<UreqTransport> {
    /// Client for the public API host. `output_format` is matched
    /// case-insensitively; anything but `json` selects XML.
    pub fn new(api_key: &str, output_format: &str) -> Self {
        Self::from_config(ClientConfig::new(api_key, output_format))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self { config, transport }
    }
}

impl<T: Transport> JotformClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn output_format(&self) -> OutputFormat {
        self.config.output_format
    }

    /// Build the request for `path` without sending it.
    pub fn build_request(&self, path: &str, params: RequestParams) -> HttpRequest {
        let mut url = format!(
            "{}/{}/{}{}",
            self.config.base_url,
            self.config.api_version,
            path,
            self.config.output_format.suffix()
        );
        let mut headers = vec![(API_KEY_HEADER.to_string(), self.config.api_key.clone())];
        let method = params.method();

        let body = match params {
            RequestParams::Query(query) => {
                if !query.is_empty() {
                    url.push('?');
                    url.push_str(&query.to_query_string());
                }
                None
            }
            RequestParams::Form(fields) => {
                headers.push(("content-type".to_string(), FORM_CONTENT_TYPE.to_string()));
                Some(fields.encode().into_bytes())
            }
            RequestParams::Raw(bytes) => Some(bytes),
            RequestParams::None => None,
        };

        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    /// Turn a response into the payload bytes.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Vec<u8>> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        match self.config.output_format {
            OutputFormat::Json => envelope::decode_json(&response.body),
            OutputFormat::Xml => envelope::validate_xml(&response.body),
        }
    }

    /// Send one request for `path` and decode the answer.
    pub fn dispatch(&self, path: &str, params: RequestParams) -> Result<Vec<u8>> {
        let request = self.build_request(path, params);
        let method = request.method.as_str();
        debug!(method, path, "sending request");

        let result = self
            .transport
            .execute(&request)
            .and_then(|response| {
                debug!(method, path, status = response.status, "received response");
                self.parse_response(response)
            });
        if let Err(err) = &result {
            warn!(method, path, error = %err, "request failed");
        }
        result
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::fields::FormFields;
    use crate::http::HttpMethod;
    use crate::query::{ListOptions, Query};

    /// Records requests and replays queued responses.
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        pub requests: Mutex<Vec<HttpRequest>>,
        responses: Mutex<VecDeque<Result<HttpResponse>>>,
    }

    impl FakeTransport {
        pub fn respond(self, status: u16, body: &str) -> Self {
            self.responses.lock().unwrap().push_back(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.as_bytes().to_vec(),
            }));
            self
        }

        pub fn fail(self, err: ApiError) -> Self {
            self.responses.lock().unwrap().push_back(Err(err));
            self
        }

        pub fn last_request(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().expect("no request sent")
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: br#"{"responseCode":200,"message":"success","content":null}"#.to_vec(),
                }))
        }
    }

    pub(crate) fn client(format: &str) -> JotformClient<FakeTransport> {
        let config = ClientConfig::new("test-key", format).with_base_url("http://localhost:3000");
        JotformClient::with_transport(config, FakeTransport::default())
    }

    #[test]
    fn get_request_has_api_key_and_no_body() {
        let req = client("json").build_request("user", RequestParams::Query(Query::new()));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/v1/user");
        assert_eq!(req.headers, vec![("apikey".to_string(), "test-key".to_string())]);
        assert!(req.body.is_none());
    }

    #[test]
    fn get_request_appends_query() {
        let query = Query::conditions(&ListOptions::new().offset(0).limit(10));
        let req = client("json").build_request("user/forms", RequestParams::Query(query));
        assert_eq!(req.url, "http://localhost:3000/v1/user/forms?offset=0&limit=10");
    }

    #[test]
    fn mixed_case_json_has_no_suffix() {
        let client = client("JSON");
        assert_eq!(client.output_format(), OutputFormat::Json);
        let req = client.build_request("form/123/questions", RequestParams::Query(Query::new()));
        assert_eq!(req.url, "http://localhost:3000/v1/form/123/questions");
    }

    #[test]
    fn xml_appends_suffix_before_query() {
        let mut query = Query::new();
        query.push("limit", "1");
        let req = client("xml").build_request("user/forms", RequestParams::Query(query));
        assert_eq!(req.url, "http://localhost:3000/v1/user/forms.xml?limit=1");
    }

    #[test]
    fn post_request_is_form_encoded() {
        let fields = FormFields::from_pairs([("webhookURL", "http://example.com")]);
        let req = client("json").build_request("form/1/webhooks", RequestParams::Form(fields));
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
        assert_eq!(req.body.as_deref(), Some(&b"webhookURL=http%3A%2F%2Fexample.com"[..]));
    }

    #[test]
    fn put_request_passes_body_verbatim() {
        let raw = br#"{"questions":[{"type":"control_head"}]}"#.to_vec();
        let req = client("json").build_request("form/1/questions", RequestParams::Raw(raw.clone()));
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.header("content-type"), None);
        assert_eq!(req.body, Some(raw));
    }

    #[test]
    fn delete_request_has_no_body() {
        let req = client("json").build_request("form/1", RequestParams::None);
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_unwraps_json_content() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: br#"{"content": {"id": 42}, "responseCode": 200}"#.to_vec(),
        };
        assert_eq!(client("json").parse_response(response).unwrap(), br#"{"id":42}"#.to_vec());
    }

    #[test]
    fn parse_keeps_xml_body() {
        let body = b"<root><content><id>42</id></content></root>".to_vec();
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.clone(),
        };
        assert_eq!(client("xml").parse_response(response).unwrap(), body);
    }

    #[test]
    fn parse_non_success_keeps_status_and_body() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: br#"{"responseCode":404,"message":"Form not found"}"#.to_vec(),
        };
        let err = client("json").parse_response(response).unwrap_err();
        match err {
            ApiError::Http { status, body } => {
                assert_eq!(status, 404);
                assert!(String::from_utf8(body).unwrap().contains("Form not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn dispatch_sends_through_transport() {
        let config = ClientConfig::new("k", "json").with_base_url("http://localhost:3000");
        let transport = FakeTransport::default().respond(200, r#"{"responseCode":200,"content":[1,2]}"#);
        let client = JotformClient::with_transport(config, transport);
        let payload = client.dispatch("user/forms", RequestParams::Query(Query::new())).unwrap();
        assert_eq!(payload, b"[1,2]".to_vec());
        assert_eq!(client.transport.last_request().url, "http://localhost:3000/v1/user/forms");
    }

    #[test]
    fn dispatch_propagates_transport_errors() {
        let config = ClientConfig::new("k", "json");
        let transport = FakeTransport::default().fail(ApiError::Timeout("30s".into()));
        let client = JotformClient::with_transport(config, transport);
        let err = client.dispatch("user", RequestParams::Query(Query::new())).unwrap_err();
        assert!(matches!(err, ApiError::Timeout(_)));
    }
}
