//! In-memory imitation of the JotForm v1 REST API.
//!
//! Every response is wrapped in the `{responseCode, message, content}`
//! envelope. Requests must carry the configured `apikey` header. A `.xml`
//! suffix on the path is stripped before routing and the envelope is rendered
//! as XML instead of JSON.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, Request, State},
    http::{header, HeaderValue, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router, ServiceExt,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower::{util::MapRequestLayer, Layer};

pub mod store;
pub mod xml;

use store::{nest_fields, Store};

pub const DEFAULT_API_KEY: &str = "mock-api-key";

/// Marks a request whose response should be rendered as XML.
#[derive(Debug, Clone, Copy)]
pub struct XmlOutput;

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    api_key: Arc<str>,
}

type Params = Query<BTreeMap<String, String>>;
type Fields = Form<Vec<(String, String)>>;

pub fn app() -> Router {
    app_with_key(DEFAULT_API_KEY)
}

pub fn app_with_key(api_key: &str) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(Store::default())),
        api_key: Arc::from(api_key),
    };

    let api = Router::new()
        .route("/user", get(get_user))
        .route("/user/usage", get(get_usage))
        .route("/user/forms", get(list_forms).put(create_forms))
        .route("/user/submissions", get(list_submissions))
        .route("/user/subusers", get(get_subusers))
        .route("/user/folders", get(list_folders))
        .route("/user/folder/{id}", get(get_folder))
        .route("/user/reports", get(list_reports))
        .route("/user/report/{id}", get(get_report))
        .route("/user/settings", get(get_settings))
        .route("/user/history", get(get_history))
        .route("/user/submission/{id}", get(get_submission))
        .route("/form/{id}", get(get_form).delete(delete_form))
        .route(
            "/form/{id}/questions",
            get(list_questions).post(create_question).put(create_questions),
        )
        .route(
            "/form/{id}/question/{qid}",
            get(get_question).post(edit_question).delete(delete_question),
        )
        .route(
            "/form/{id}/submissions",
            get(list_form_submissions).post(create_submission),
        )
        .route("/form/{id}/files", get(list_files))
        .route("/form/{id}/webhooks", get(list_webhooks).post(create_webhook))
        .route(
            "/form/{id}/properties",
            get(get_properties).post(set_properties).put(put_properties),
        )
        .route("/form/{id}/properties/{key}", get(get_property))
        .route("/form/{id}/clone", post(clone_form))
        .route("/submission/{id}", post(edit_submission).delete(delete_submission))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state);

    Router::new()
        .nest("/v1", api)
        .layer(middleware::from_fn(render_xml))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

/// Serve `router` with `.xml` suffix handling in front of routing.
pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    let service = MapRequestLayer::new(strip_xml_suffix).layer(router);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(service)).await
}

/// Remove a trailing `.xml` from the path and tag the request with `XmlOutput`.
pub fn strip_xml_suffix(mut req: Request) -> Request {
    let rewritten = req.uri().path().strip_suffix(".xml").map(|path| match req.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    });
    if let Some(Ok(uri)) = rewritten.map(|r| r.parse::<Uri>()) {
        *req.uri_mut() = uri;
        req.extensions_mut().insert(XmlOutput);
    }
    req
}

async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let authorized = req
        .headers()
        .get("apikey")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == &*state.api_key);
    if !authorized {
        let path = req.uri().path().trim_start_matches("/v1");
        tracing::debug!(path, "rejecting request without a valid api key");
        return fail(
            StatusCode::UNAUTHORIZED,
            &format!("You're not authorized to use ({path}) "),
        );
    }
    next.run(req).await
}

async fn render_xml(req: Request, next: Next) -> Response {
    let wants_xml = req.extensions().get::<XmlOutput>().is_some();
    let response = next.run(req).await;
    if !wants_xml {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    let Ok(value) = serde_json::from_slice::<Value>(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    let document = match xml::to_xml(&value) {
        Ok(document) => document,
        Err(err) => {
            tracing::warn!(error = %err, "failed to render xml response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/xml"));
    Response::from_parts(parts, Body::from(document))
}

fn ok(content: Value) -> Response {
    Json(json!({"responseCode": 200, "message": "success", "content": content})).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    let body = json!({"responseCode": status.as_u16(), "message": message, "content": ""});
    (status, Json(body)).into_response()
}

fn not_found(what: &str) -> Response {
    fail(StatusCode::NOT_FOUND, &format!("{what} not found"))
}

fn bad_request(message: &str) -> Response {
    fail(StatusCode::BAD_REQUEST, message)
}

/// Apply `filter`, `order_by`, `offset` and `limit` to a listing.
fn paginate(mut items: Vec<Value>, params: &BTreeMap<String, String>) -> Result<Vec<Value>, Response> {
    if let Some(filter) = params.get("filter") {
        let filter: Map<String, Value> =
            serde_json::from_str(filter).map_err(|_| bad_request("filter must be a JSON object"))?;
        items.retain(|item| {
            filter
                .iter()
                .all(|(k, v)| item.get(k).and_then(Value::as_str) == v.as_str())
        });
    }
    if let Some(field) = params.get("order_by") {
        items.sort_by(|a, b| {
            let a = a.get(field).and_then(Value::as_str).unwrap_or_default();
            let b = b.get(field).and_then(Value::as_str).unwrap_or_default();
            a.cmp(b)
        });
    }
    let number = |key: &str| -> Result<Option<usize>, Response> {
        params
            .get(key)
            .map(|v| v.parse().map_err(|_| bad_request(&format!("{key} must be a number"))))
            .transpose()
    };
    let offset = number("offset")?.unwrap_or(0);
    let limit = number("limit")?.unwrap_or(usize::MAX);
    Ok(items.into_iter().skip(offset).take(limit).collect())
}

fn parse_json_body(body: &Bytes) -> Result<Map<String, Value>, Response> {
    serde_json::from_slice(body).map_err(|_| bad_request("body must be a JSON object"))
}

/// Questions in a PUT body arrive either as an array or keyed by position.
fn question_list(value: Option<&Value>) -> Vec<Map<String, Value>> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|q| q.as_object().cloned())
        .collect()
}

// --- user ---

async fn get_user() -> Response {
    ok(json!({
        "username": "mockuser",
        "name": "Mock User",
        "email": "mock@example.com",
        "account_type": "FREE",
        "status": "ACTIVE",
    }))
}

async fn get_usage(State(state): State<AppState>) -> Response {
    let store = state.store.read().await;
    ok(json!({
        "submissions": store.submissions.len().to_string(),
        "ssl_submissions": "0",
        "payments": "0",
        "uploads": "0",
    }))
}

async fn get_subusers() -> Response {
    ok(json!([]))
}

async fn get_settings() -> Response {
    ok(json!({"time_zone": "America/New_York", "language": "en-US"}))
}

async fn list_folders(State(state): State<AppState>) -> Response {
    let store = state.store.read().await;
    ok(Value::Array(store.folders.values().cloned().collect()))
}

async fn get_folder(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let store = state.store.read().await;
    store.folders.get(&id).cloned().map(ok).unwrap_or_else(|| not_found("Folder"))
}

async fn list_reports(State(state): State<AppState>) -> Response {
    let store = state.store.read().await;
    ok(Value::Array(store.reports.values().cloned().collect()))
}

async fn get_report(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let store = state.store.read().await;
    store.reports.get(&id).cloned().map(ok).unwrap_or_else(|| not_found("Report"))
}

async fn get_history(State(state): State<AppState>, Query(params): Params) -> Response {
    let store = state.store.read().await;
    let mut events: Vec<Value> = store
        .history
        .iter()
        .filter(|event| match params.get("action").map(String::as_str) {
            None | Some("all") => true,
            Some(action) => event["type"] == action,
        })
        .cloned()
        .collect();
    if params.get("sortBy").is_some_and(|s| s.eq_ignore_ascii_case("DESC")) {
        events.reverse();
    }
    ok(Value::Array(events))
}

async fn list_forms(State(state): State<AppState>, Query(params): Params) -> Response {
    let store = state.store.read().await;
    let forms = store.forms.values().map(|f| store.form_summary(f)).collect();
    match paginate(forms, &params) {
        Ok(forms) => ok(Value::Array(forms)),
        Err(response) => response,
    }
}

async fn create_forms(State(state): State<AppState>, body: Bytes) -> Response {
    let body = match parse_json_body(&body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let properties = body
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let title = properties
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("Untitled Form")
        .to_string();

    let mut store = state.store.write().await;
    let form = store.create_form(&title);
    form.set_properties(properties);
    for question in question_list(body.get("questions")) {
        form.add_question(question);
    }
    let form = form.clone();
    tracing::info!(form_id = form.id, "created form");
    ok(store.form_summary(&form))
}

async fn list_submissions(State(state): State<AppState>, Query(params): Params) -> Response {
    let store = state.store.read().await;
    let submissions = store.submissions.values().map(|s| s.to_json()).collect();
    match paginate(submissions, &params) {
        Ok(submissions) => ok(Value::Array(submissions)),
        Err(response) => response,
    }
}

async fn get_submission(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let store = state.store.read().await;
    store
        .submissions
        .get(&id)
        .map(|s| ok(s.to_json()))
        .unwrap_or_else(|| not_found("Submission"))
}

// --- form ---

async fn get_form(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let store = state.store.read().await;
    match store.forms.get(&id) {
        Some(form) => ok(store.form_summary(form)),
        None => not_found("Form"),
    }
}

async fn delete_form(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let mut store = state.store.write().await;
    match store.delete_form(id) {
        Some(form) => ok(form.summary(0)),
        None => not_found("Form"),
    }
}

async fn clone_form(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let mut store = state.store.write().await;
    let Some(clone_id) = store.clone_form(id) else {
        return not_found("Form");
    };
    let summary = store.form_summary(&store.forms[&clone_id]);
    ok(summary)
}

async fn list_questions(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let store = state.store.read().await;
    match store.forms.get(&id) {
        Some(form) => ok(form.questions_json()),
        None => not_found("Form"),
    }
}

async fn create_question(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(fields): Fields,
) -> Response {
    let mut store = state.store.write().await;
    let Some(form) = store.forms.get_mut(&id) else {
        return not_found("Form");
    };
    let qid = form.add_question(nest_fields("question", &fields));
    ok(Value::Object(form.questions[&qid].clone()))
}

async fn create_questions(State(state): State<AppState>, Path(id): Path<u64>, body: Bytes) -> Response {
    let body = match parse_json_body(&body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let mut store = state.store.write().await;
    let Some(form) = store.forms.get_mut(&id) else {
        return not_found("Form");
    };
    let mut created = Map::new();
    for question in question_list(body.get("questions")) {
        let qid = form.add_question(question);
        created.insert(qid.to_string(), Value::Object(form.questions[&qid].clone()));
    }
    ok(Value::Object(created))
}

async fn get_question(State(state): State<AppState>, Path((id, qid)): Path<(u64, u32)>) -> Response {
    let store = state.store.read().await;
    store
        .forms
        .get(&id)
        .and_then(|form| form.questions.get(&qid))
        .map(|q| ok(Value::Object(q.clone())))
        .unwrap_or_else(|| not_found("Question"))
}

async fn edit_question(
    State(state): State<AppState>,
    Path((id, qid)): Path<(u64, u32)>,
    Form(fields): Fields,
) -> Response {
    let mut store = state.store.write().await;
    let Some(question) = store.forms.get_mut(&id).and_then(|f| f.questions.get_mut(&qid)) else {
        return not_found("Question");
    };
    question.extend(nest_fields("question", &fields));
    ok(Value::Object(question.clone()))
}

async fn delete_question(State(state): State<AppState>, Path((id, qid)): Path<(u64, u32)>) -> Response {
    let mut store = state.store.write().await;
    match store.forms.get_mut(&id).and_then(|f| f.questions.remove(&qid)) {
        Some(_) => ok(Value::from("Question deleted.")),
        None => not_found("Question"),
    }
}

async fn list_form_submissions(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Params,
) -> Response {
    let store = state.store.read().await;
    if !store.forms.contains_key(&id) {
        return not_found("Form");
    }
    let submissions = store
        .submissions
        .values()
        .filter(|s| s.form_id == id)
        .map(|s| s.to_json())
        .collect();
    match paginate(submissions, &params) {
        Ok(submissions) => ok(Value::Array(submissions)),
        Err(response) => response,
    }
}

async fn create_submission(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(fields): Fields,
) -> Response {
    let mut store = state.store.write().await;
    if !store.forms.contains_key(&id) {
        return not_found("Form");
    }
    let submission_id = store.create_submission(id, nest_fields("submission", &fields));
    tracing::info!(form_id = id, submission_id, "created submission");
    ok(json!({
        "submissionID": submission_id.to_string(),
        "URL": format!("https://www.jotform.com/submission/{submission_id}"),
    }))
}

async fn list_files(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let store = state.store.read().await;
    if !store.forms.contains_key(&id) {
        return not_found("Form");
    }
    ok(json!([]))
}

async fn list_webhooks(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let store = state.store.read().await;
    match store.forms.get(&id) {
        Some(form) => ok(form.webhooks_json()),
        None => not_found("Form"),
    }
}

async fn create_webhook(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(fields): Fields,
) -> Response {
    let Some((_, url)) = fields.into_iter().find(|(k, _)| k == "webhookURL") else {
        return bad_request("webhookURL is required");
    };
    let mut store = state.store.write().await;
    let Some(form) = store.forms.get_mut(&id) else {
        return not_found("Form");
    };
    form.webhooks.push(url);
    ok(form.webhooks_json())
}

async fn get_properties(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let store = state.store.read().await;
    match store.forms.get(&id) {
        Some(form) => ok(Value::Object(form.properties.clone())),
        None => not_found("Form"),
    }
}

async fn get_property(State(state): State<AppState>, Path((id, key)): Path<(u64, String)>) -> Response {
    let store = state.store.read().await;
    let Some(form) = store.forms.get(&id) else {
        return not_found("Form");
    };
    let Some(value) = form.properties.get(&key).cloned() else {
        return not_found("Property");
    };
    let mut property = Map::new();
    property.insert(key, value);
    ok(Value::Object(property))
}

async fn set_properties(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(fields): Fields,
) -> Response {
    let mut store = state.store.write().await;
    let Some(form) = store.forms.get_mut(&id) else {
        return not_found("Form");
    };
    let properties = nest_fields("properties", &fields);
    form.set_properties(properties.clone());
    ok(Value::Object(properties))
}

async fn put_properties(State(state): State<AppState>, Path(id): Path<u64>, body: Bytes) -> Response {
    let body = match parse_json_body(&body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let Some(properties) = body.get("properties").and_then(Value::as_object).cloned() else {
        return bad_request("properties object is required");
    };
    let mut store = state.store.write().await;
    let Some(form) = store.forms.get_mut(&id) else {
        return not_found("Form");
    };
    form.set_properties(properties.clone());
    ok(Value::Object(properties))
}

// --- submission ---

async fn edit_submission(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(fields): Fields,
) -> Response {
    let mut store = state.store.write().await;
    let Some(submission) = store.submissions.get_mut(&id) else {
        return not_found("Submission");
    };
    submission.answers.extend(nest_fields("submission", &fields));
    ok(json!({"submissionID": id.to_string()}))
}

async fn delete_submission(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let mut store = state.store.write().await;
    match store.submissions.remove(&id) {
        Some(_) => ok(Value::from(format!("Submission #{id} deleted successfully."))),
        None => not_found("Submission"),
    }
}
