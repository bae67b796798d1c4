// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers: an in-process mock of the LearnHub API and a storefront
//! app wired to it.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use learnhub_storefront::config::Config;
use learnhub_storefront::routes::create_router;
use learnhub_storefront::AppState;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const STUDENT_EMAIL: &str = "student@example.com";
pub const INSTRUCTOR_EMAIL: &str = "instructor@example.com";
pub const PASSWORD: &str = "password123";

/// Phone numbers the mock recognises.
pub const AIRTEL_PHONE: &str = "0971234567";
pub const MTN_PHONE: &str = "0961234567";

pub const REFERENCE: &str = "LH-TEST-0001";

/// Knobs and counters shared with the mock upstream.
#[derive(Default)]
pub struct MockState {
    /// Status reported by `/mobile-payments/status/`; "pending" when unset
    pub payment_status: Mutex<Option<&'static str>>,
    pub status_calls: AtomicU32,
    pub cancel_calls: AtomicU32,
    pub enroll_calls: AtomicU32,
    /// Fail `/mobile-payments/transactions/` with a 500
    pub transactions_down: std::sync::atomic::AtomicBool,
    pub refresh_calls: AtomicU32,
    /// Access tokens superseded by a refresh; upstream answers 401 for them
    pub revoked_tokens: Mutex<HashSet<String>>,
}

impl MockState {
    #[allow(dead_code)]
    pub fn set_payment_status(&self, status: &'static str) {
        *self.payment_status.lock().unwrap() = Some(status);
    }
}

pub struct MockUpstream {
    pub base_url: String,
    pub state: Arc<MockState>,
}

pub const INSTRUCTOR_NAME: &str = "Sarah Johnson";

/// A course as the list endpoints render it. Decimals arrive as strings.
#[allow(dead_code)]
pub fn course_json(id: &str, title: &str, price: f64, category: &str, level: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "subtitle": "",
        "description": "",
        "instructor_name": INSTRUCTOR_NAME,
        "category_name": category,
        "thumbnail": null,
        "price": format!("{:.2}", price),
        "original_price": "199.99",
        "is_free": price == 0.0,
        "difficulty_level": level,
        "language": "English",
        "total_duration": 2520,
        "total_lectures": 45,
        "average_rating": 4.8,
        "total_students": 100,
        "created_at": "2026-01-10T09:00:00Z",
        "updated_at": "2026-02-01T09:00:00Z"
    })
}

/// A course as the detail endpoint renders it: the model's own columns,
/// with `instructor` as the user's string form and a nested `category`.
fn course_detail_json(course: &Value) -> Value {
    let mut detail = course.clone();
    let Some(fields) = detail.as_object_mut() else {
        return detail;
    };
    fields.remove("instructor_name");
    let category = fields.remove("category_name").unwrap_or(Value::Null);
    let slug = category
        .as_str()
        .unwrap_or_default()
        .to_lowercase()
        .replace(' ', "-");
    fields.insert(
        "instructor".to_string(),
        json!(format!("{} (sarah@example.com)", INSTRUCTOR_NAME)),
    );
    fields.insert(
        "category".to_string(),
        json!({"id": 1, "name": category, "description": "", "icon": "code",
               "slug": slug, "is_active": true, "course_count": 3,
               "created_at": "2026-01-01T00:00:00Z"}),
    );
    fields.insert("status".to_string(), json!("published"));
    fields.insert("preview_video".to_string(), Value::Null);
    fields.insert("published_at".to_string(), json!("2026-01-11T09:00:00Z"));
    fields.insert("is_bestseller".to_string(), json!(true));
    fields.insert("is_featured".to_string(), json!(false));
    fields.insert("requirements".to_string(), json!(["A computer"]));
    fields.insert("what_you_will_learn".to_string(), json!(["Hooks"]));
    fields.insert("target_audience".to_string(), json!([]));
    fields.insert("reviews_count".to_string(), json!(2));
    fields.insert(
        "sections".to_string(),
        json!([{
            "id": 11,
            "course": course["id"],
            "title": "Getting started",
            "description": "",
            "order": 1,
            "created_at": "2026-01-10T09:00:00Z",
            "lecture_count": 1,
            "total_duration": 300,
            "lectures": [{
                "id": "l-1",
                "section": 11,
                "title": "Welcome",
                "description": "",
                "lecture_type": "video",
                "video_file": null,
                "video_duration": 300,
                "text_content": "",
                "resources": [],
                "order": 1,
                "is_preview": true,
                "is_free": true,
                "created_at": "2026-01-10T09:00:00Z",
                "updated_at": "2026-01-10T09:00:00Z"
            }]
        }]),
    );
    detail
}

fn catalog() -> Vec<Value> {
    vec![
        course_json("c1", "Complete React Developer Course", 89.99, "Web Development", "Beginner to Advanced"),
        course_json("c2", "Machine Learning Masterclass", 94.99, "Data Science", "Intermediate"),
        course_json("c3", "Photography Basics", 0.0, "Photography", "Beginner"),
    ]
}

fn user_json(email: &str) -> Value {
    let (id, username, role) = if email == INSTRUCTOR_EMAIL {
        ("u-instructor", "sarah", "instructor")
    } else {
        ("u-student", "alex", "student")
    };
    json!({
        "id": id,
        "email": email,
        "username": username,
        "first_name": "Test",
        "last_name": "User",
        "user_type": role,
        "is_verified": true,
        "country": "ZM"
    })
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Authentication credentials were not provided."})),
    )
        .into_response()
}

/// Email the access token was issued to, unless a refresh superseded it.
/// Tokens look like `access:{email}` or, after a refresh, `access:{email}:{n}`.
fn token_email(state: &MockState, headers: &HeaderMap) -> Option<String> {
    let token = bearer(headers)?;
    if state.revoked_tokens.lock().unwrap().contains(&token) {
        return None;
    }
    let rest = token.strip_prefix("access:")?;
    Some(rest.split(':').next().unwrap_or(rest).to_string())
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if (email != STUDENT_EMAIL && email != INSTRUCTOR_EMAIL) || password != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response();
    }
    Json(json!({
        "access": format!("access:{}", email),
        "refresh": format!("refresh:{}", email),
        "user": user_json(email),
    }))
    .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@example.com" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "email": ["user with this email already exists."],
                "username": ["A user with that username already exists."]
            })),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({"message": "User created successfully"})),
    )
        .into_response()
}

async fn profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    match token_email(&state, &headers) {
        Some(email) => Json(user_json(&email)).into_response(),
        None => unauthorized(),
    }
}

async fn update_profile(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(update): Json<Value>,
) -> Response {
    let Some(email) = token_email(&state, &headers) else {
        return unauthorized();
    };
    let mut user = user_json(&email);
    if let (Some(fields), Some(target)) = (update.as_object(), user.as_object_mut()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(user).into_response()
}

/// Rotate the access token: the previous one stops working.
async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    match body["refresh"].as_str().and_then(|r| r.strip_prefix("refresh:")) {
        Some(email) => {
            let n = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
            let previous = if n == 1 {
                format!("access:{}", email)
            } else {
                format!("access:{}:{}", email, n - 1)
            };
            state.revoked_tokens.lock().unwrap().insert(previous);
            Json(json!({"access": format!("access:{}:{}", email, n)})).into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired"})),
        )
            .into_response(),
    }
}

async fn list_courses() -> Json<Value> {
    let results = catalog();
    Json(json!({"count": results.len(), "results": results}))
}

async fn course_detail(Path(id): Path<String>) -> Response {
    match catalog().iter().find(|c| c["id"] == id.as_str()) {
        Some(course) => Json(course_detail_json(course)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

async fn featured() -> Json<Value> {
    Json(Value::Array(catalog().into_iter().take(2).collect()))
}

async fn popular() -> Json<Value> {
    Json(json!({"results": catalog().into_iter().skip(1).collect::<Vec<_>>()}))
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let category = params.get("category").cloned();
    let results: Vec<Value> = catalog()
        .into_iter()
        .filter(|c| {
            c["title"]
                .as_str()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&q)
        })
        .filter(|c| category.as_deref().is_none_or(|cat| c["category_name"] == cat))
        .collect();
    Json(Value::Array(results))
}

fn enrollment_json(course: Value) -> Value {
    json!({
        "id": format!("e-{}", course["id"].as_str().unwrap_or_default()),
        "user": 1,
        "amount_paid": course["price"],
        "payment_status": "completed",
        "course": course,
        "enrolled_at": "2026-03-01T10:00:00Z",
        "progress_percentage": 50,
        "completed": false,
        "completed_at": null,
        "certificate_issued": false,
        "time_spent": 90,
        "last_accessed": "2026-03-02T10:00:00Z"
    })
}

async fn enroll(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if token_email(&state, &headers).is_none() {
        return unauthorized();
    }
    state.enroll_calls.fetch_add(1, Ordering::SeqCst);
    if id == "c2" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Already enrolled in this course"})),
        )
            .into_response();
    }
    match catalog().into_iter().find(|c| c["id"] == id.as_str()) {
        Some(course) => (StatusCode::CREATED, Json(enrollment_json(course))).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

async fn enrollments(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if token_email(&state, &headers).is_none() {
        return unauthorized();
    }
    let mut completed = enrollment_json(catalog().remove(2));
    completed["completed"] = json!(true);
    completed["progress_percentage"] = json!(100);
    Json(json!([enrollment_json(catalog().remove(0)), completed])).into_response()
}

async fn instructor_courses(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if token_email(&state, &headers).is_none() {
        return unauthorized();
    }
    Json(json!({"results": catalog().into_iter().take(2).collect::<Vec<_>>()})).into_response()
}

/// Echoes the model's columns: `instructor` and `category` are ids.
async fn create_course(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if token_email(&state, &headers).is_none() {
        return unauthorized();
    }
    let title = body["title"].as_str().unwrap_or_default();
    let price = body["price"].as_f64().unwrap_or_default();
    let mut course = course_json("c-new", title, price, "Design", "beginner");
    if let Some(fields) = course.as_object_mut() {
        fields.remove("instructor_name");
        fields.remove("category_name");
        fields.insert("instructor".to_string(), json!(2));
        fields.insert("category".to_string(), json!(4));
        fields.insert("status".to_string(), json!("draft"));
        fields.insert("original_price".to_string(), Value::Null);
    }
    (StatusCode::CREATED, Json(course)).into_response()
}

async fn providers() -> Json<Value> {
    Json(json!([
        {"name": "airtel", "display_name": "Airtel Money", "ussd_code": "*115#",
         "phone_prefixes": ["097", "077"], "instructions": "Dial *115#"},
        {"name": "mtn", "display_name": "MTN Mobile Money", "ussd_code": "*303#",
         "phone_prefixes": ["096", "076"], "instructions": "Dial *303#"},
        {"name": "zamtel", "display_name": "Zamtel Kwacha", "ussd_code": "*327#",
         "phone_prefixes": ["095"], "instructions": "Dial *327#"}
    ]))
}

async fn validate_phone(Json(body): Json<Value>) -> Json<Value> {
    let phone = body["phone_number"].as_str().unwrap_or_default();
    let detected = match phone {
        AIRTEL_PHONE => Some("airtel"),
        MTN_PHONE => Some("mtn"),
        _ => None,
    };
    Json(json!({
        "is_valid": detected.is_some(),
        "formatted_phone": detected.map(|_| format!("+260 {}", &phone[1..])),
        "detected_provider": detected,
        "clean_phone": detected.map(|_| phone[1..].to_string()),
    }))
}

fn transaction_json(status: &str) -> Value {
    let expires_at = chrono::Utc::now() + chrono::Duration::minutes(5);
    json!({
        "id": "t-1",
        "reference_code": REFERENCE,
        "amount": "89.99",
        "currency": "ZMW",
        "provider_name": "airtel",
        "phone_number": AIRTEL_PHONE,
        "status": status,
        "expires_at": expires_at.to_rfc3339(),
        "course_title": "Complete React Developer Course"
    })
}

async fn initiate(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if token_email(&state, &headers).is_none() {
        return unauthorized();
    }
    if body["course_id"] == "c2" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "You are already enrolled in this course"})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "transaction": transaction_json("pending"),
            "instructions": {
                "steps": ["Dial *115#", "Select Make Payments", "Enter your PIN"],
                "ussd_code": "*115#",
                "estimated_time": "2-3 minutes"
            },
            "message": "Payment initiated"
        })),
    )
        .into_response()
}

async fn payment_status(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(reference): Path<String>,
) -> Response {
    if token_email(&state, &headers).is_none() {
        return unauthorized();
    }
    state.status_calls.fetch_add(1, Ordering::SeqCst);
    let status = state.payment_status.lock().unwrap().unwrap_or("pending");
    Json(json!({
        "reference_code": reference,
        "status": status,
        "is_expired": status == "expired"
    }))
    .into_response()
}

async fn cancel_payment(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(_reference): Path<String>,
) -> Response {
    if token_email(&state, &headers).is_none() {
        return unauthorized();
    }
    state.cancel_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({"message": "Transaction cancelled"})).into_response()
}

async fn transactions(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if token_email(&state, &headers).is_none() {
        return unauthorized();
    }
    if state.transactions_down.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!([transaction_json("confirmed")])).into_response()
}

/// Start the mock LearnHub API on an ephemeral port.
pub async fn spawn_upstream() -> MockUpstream {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/auth/register/", post(register))
        .route("/api/auth/profile/", get(profile).patch(update_profile))
        .route("/api/auth/refresh/", post(refresh))
        .route("/api/courses/", get(list_courses))
        .route("/api/courses/featured/", get(featured))
        .route("/api/courses/popular/", get(popular))
        .route("/api/courses/search/", get(search))
        .route("/api/courses/enrollments/", get(enrollments))
        .route(
            "/api/courses/instructor/courses/",
            get(instructor_courses).post(create_course),
        )
        .route("/api/courses/enroll/{id}/", post(enroll))
        .route("/api/courses/{id}/", get(course_detail))
        .route("/api/mobile-payments/providers/", get(providers))
        .route("/api/mobile-payments/validate-phone/", post(validate_phone))
        .route("/api/mobile-payments/initiate/", post(initiate))
        .route("/api/mobile-payments/status/{reference}/", get(payment_status))
        .route("/api/mobile-payments/cancel/{reference}/", post(cancel_payment))
        .route("/api/mobile-payments/transactions/", get(transactions))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock upstream");
    let addr = listener.local_addr().expect("mock upstream address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock upstream");
    });

    MockUpstream {
        base_url: format!("http://{}/api", addr),
        state,
    }
}

/// Create a storefront app talking to `upstream`.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(upstream: &MockUpstream) -> (Router, Arc<AppState>) {
    let config = Config {
        api_base_url: upstream.base_url.clone(),
        ..Config::test_default()
    };
    let state = Arc::new(AppState::from_config(config).expect("Failed to build app state"));
    (create_router(state.clone()), state)
}

/// Send a request and decode the JSON body (`Value::Null` when empty).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, headers, json)
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, session: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = session {
        builder = builder.header(header::COOKIE, format!("learnhub_session={}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[allow(dead_code)]
pub fn get_request(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = session {
        builder = builder.header(header::COOKIE, format!("learnhub_session={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Sign in through the storefront and return the session token.
#[allow(dead_code)]
pub async fn login_as(app: &Router, email: &str) -> String {
    let (status, _, body) = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({"email": email, "password": PASSWORD}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["session_token"].as_str().unwrap().to_string()
}
