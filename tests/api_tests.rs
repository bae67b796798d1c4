// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON API tests: reference data, enrollment and course authoring.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

mod common;
use common::{get_request, json_request, send, INSTRUCTOR_EMAIL, STUDENT_EMAIL};

#[tokio::test]
async fn test_health() {
    let upstream = common::spawn_upstream().await;
    let (app, _) = common::create_test_app(&upstream);

    let (status, _, body) = send(&app, get_request("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_currencies() {
    let upstream = common::spawn_upstream().await;
    let (app, _) = common::create_test_app(&upstream);

    let (status, headers, body) = send(&app, get_request("/api/currencies", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["code"].as_str())
        .collect();
    assert_eq!(codes, vec!["USD", "ZMW", "ZAR", "KES", "NGN"]);
}

#[tokio::test]
async fn test_payment_methods_by_country_and_currency() {
    let upstream = common::spawn_upstream().await;
    let (app, _) = common::create_test_app(&upstream);

    let (status, _, body) = send(
        &app,
        get_request("/api/payment-methods?country=zm&currency=KES", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["stripe", "airtel_money", "paypal"]);
    assert_eq!(body[1]["type"], "mobile_money");

    let (status, _, _) = send(
        &app,
        get_request("/api/payment-methods?currency=XYZ", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_enroll() {
    let upstream = common::spawn_upstream().await;
    let (app, _) = common::create_test_app(&upstream);
    let token = common::login_as(&app, STUDENT_EMAIL).await;

    let (status, _, body) = send(
        &app,
        json_request("POST", "/api/courses/c1/enroll", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["course"]["id"], "c1");

    let (status, _, body) = send(
        &app,
        json_request("POST", "/api/courses/c2/enroll", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Already enrolled in this course");
}

#[tokio::test]
async fn test_enroll_requires_session() {
    let upstream = common::spawn_upstream().await;
    let (app, _) = common::create_test_app(&upstream);

    let (status, _, _) = send(
        &app,
        json_request("POST", "/api/courses/c1/enroll", None, json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        upstream
            .state
            .enroll_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_create_course() {
    let upstream = common::spawn_upstream().await;
    let (app, _) = common::create_test_app(&upstream);
    let instructor = common::login_as(&app, INSTRUCTOR_EMAIL).await;
    let student = common::login_as(&app, STUDENT_EMAIL).await;
    let course = json!({"title": "Figma for Beginners", "price": 29.99, "category": "Design"});

    let (status, _, body) = send(
        &app,
        json_request("POST", "/api/instructor/courses", Some(&instructor), course.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Figma for Beginners");
    assert_eq!(body["price"], 29.99);
    assert_eq!(body["instructor_name"], "Test User");

    let (status, _, _) = send(
        &app,
        json_request("POST", "/api/instructor/courses", Some(&student), course),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/api/instructor/courses",
            Some(&instructor),
            json!({"title": "  ", "price": 10.0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Title is required");
}

#[tokio::test]
async fn test_security_headers_on_public_page() {
    let upstream = common::spawn_upstream().await;
    let (app, _) = common::create_test_app(&upstream);

    let (_, headers, _) = send(&app, get_request("/pages/home", None)).await;

    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert_eq!(
        headers.get("Referrer-Policy").unwrap(),
        "strict-origin-when-cross-origin"
    );
    assert!(headers.get(header::CACHE_CONTROL).is_none());
}

#[tokio::test]
async fn test_cors_allows_frontend_with_credentials() {
    let upstream = common::spawn_upstream().await;
    let (app, _) = common::create_test_app(&upstream);

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/me")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );

    let request = Request::builder()
        .uri("/api/currencies")
        .header(header::ORIGIN, "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app, request).await;
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
