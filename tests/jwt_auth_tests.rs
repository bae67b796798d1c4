// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session JWT tests.
//!
//! These tests verify that session tokens created at login decode with the
//! claims the auth middleware expects, catching compatibility issues early.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use learnhub_storefront::middleware::auth::{
    create_session_jwt, session_id_from_request, Claims, SESSION_COOKIE,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SIGNING_KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

#[test]
fn test_session_jwt_roundtrip() {
    let token = create_session_jwt("session-abc", SIGNING_KEY, Duration::from_secs(3600))
        .expect("Failed to create JWT");

    let key = DecodingKey::from_secret(SIGNING_KEY);
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, "session-abc");
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_session_jwt_expiration_matches_ttl() {
    let ttl = Duration::from_secs(7 * 24 * 60 * 60);
    let token = create_session_jwt("session-abc", SIGNING_KEY, ttl).unwrap();

    let key = DecodingKey::from_secret(SIGNING_KEY);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false; // We'll check manually
    let token_data = decode::<Claims>(&token, &key, &validation).unwrap();

    let expected = now() + ttl.as_secs() as usize;
    assert!(token_data.claims.exp + 5 >= expected);
    assert!(token_data.claims.exp <= expected + 5);
}

#[test]
fn test_cookie_wins_over_bearer() {
    let from_cookie = create_session_jwt("cookie-session", SIGNING_KEY, Duration::from_secs(60))
        .unwrap();
    let from_header = create_session_jwt("header-session", SIGNING_KEY, Duration::from_secs(60))
        .unwrap();

    let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, from_cookie));
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        format!("Bearer {}", from_header).parse().unwrap(),
    );

    assert_eq!(
        session_id_from_request(&jar, &headers, SIGNING_KEY).as_deref(),
        Some("cookie-session")
    );
    assert_eq!(
        session_id_from_request(&CookieJar::new(), &headers, SIGNING_KEY).as_deref(),
        Some("header-session")
    );
}

#[test]
fn test_expired_or_foreign_tokens_are_ignored() {
    let expired = encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            sub: "old-session".to_string(),
            iat: now() - 7200,
            exp: now() - 3600,
        },
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap();
    let foreign = create_session_jwt(
        "other-session",
        b"some_other_key_that_is_32_bytes!",
        Duration::from_secs(60),
    )
    .unwrap();

    for token in [expired, foreign] {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, token));
        assert_eq!(
            session_id_from_request(&jar, &HeaderMap::new(), SIGNING_KEY),
            None
        );
    }
}
