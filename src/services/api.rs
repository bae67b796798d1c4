// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Thin JSON client for the LearnHub REST API.
//!
//! Every endpoint wrapper funnels through [`ApiClient::request`], which
//! attaches the bearer token when one is given and turns non-2xx answers into
//! [`AppError::Upstream`] carrying the most useful server message:
//! - `detail` (auth endpoints)
//! - `error` (enroll, payments)
//! - otherwise every field-validation message joined with ", "
//!
//! No retries. Callers refresh tokens explicitly.

use crate::error::AppError;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// LearnHub API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("learnhub-storefront/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET with JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: Option<&str>,
        fallback: &str,
    ) -> Result<T, AppError> {
        self.request::<T, (), ()>(Method::GET, path, access_token, None, None, fallback)
            .await
    }

    /// GET with query string and JSON response.
    pub async fn get_json_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
        access_token: Option<&str>,
        fallback: &str,
    ) -> Result<T, AppError> {
        self.request::<T, (), Q>(Method::GET, path, access_token, None, Some(query), fallback)
            .await
    }

    /// Request with an optional JSON body and JSON response.
    pub async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        access_token: Option<&str>,
        body: Option<&B>,
        fallback: &str,
    ) -> Result<T, AppError> {
        self.request::<T, B, ()>(method, path, access_token, body, None, fallback)
            .await
    }

    async fn request<T, B, Q>(
        &self,
        method: Method,
        path: &str,
        access_token: Option<&str>,
        body: Option<&B>,
        query: Option<&Q>,
        fallback: &str,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(method = %method, path, "Calling LearnHub API");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(method = %method, path, error = %e, "LearnHub API request failed");
            AppError::Network(e.to_string())
        })?;

        self.check_response_json(response, fallback).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        fallback: &str,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|json| extract_error_message(&json))
                .unwrap_or_else(|| fallback.to_string());

            tracing::debug!(status = status.as_u16(), error = %message, "LearnHub API error");
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("JSON parse error: {}", e)))
    }
}

/// Best user-facing message in an error body, if any.
pub fn extract_error_message(body: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    for key in ["detail", "error"] {
        if let Some(Value::String(msg)) = body.get(key) {
            if !msg.trim().is_empty() {
                return Some(msg.clone());
            }
        }
    }

    let mut messages = Vec::new();
    match body {
        Value::Object(fields) => {
            for value in fields.values() {
                collect_messages(value, &mut messages);
            }
        }
        Value::Array(_) => collect_messages(body, &mut messages),
        _ => {}
    }

    if messages.is_empty() {
        None
    } else {
        Some(messages.join(", "))
    }
}

fn collect_messages(value: &serde_json::Value, out: &mut Vec<String>) {
    use serde_json::Value;

    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                collect_messages(item, out);
            }
        }
        Value::Object(fields) => {
            for nested in fields.values() {
                collect_messages(nested, out);
            }
        }
        _ => {}
    }
}

/// Percent-encode a single path segment.
pub fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
