// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication against the LearnHub API.
//!
//! Every method that changes credentials or the cached profile writes the
//! result into the caller's [`Session`]; persisting the session is left to
//! the route.

use crate::error::{AppError, Result};
use crate::models::user::validation_message;
use crate::models::{
    AuthResponse, LoginCredentials, ProfileUpdate, RegisterData, RegisterResponse, Session, User,
};
use crate::services::api::ApiClient;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Client for the `/auth/*` endpoints.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Sign in and store tokens plus user in `session`.
    pub async fn login(&self, session: &mut Session, credentials: &LoginCredentials) -> Result<User> {
        credentials
            .validate()
            .map_err(|e| AppError::Validation(validation_message(&e)))?;

        let response: AuthResponse = self
            .api
            .send_json(Method::POST, "/auth/login/", None, Some(credentials), "Login failed")
            .await?;

        tracing::info!(user_id = %response.user.id, role = ?response.user.role, "User logged in");

        session.access_token = Some(response.access);
        session.refresh_token = Some(response.refresh);
        session.user = Some(response.user.clone());
        Ok(response.user)
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, data: &RegisterData) -> Result<RegisterResponse> {
        data.validate()
            .map_err(|e| AppError::Validation(validation_message(&e)))?;

        let response: RegisterResponse = self
            .api
            .send_json(Method::POST, "/auth/register/", None, Some(data), "Registration failed")
            .await?;

        tracing::info!(username = %data.username, "User registered");
        Ok(response)
    }

    /// Fetch the profile and refresh the cached copy.
    pub async fn current_user(&self, session: &mut Session) -> Result<User> {
        let user: User = self
            .api
            .get_json(
                "/auth/profile/",
                Some(session.access_token()?),
                "Failed to get user profile",
            )
            .await?;

        session.user = Some(user.clone());
        Ok(user)
    }

    pub async fn update_profile(&self, session: &mut Session, update: &ProfileUpdate) -> Result<User> {
        let user: User = self
            .api
            .send_json(
                Method::PATCH,
                "/auth/profile/",
                Some(session.access_token()?),
                Some(update),
                "Failed to update profile",
            )
            .await?;

        session.user = Some(user.clone());
        Ok(user)
    }

    /// Exchange the refresh token for a new access token.
    pub async fn refresh_token(&self, session: &mut Session) -> Result<String> {
        let refresh = session.refresh_token.as_deref().ok_or_else(|| {
            tracing::debug!("Refresh requested without a refresh token");
            AppError::Unauthorized
        })?;

        let response: RefreshResponse = self
            .api
            .send_json(
                Method::POST,
                "/auth/refresh/",
                None,
                Some(&RefreshRequest { refresh }),
                "Token refresh failed",
            )
            .await?;

        session.access_token = Some(response.access.clone());
        Ok(response.access)
    }

    /// Forget tokens and user. Purely local.
    pub fn logout(&self, session: &mut Session) {
        if let Some(user) = &session.user {
            tracing::info!(user_id = %user.id, "User logged out");
        }
        session.clear();
    }
}
