//! Blocking HTTP binding of [`TenantApi`].

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contextual::roster::api::{ApiError, InviteOutcome, TenantApi};
use crate::contextual::roster::config::Settings;
use crate::contextual::roster::error::Result;
use crate::contextual::roster::model::TenantUser;

/// Authenticated client for the `/users` endpoints.
///
/// Built once per invocation and passed by reference to the workflow; the
/// underlying connection pool is released when it is dropped.
#[derive(Debug)]
pub struct HttpTenantClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct NewUser<'a> {
    email: &'a str,
    is_tenant_admin: bool,
}

#[derive(Serialize)]
struct InviteRequest<'a> {
    tenant_short_name: &'a str,
    new_users: Vec<NewUser<'a>>,
}

#[derive(Deserialize)]
struct InviteResponse {
    #[serde(default)]
    invited_user_emails: BTreeSet<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct ListUsersResponse {
    #[serde(default)]
    users: Vec<TenantUser>,
}

#[derive(Serialize)]
struct RemoveRequest<'a> {
    email: &'a str,
}

impl HttpTenantClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    /// Sends `request`. A non-idempotent request that timed out may already
    /// have been applied, so only a failed connection makes it retryable.
    fn send(
        &self,
        request: RequestBuilder,
        idempotent: bool,
    ) -> std::result::Result<Response, ApiError> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|err| transport_error(err, idempotent))?;
        check_response(response)
    }
}

impl TenantApi for HttpTenantClient {
    fn list_members(&self) -> std::result::Result<Vec<TenantUser>, ApiError> {
        let response = self.send(self.client.get(self.users_url()), true)?;
        let body: ListUsersResponse = response
            .json()
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        debug!(count = body.users.len(), "listed tenant users");
        Ok(body.users)
    }

    fn add_members(
        &self,
        tenant: &str,
        emails: &[String],
        admin: bool,
    ) -> std::result::Result<InviteOutcome, ApiError> {
        let payload = InviteRequest {
            tenant_short_name: tenant,
            new_users: emails
                .iter()
                .map(|email| NewUser {
                    email,
                    is_tenant_admin: admin,
                })
                .collect(),
        };
        let response = self.send(self.client.post(self.users_url()).json(&payload), false)?;
        let body: InviteResponse = response
            .json()
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(InviteOutcome {
            invited: body.invited_user_emails,
            errors: body.errors,
        })
    }

    fn remove_member(&self, email: &str) -> std::result::Result<(), ApiError> {
        self.send(
            self.client
                .delete(self.users_url())
                .json(&RemoveRequest { email }),
            true,
        )?;
        Ok(())
    }
}

fn transport_error(err: reqwest::Error, idempotent: bool) -> ApiError {
    ApiError::Transport {
        retryable: transport_retryable(err.is_connect(), err.is_timeout(), idempotent),
        message: err.to_string(),
    }
}

fn transport_retryable(connect: bool, timeout: bool, idempotent: bool) -> bool {
    connect || (timeout && idempotent)
}

/// Maps non-success responses onto [`ApiError`].
fn check_response(response: Response) -> std::result::Result<Response, ApiError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);
        return Err(ApiError::RateLimited { retry_after_secs });
    }
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&body, status),
        });
    }
    Ok(response)
}

fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

/// Pulls a readable message out of an error body, preferring the `detail` or
/// `message` field of a JSON payload.
fn error_message(body: &str, status: StatusCode) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = parsed.as_ref().and_then(|value| {
        ["detail", "message", "error"]
            .iter()
            .find_map(|key| value.get(key))
            .map(|detail| match detail.as_str() {
                Some(text) => text.to_string(),
                None => detail.to_string(),
            })
    });

    match field {
        Some(message) => message,
        None if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        None => body.trim().to_string(),
    }
}
