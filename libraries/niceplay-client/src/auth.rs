//! Authentication methods for the NicePlay backend.

use crate::error::{ClientError, Result};
use crate::types::{LoginResponse, UserInfo};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Authentication client for the NicePlay backend.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Login with an identifier (email or username) and password.
    ///
    /// Credentials travel as query parameters, which is what the backend expects.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<UserInfo> {
        let url = format!("{}/login", self.base_url);
        debug!(url = %url, identifier = %identifier, "Attempting login");

        let response = self
            .http
            .post(&url)
            .query(&[("identifier", identifier), ("password", password)])
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let body: LoginResponse = response.json().await.map_err(|e| {
                ClientError::ParseError(format!("Failed to parse login response: {}", e))
            })?;

            match (body.code, body.data) {
                (200, Some(user)) => {
                    info!(user_id = %user.id, username = %user.username, "Login successful");
                    Ok(user)
                }
                (200, None) => Err(ClientError::ParseError(
                    "Login succeeded without user data".to_string(),
                )),
                (code, _) => {
                    let message = body
                        .message
                        .unwrap_or_else(|| "Invalid identifier or password".to_string());
                    warn!(code, message = %message, "Login rejected");
                    Err(ClientError::AuthFailed(message))
                }
            }
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Login failed");
            Err(ClientError::AuthFailed(
                "Invalid identifier or password".to_string(),
            ))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}
