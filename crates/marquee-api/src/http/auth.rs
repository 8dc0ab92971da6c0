use reqwest::Client;

use super::client::check_response;
use super::types::AuthResponse;
use crate::error::GatewayError;
use crate::traits::AuthUser;

/// Exchange credentials for the user record.
pub async fn login(
    http: &Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<AuthUser, GatewayError> {
    let resp = http
        .post(format!("{base_url}/login"))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await?;

    read_auth_response(resp).await
}

/// Create an account. The backend signs the new user in on success.
pub async fn signup(
    http: &Client,
    base_url: &str,
    email: &str,
    password: &str,
    name: &str,
) -> Result<AuthUser, GatewayError> {
    let resp = http
        .post(format!("{base_url}/signup"))
        .json(&serde_json::json!({ "email": email, "password": password, "name": name }))
        .send()
        .await?;

    read_auth_response(resp).await
}

async fn read_auth_response(resp: reqwest::Response) -> Result<AuthUser, GatewayError> {
    let status = resp.status().as_u16();
    let resp = check_response(resp).await?;
    let body: AuthResponse = resp
        .json()
        .await
        .map_err(|e| GatewayError::Parse(e.to_string()))?;

    // Some handlers answer 200 with `ok: false` instead of a 401.
    if !body.ok {
        return Err(GatewayError::Unauthorized {
            status,
            message: body.error.unwrap_or_else(|| "credentials rejected".into()),
        });
    }

    body.user
        .map(AuthUser::from)
        .ok_or_else(|| GatewayError::Parse("auth response without user".into()))
}
