//! Login, registration and sign-out flows against the auth endpoints.
//! The endpoints return either `{token, user}` on success or `{error}` on
//! failure; these flows depend on nothing beyond that shape.

use serde::Deserialize;
use serde_json::json;

use super::client::{ApiClient, ApiResponse};
use crate::session::{CredentialStore, Identity, SessionController, HOME_ROUTE, LOGIN_ROUTE};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const SIGNOUT_PATH: &str = "/api/auth/logout";

#[derive(Debug, Deserialize)]
struct AuthBody {
    token: String,
    #[serde(alias = "identity")]
    user: Identity,
}

/// Authenticate and commit the returned session. On failure the server's
/// message is surfaced verbatim through the response; the controller is left
/// untouched.
pub async fn login(
    client: &ApiClient,
    controller: &SessionController,
    email: &str,
    password: &str,
) -> ApiResponse {
    let resp = client.post(LOGIN_PATH, &json!({"email": email, "password": password})).await;
    if resp.success {
        match resp.decode::<AuthBody>() {
            Some(body) => {
                controller.login_commit(&body.token, body.user);
                tracing::info!(target: "auth", email = %email, "auth.login ok");
            }
            None => {
                tracing::error!(target: "auth", "auth.login response missing token/user");
                return ApiResponse::fail("Malformed authentication response.");
            }
        }
    }
    resp
}

/// Create an account, then log in with the same credentials. The registration
/// response is not trusted to carry a usable session.
pub async fn register(
    client: &ApiClient,
    controller: &SessionController,
    email: &str,
    password: &str,
) -> ApiResponse {
    let resp = client.post(REGISTER_PATH, &json!({"email": email, "password": password})).await;
    if !resp.success {
        return resp;
    }
    tracing::info!(target: "auth", email = %email, "auth.register ok, performing follow-up login");
    login(client, controller, email, password).await
}

/// End the session. The remote sign-out is best-effort and detached: the
/// local logout completes immediately even if the server never answers.
pub fn sign_out(client: &ApiClient, controller: &SessionController) {
    let remote = client.clone();
    tokio::spawn(async move {
        let _ = remote.post(SIGNOUT_PATH, &json!({})).await;
    });
    controller.logout();
}

/// Where to go after a successful login: the remembered route if one was
/// recorded (consumed here, single-use), otherwise home. Never the login
/// route itself.
pub fn post_login_destination(store: &CredentialStore) -> String {
    match store.take_redirect() {
        Some(path) if path != LOGIN_ROUTE => path,
        _ => HOME_ROUTE.to_string(),
    }
}
