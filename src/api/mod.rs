//! HTTP layer: the authorized request client and the authentication flows
//! built on top of it.

mod auth;
mod client;

pub use auth::{login, post_login_destination, register, sign_out, LOGIN_PATH, REGISTER_PATH, SIGNOUT_PATH};
pub use client::{ApiClient, ApiResponse, NETWORK_ERROR_MSG};
