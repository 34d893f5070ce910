//! Environment-derived configuration for the client core.
//! Absence of any variable must never fail construction; missing pieces only
//! surface when the thing that needs them is used (e.g. a request without a
//! base URL fails as a normal request failure).

use std::path::PathBuf;

pub const ENV_API_URL: &str = "BAZAAR_API_URL";
pub const ENV_PROFILE_DIR: &str = "BAZAAR_PROFILE_DIR";
pub const ENV_ADMIN_EMAIL: &str = "BAZAAR_ADMIN_EMAIL";

pub const DEFAULT_PROFILE_DIR: &str = ".bazaar";
/// Bootstrap admin address. Kept from the legacy client but promoted to
/// configuration so deployments can point it at an unused address; the role
/// field on the identity is the primary admin mechanism.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for all API calls; optional, requests fail without it.
    pub api_base: Option<String>,
    /// Root directory for the durable credential store.
    pub profile_dir: PathBuf,
    /// Email address treated as admin regardless of role.
    pub bootstrap_admin_email: String,
}

impl Config {
    pub fn from_env() -> Self {
        let api_base = std::env::var(ENV_API_URL).ok().filter(|s| !s.trim().is_empty());
        let profile_dir = std::env::var(ENV_PROFILE_DIR).unwrap_or_else(|_| DEFAULT_PROFILE_DIR.to_string());
        let bootstrap_admin_email =
            std::env::var(ENV_ADMIN_EMAIL).unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());
        Self { api_base, profile_dir: PathBuf::from(profile_dir), bootstrap_admin_email }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: None,
            profile_dir: PathBuf::from(DEFAULT_PROFILE_DIR),
            bootstrap_admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
        }
    }
}
