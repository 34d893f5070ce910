use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role as reported by the server. Unknown role strings degrade to `User` so
/// a stored identity never fails to load because the server grew a new role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case("admin") { Role::Admin } else { Role::User }
    }
}

/// The authenticated principal as known to the client. Profile fields the
/// client does not interpret ride along in `extra` and round-trip through the
/// credential store untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque server-assigned id; may be numeric or string depending on backend.
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    /// Name to show in the UI: full name, else email, else a literal "User".
    pub fn display_name(&self) -> String {
        if let Some(name) = self.full_name.as_deref() {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        if !self.email.is_empty() {
            return self.email.clone();
        }
        "User".to_string()
    }
}
