//! Durable credential storage under the profile directory.
//! The token and identity snapshot live in one JSON document so the pair is
//! atomic by construction: either both halves are present on a read or the
//! record does not exist. A record that fails to deserialize is corrupt and is
//! deleted on the spot; absence is a normal outcome, never an error.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::identity::Identity;
use crate::error::{ClientError, ClientResult};

pub const CREDENTIALS_FILE: &str = "credentials.json";
pub const REDIRECT_FILE: &str = "redirect_after_login";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub access_token: String,
    pub identity: Identity,
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    root: PathBuf,
}

impl CredentialStore {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    fn record_path(&self) -> PathBuf { self.root.join(CREDENTIALS_FILE) }
    fn redirect_path(&self) -> PathBuf { self.root.join(REDIRECT_FILE) }

    /// Persist the token+identity pair. Written to a temp file and renamed
    /// over the live record so a reader sees the old pair or the new pair,
    /// never a torn write.
    pub fn write(&self, token: &str, identity: &Identity) -> ClientResult<()> {
        fs::create_dir_all(&self.root)?;
        let record = CredentialRecord { access_token: token.to_string(), identity: identity.clone() };
        let json = serde_json::to_vec_pretty(&record)?;
        let tmp = self.root.join(format!("{CREDENTIALS_FILE}.tmp"));
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, self.record_path())?;
        Ok(())
    }

    /// Read the stored pair. Absence returns `Ok(None)`; a corrupt or
    /// half-empty record is deleted and also reported as absent, so the
    /// corruption never resurfaces on a later read. Only genuine I/O trouble
    /// (storage unavailable, permissions) is an error.
    pub fn read(&self) -> ClientResult<Option<(String, Identity)>> {
        let path = self.record_path();
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::storage(e.to_string())),
        };
        match serde_json::from_slice::<CredentialRecord>(&bytes) {
            Ok(rec) if !rec.access_token.is_empty() => Ok(Some((rec.access_token, rec.identity))),
            _ => {
                tracing::warn!(target: "session", "discarding corrupt credential record");
                let _ = fs::remove_file(&path);
                Ok(None)
            }
        }
    }

    /// Remove the record. Idempotent: clearing an empty store is fine.
    pub fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(self.record_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::storage(e.to_string())),
        }
    }

    /// Freshest on-disk token, used by the API client on every call so a
    /// logout takes effect immediately for subsequent requests.
    pub fn token(&self) -> Option<String> {
        self.read().ok().flatten().map(|(token, _)| token)
    }

    /// Record the route a viewer tried to reach before being sent to log in.
    pub fn remember_redirect(&self, path: &str) -> ClientResult<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.redirect_path(), path)?;
        Ok(())
    }

    /// Consume the pending redirect target; single-use by contract.
    pub fn take_redirect(&self) -> Option<String> {
        let path = self.redirect_path();
        let raw = fs::read_to_string(&path).ok()?;
        let _ = fs::remove_file(&path);
        let target = raw.trim().to_string();
        if target.is_empty() { None } else { Some(target) }
    }
}
