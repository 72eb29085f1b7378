use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Email and raw password as typed by the user. Never persisted.
#[derive(Clone)]
pub struct Credential {
    pub email: String,
    raw_password: String,
}

impl Credential {
    pub fn new(email: impl Into<String>, raw_password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            raw_password: raw_password.into(),
        }
    }

    /// Consume the credential, keeping only the email and the digest.
    pub fn into_hashed(self) -> (String, PasswordHash) {
        let hash = PasswordHash::from_raw(self.raw_password);
        (self.email, hash)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("raw_password", &"<redacted>")
            .finish()
    }
}

/// Lowercase hex SHA-256 digest of a password.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash and wipe the raw password.
    pub fn from_raw(raw: String) -> Self {
        let mut bytes = raw.into_bytes();
        let digest = Sha256::digest(&bytes);
        bytes.fill(0);
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
