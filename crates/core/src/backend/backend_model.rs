use serde::{Deserialize, Serialize};

use crate::session::PasswordHash;

/// Arguments of `registerUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: PasswordHash,
}

/// Arguments of `loginUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password_hash: PasswordHash,
}

/// Result of `registerUser`.
///
/// The canister answers with a plain boolean, which maps to `Created` or
/// `Rejected`. Gateways that report which field clashed map to the specific
/// variants instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Created,
    Rejected,
    EmailTaken,
    IdTaken,
}

impl From<bool> for RegistrationOutcome {
    fn from(accepted: bool) -> Self {
        if accepted {
            RegistrationOutcome::Created
        } else {
            RegistrationOutcome::Rejected
        }
    }
}
