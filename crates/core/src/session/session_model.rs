use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile of the signed-in user, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub token_balance: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

/// Lifecycle of the local identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Fields of the registration form, before validation.
#[derive(Clone, Default)]
pub struct RegistrationForm {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Proof that logout was requested for a specific session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutTicket {
    pub session_id: String,
    pub(crate) sign_in: u64,
    pub(crate) nonce: Uuid,
}

impl LogoutTicket {
    pub(crate) fn issue(session_id: &str, sign_in: u64) -> Self {
        Self {
            session_id: session_id.to_string(),
            sign_in,
            nonce: Uuid::new_v4(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_wire_format() {
        let json = r#"{
            "id": "alice",
            "name": "Alice",
            "email": "alice@example.com",
            "tokenBalance": 120,
            "createdAt": "2024-03-01T10:00:00Z",
            "lastLogin": null
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.id, "alice");
        assert_eq!(session.token_balance, 120);
        assert_eq!(session.last_login, None);
    }

    #[test]
    fn test_registration_form_debug_hides_passwords() {
        let form = RegistrationForm {
            id: "alice".into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "correct horse".into(),
            confirm_password: "correct horse".into(),
        };
        assert!(!format!("{:?}", form).contains("correct horse"));
    }

    #[test]
    fn test_tickets_are_unique() {
        assert_ne!(LogoutTicket::issue("alice", 1), LogoutTicket::issue("alice", 1));
    }
}
