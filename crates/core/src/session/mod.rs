//! Authenticated-identity lifecycle.

mod credentials;
mod session_model;
mod session_service;
mod session_validation;


pub use credentials::{Credential, PasswordHash};
pub use session_model::{LogoutTicket, RegistrationForm, Session, SessionState};
pub use session_service::SessionStore;
pub use session_validation::{is_valid_email, validate_login, validate_registration};
