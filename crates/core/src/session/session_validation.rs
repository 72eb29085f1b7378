use lazy_static::lazy_static;
use regex::Regex;

use super::RegistrationForm;
use crate::constants::{MIN_NAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USER_ID_LENGTH};
use crate::errors::ValidationError;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid");
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Check a registration form. The first failing rule wins.
pub fn validate_registration(form: &RegistrationForm) -> Result<(), ValidationError> {
    require(&form.id, "User ID")?;
    require(&form.name, "Name")?;
    require(&form.email, "Email")?;
    require(&form.password, "Password")?;
    require(&form.confirm_password, "Password confirmation")?;

    if form.id.trim().chars().count() < MIN_USER_ID_LENGTH {
        return Err(ValidationError::IdTooShort);
    }
    if form.name.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(ValidationError::NameTooShort);
    }
    if !is_valid_email(form.email.trim()) {
        return Err(ValidationError::InvalidEmail);
    }
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::WeakPassword);
    }
    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    require(email, "Email")?;
    require(password, "Password")?;
    if !is_valid_email(email.trim()) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}
