//! Local credential checks run before anything is sent.

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DEFAULT_DISPLAY_NAME: &str = "Traveler";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Email is required")]
    EmailRequired,
    #[error("Password is required")]
    PasswordRequired,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    Register,
}

/// Raw form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsForm {
    pub mode: AuthMode,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Checked input, ready for login or register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    SignIn { email: String, password: String },
    Register { email: String, password: String, name: String },
}

/// Validate `form` in field order; the first failure is reported.
///
/// # Errors
///
/// Returns the first [`ValidationError`] that applies.
pub fn validate_credentials(form: &CredentialsForm) -> Result<Credentials, ValidationError> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if form.password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    match form.mode {
        AuthMode::SignIn => Ok(Credentials::SignIn { email: email.to_owned(), password: form.password.clone() }),
        AuthMode::Register => {
            if form.password.chars().count() < MIN_PASSWORD_LEN {
                return Err(ValidationError::PasswordTooShort);
            }
            if form.password != form.confirm_password {
                return Err(ValidationError::PasswordMismatch);
            }
            let name = form.name.trim();
            let name = if name.is_empty() { DEFAULT_DISPLAY_NAME } else { name };
            Ok(Credentials::Register {
                email: email.to_owned(),
                password: form.password.clone(),
                name: name.to_owned(),
            })
        }
    }
}
