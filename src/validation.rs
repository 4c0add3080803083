//! Input checks for account and settings forms.

/// Minimum accepted password length for new accounts.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("All fields are required")]
    MissingFields,
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
    #[error("Webhook URL must start with http:// or https://")]
    InvalidWebhookUrl,
}

/// Check if a given string looks like an email address.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Validates a sign-up form before it is sent to the backend.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), FormError> {
    if [name, email, password, confirm_password]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(FormError::MissingFields);
    }
    if !is_valid_email(email) {
        return Err(FormError::InvalidEmail(email.to_string()));
    }
    if password != confirm_password {
        return Err(FormError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort);
    }
    Ok(())
}

/// An empty webhook URL clears the webhook; anything else must be http(s).
pub fn validate_webhook_url(url: &str) -> Result<(), FormError> {
    let url = url.trim();
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(FormError::InvalidWebhookUrl)
    }
}
