use crate::core::errors::{WishlistError, WishlistResult};

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn validate_password(candidate: &str) -> WishlistResult<()> {
    if candidate.is_empty() {
        return Err(WishlistError::invalid_argument("password is required"));
    }
    if candidate.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(WishlistError::invalid_argument(
            "password must be at least 6 characters long",
        ));
    }
    Ok(())
}

/// Trims and lowercases an email; rejects anything without a local part and a domain.
pub fn normalize_email(candidate: &str) -> WishlistResult<String> {
    let email = candidate.trim().to_lowercase();
    if email.is_empty() {
        return Err(WishlistError::invalid_argument("email is required"));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(WishlistError::invalid_argument("email is malformed"));
    };
    if local.is_empty() || domain.is_empty() || email.contains('/') {
        return Err(WishlistError::invalid_argument("email is malformed"));
    }
    Ok(email)
}

pub fn validate_display_name(candidate: &str) -> WishlistResult<()> {
    if candidate.trim().is_empty() {
        return Err(WishlistError::invalid_argument("name is required"));
    }
    Ok(())
}
