//! Input validation utilities

/// Validate the login request payload
///
/// Both fields must be present and non-empty. Validation failures stop at
/// the HTTP boundary and never reach the login use case.
pub fn validate_login_request(
    username: Option<&str>,
    password: Option<&str>,
) -> Result<(), String> {
    match (username, password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => Ok(()),
        _ => Err("Username and password are required".to_string()),
    }
}
