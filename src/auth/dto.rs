use serde::{Deserialize, Serialize};

/// Request body for user registration. Fields default to empty so a
/// missing key and an empty value fail validation the same way.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Status-message body returned on successful registration.
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
}
