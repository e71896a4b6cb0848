use serde::Deserialize;

use crate::error::AppError;
use crate::users::repo_types::NewUser;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl CreateUserRequest {
    /// Every field is required and must be non-blank.
    pub fn into_new_user(self) -> Result<NewUser, AppError> {
        let username = required("username", self.username)?;
        let email = required("email", self.email)?;
        let password = required("password", self.password)?;
        Ok(NewUser::new(username, email, password))
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}
