use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenResponseData;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterCommand;
use crate::inbound::http::router::AppState;
use crate::user::errors::AccountError;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    state
        .auth_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|token| ApiSuccess::new(StatusCode::CREATED, TokenResponseData { token }))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, AccountError> {
        let name = DisplayName::new(self.name)?;
        let email = EmailAddress::new(self.email)?;
        Ok(RegisterCommand::new(name, email, self.password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "pw123".to_string(),
        }
    }

    #[test]
    fn test_valid_request_becomes_command() {
        let command = request("  Ann ", "ann@x.com")
            .try_into_command()
            .expect("Request should be valid");

        assert_eq!(command.name.as_str(), "Ann");
        assert_eq!(command.email.as_str(), "ann@x.com");
        assert_eq!(command.password, "pw123");
    }

    #[test]
    fn test_invalid_fields_are_unprocessable() {
        let err = request("Ann", "not-an-email").try_into_command().unwrap_err();
        assert!(matches!(err, AccountError::InvalidEmail(_)));
        assert!(!err.is_internal());
        assert!(matches!(ApiError::from(err), ApiError::UnprocessableEntity(_)));

        let err = request("   ", "ann@x.com").try_into_command().unwrap_err();
        assert!(matches!(err, AccountError::InvalidName(_)));
        assert!(matches!(ApiError::from(err), ApiError::UnprocessableEntity(_)));
    }
}
