use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Request, catch};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::error::AppError;

/// Error body shared by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ValidationResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub errors: HashMap<String, Vec<String>>,
}

impl ValidationResponse {
    pub fn message(message: &str) -> Self {
        Self {
            message: message.to_string(),
            errors: HashMap::new(),
        }
    }

    pub fn from_validation_errors(message: &str, errors: &validator::ValidationErrors) -> Self {
        let mut error_map = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let error_messages: Vec<String> = field_errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .clone()
                        .unwrap_or_else(|| "Invalid value".into())
                        .to_string()
                })
                .collect();

            error_map.insert(field.to_string(), error_messages);
        }

        Self {
            message: message.to_string(),
            errors: error_map,
        }
    }
}

pub trait JsonValidateExt<T> {
    /// Unwraps the JSON body after running its `validator` rules.
    fn validate_custom(self) -> Result<T, AppError>;
}

impl<T: Validate> JsonValidateExt<T> for Json<T> {
    fn validate_custom(self) -> Result<T, AppError> {
        let inner = self.into_inner();
        inner.validate()?;
        Ok(inner)
    }
}

#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request) -> Custom<Json<ValidationResponse>> {
    let message = match status.code {
        400 => "Bad request",
        401 => "Authentication required",
        403 => "You don't have permission to perform this action",
        404 => "Resource not found",
        409 => "Resource already exists",
        422 => "Request body could not be parsed",
        503 => "Service unavailable",
        500..=599 => "Internal server error",
        _ => "An error occurred",
    };

    Custom(status, Json(ValidationResponse::message(message)))
}
