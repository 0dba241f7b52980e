use axum::Json;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{AppError, FieldError};

/// JSON extractor that validates the payload before the handler runs.
/// Deserialization and validation failures both surface as a 400 with a
/// field-level error list, and no storage call is made.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            AppError::Validation(vec![FieldError {
                field: "body".to_string(),
                message: e.body_text(),
            }])
        })?;

        value
            .validate()
            .map_err(|e| AppError::Validation(collect_field_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

fn collect_field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut collected: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid")),
            })
        })
        .collect();
    collected.sort_by(|a, b| a.field.cmp(&b.field));
    collected
}
