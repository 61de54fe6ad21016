use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use tracing::debug;

use crate::error::AppError;

/// `Json<T>` whose rejections come back as `VALIDATION_FAILED`.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "rejected request body");
                Err(AppError::Validation(json_message(&rejection).into()))
            }
        }
    }
}

// Serde detail stays in the debug log.
fn json_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "expected an application/json body",
        JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
        JsonRejection::JsonDataError(_) => "request body has a field of the wrong type",
        _ => "invalid request body",
    }
}

/// `Path<T>` whose rejections come back as `VALIDATION_FAILED`.
pub struct AppPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for AppPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(AppPath(value)),
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "rejected path parameter");
                Err(AppError::Validation("invalid path parameter".into()))
            }
        }
    }
}
