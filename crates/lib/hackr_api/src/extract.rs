//! Extractors whose rejections use the API error body.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json<T>` that reports malformed bodies as `AppError::Validation`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
