use axum::extract::FromRequest;

use crate::app_error::AppError;

/// `axum::Json`, but rejections are answered with [`AppError::BadRequest`] inside the usual
/// response envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
