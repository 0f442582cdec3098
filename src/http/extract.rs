//! Request extractors

use crate::http::errors::HttpError;
use axum::extract::FromRequest;

/// `axum::Json` whose rejections render as [`HttpError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(HttpError))]
pub struct ApiJson<T>(pub T);
