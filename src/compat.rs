use std::error::Error;

use axum::extract::{rejection::QueryRejection, FromRequestParts};

use crate::error::AppError;

/// `Query`, but a malformed query string answers with a JSON error instead
/// of axum's plain text.
#[derive(FromRequestParts, Debug)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct MyQuery<T>(pub T);

impl From<QueryRejection> for AppError {
    fn from(value: QueryRejection) -> Self {
        let mut s = format!("{}", value);

        let mut source_ = value.source();
        while let Some(source) = source_ {
            s.push_str(&format!(": {}", source));
            source_ = source.source();
        }

        AppError::InvalidQuery(s)
    }
}
