//! Query string extractor with API-shaped rejections.

use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Query parameter extractor that rejects with [`Error`].
///
/// ```rust,no_run
/// use blobnav_server::extract::Query;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Params {
///     path: Option<String>,
///     page_size: Option<u32>,
/// }
///
/// async fn list(Query(params): Query<Params>) {
///     let _ = (params.path, params.page_size);
/// }
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    /// Creates a new [`Query`] wrapper around the provided query parameters.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Consumes the wrapper and returns the inner query parameters.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumQuery::<T>::from_request_parts(parts, state).await {
            Ok(AxumQuery(query)) => Ok(Query(query)),
            Err(rejection) => Err(enhance_query_error(rejection)),
        }
    }
}

/// Converts an axum query rejection into a `400 bad_request`.
fn enhance_query_error(rejection: QueryRejection) -> Error<'static> {
    tracing::debug!(
        target: "blobnav_server::extract::query",
        error = %rejection,
        "Query parameter parsing failed"
    );

    match rejection {
        QueryRejection::FailedToDeserializeQueryString(err) => {
            let error_message = err.to_string();

            if error_message.contains("invalid digit") || error_message.contains("invalid type") {
                ErrorKind::BadRequest
                    .with_message("Invalid query parameter type")
                    .with_context(error_message)
            } else if error_message.contains("duplicate field") {
                let field_name = extract_field_name_from_error(&error_message);
                ErrorKind::BadRequest
                    .with_message("Duplicate query parameter")
                    .with_context(format!(
                        "The query parameter '{}' was provided multiple times",
                        field_name.unwrap_or("unknown")
                    ))
            } else {
                ErrorKind::BadRequest
                    .with_message("Invalid query parameters")
                    .with_context(error_message)
            }
        }
        _ => ErrorKind::BadRequest
            .with_message("Invalid query parameters")
            .with_context("The query string could not be parsed"),
    }
}

/// Extracts the backtick-quoted field name from a serde error message.
fn extract_field_name_from_error(error_message: &str) -> Option<&str> {
    let start = error_message.find('`')?;
    let end = error_message[start + 1..].find('`')?;
    Some(&error_message[start + 1..start + 1 + end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_field_name_from_error() {
        assert_eq!(
            extract_field_name_from_error("duplicate field `pageSize`"),
            Some("pageSize")
        );
        assert_eq!(extract_field_name_from_error("some other error"), None);
    }

    #[test]
    fn test_query_creation() {
        let query = Query::new("test".to_string());
        assert_eq!(query.into_inner(), "test");
    }
}
