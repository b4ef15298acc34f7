use axum::{extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;
use service_core::error::AppError;

/// Query string extractor whose rejections render as `AppError` JSON.
#[derive(Debug)]
pub struct Query<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Invalid query: {}", e.body_text()))
                })?;
        Ok(Query(value))
    }
}

/// Path parameter extractor whose rejections render as `AppError` JSON.
#[derive(Debug)]
pub struct Path<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) = axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Invalid path: {}", e.body_text()))
            })?;
        Ok(Path(value))
    }
}
