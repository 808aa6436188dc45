//! HTTP Basic authentication extractor.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{authorization::Basic, Authorization, HeaderMapExt};

use crate::auth::{authenticate, AuthSession, Credentials};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Extractor for the authenticated user.
///
/// Verifies HTTP Basic credentials against the user table. Requests without
/// valid credentials are rejected with 401 and a Basic challenge.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthSession);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let Authorization(basic) = parts
                .headers
                .typed_get::<Authorization<Basic>>()
                .ok_or_else(|| ApiError::unauthorized("Missing credentials"))?;

            let credentials = Credentials::new(basic.username(), basic.password());
            let session = authenticate(state.db.pool(), credentials)
                .await
                .map_err(|e| {
                    tracing::debug!("Basic authentication failed: {}", e);
                    ApiError::from(e)
                })?;

            Ok(CurrentUser(session))
        })
    }
}
