//! Cart extractor.
//!
//! Resolves the current session's cart from the [`CartRegistry`], assigning
//! the session a cart key on first use.
//!
//! [`CartRegistry`]: crate::services::CartRegistry

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::session_keys;
use crate::services::SharedCart;
use crate::state::AppState;

/// Extractor for the current session's cart.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentCart(cart): CurrentCart) -> impl IntoResponse {
///     let count = cart.lock().await.cart.item_count();
///     format!("{count} items")
/// }
/// ```
pub struct CurrentCart(pub SharedCart);

impl FromRequestParts<AppState> for CurrentCart {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let key = match session.get::<Uuid>(session_keys::CART_KEY).await? {
            Some(key) => key,
            None => {
                let key = Uuid::new_v4();
                session.insert(session_keys::CART_KEY, key).await?;
                tracing::debug!(cart_key = %key, "Assigned cart to new session");
                key
            }
        };

        Ok(Self(state.carts().get_or_create(key).await))
    }
}
