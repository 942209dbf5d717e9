//! Authentication extractors and session helpers.
//!
//! Login writes the backend identity into the session under two keys: the
//! full [`CurrentUser`] record and the bare `userId` handoff key the
//! checkout flow reads.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::i18n::Locale;
use crate::models::{CurrentUser, session_keys};
use crate::storage::StoreError;

/// Extractor that requires a logged-in customer.
///
/// If nobody is logged in, redirects to the locale's login page carrying
/// the original path in `?redirect=`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.user_id)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Rejection when authentication is required but nobody is logged in.
pub struct AuthRejection {
    locale: Locale,
    redirect: String,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let target = format!(
            "/{}/login?redirect={}",
            self.locale,
            urlencoding::encode(&self.redirect)
        );
        Redirect::to(&target).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        let locale = locale_from_path(&path);
        let rejection = || AuthRejection {
            locale,
            redirect: path.clone(),
        };

        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().ok_or_else(rejection)?;

        let user = session_keys::CURRENT_USER
            .load(session)
            .await
            .ok()
            .flatten()
            .ok_or_else(rejection)?;

        Ok(Self(user))
    }
}

/// The locale segment of a request path (`/en/checkout` -> `En`).
fn locale_from_path(path: &str) -> Locale {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .map_or(Locale::Ar, Locale::resolve)
}

/// Set the logged-in customer in the session.
///
/// Writes both the full identity and the `userId` handoff key.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(session: &Session, user: &CurrentUser) -> Result<(), StoreError> {
    session_keys::CURRENT_USER.save(session, user).await?;
    session_keys::USER_ID.save(session, &user.user_id).await
}

/// Clear the logged-in customer from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), StoreError> {
    session_keys::CURRENT_USER.clear(session).await?;
    session_keys::USER_ID.clear(session).await
}
