//! HTTP route handlers for the storefront.
//!
//! All customer pages live under a locale prefix; an unknown locale
//! segment resolves to Arabic.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Redirect to the default locale
//! GET  /health                     - Health check
//!
//! # Pages (per locale)
//! GET  /{locale}                   - Landing page
//! GET  /{locale}/login             - Login page
//! POST /{locale}/login             - Login action
//! POST /{locale}/logout            - Logout action
//!
//! # Checkout
//! GET  /{locale}/checkout          - Order confirmation form
//! POST /{locale}/checkout          - Confirm order (submission orchestrator)
//! GET  /{locale}/success           - Order success page (or skeleton)
//! POST /{locale}/success/continue  - Continue shopping (clears the receipt)
//! ```

pub mod auth;
pub mod checkout;
pub mod home;
pub mod success;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::root_redirect))
        .route("/{locale}", get(home::home))
        // Auth
        .route("/{locale}/login", get(auth::login_page).post(auth::login))
        .route("/{locale}/logout", post(auth::logout))
        // Checkout confirmation flow
        .route(
            "/{locale}/checkout",
            get(checkout::show).post(checkout::confirm),
        )
        .route("/{locale}/success", get(success::show))
        .route(
            "/{locale}/success/continue",
            post(success::continue_shopping),
        )
}
