//! Authentication route handlers.
//!
//! Login delegates to the commerce backend; the storefront keeps no
//! credentials. A successful login stores the backend identity in the
//! session and honors a `?redirect=` path back to where the customer came
//! from.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::commerce::CommerceError;
use crate::filters;
use crate::i18n::{Locale, Messages};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub redirect: Option<String>,
}

/// Only relative paths are allowed as post-login targets.
fn sanitize_redirect(redirect: Option<&str>) -> &str {
    match redirect {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

/// Map an error code from the query string to a localized message.
fn error_message(code: &str, t: &'static Messages) -> &'static str {
    match code {
        "network" => t.network_error,
        _ => t.login_failed,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub locale: Locale,
    pub t: &'static Messages,
    pub error: Option<&'static str>,
    pub redirect: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
///
/// Already-authenticated customers are sent straight to their target.
#[instrument(skip(session))]
pub async fn login_page(
    Path(locale): Path<Locale>,
    Query(query): Query<LoginQuery>,
    session: Session,
) -> Response {
    let redirect = sanitize_redirect(query.redirect.as_deref());

    let logged_in = session_keys::CURRENT_USER
        .load(&session)
        .await
        .ok()
        .flatten()
        .is_some();
    if logged_in {
        return Redirect::to(&format!("/{locale}{redirect}")).into_response();
    }

    let t = Messages::for_locale(locale);
    LoginTemplate {
        locale,
        t,
        error: query.error.as_deref().map(|code| error_message(code, t)),
        redirect: redirect.to_string(),
    }
    .into_response()
}

/// Handle login form submission.
///
/// The backend must return both a token and a user id; anything less is a
/// failed login.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    Path(locale): Path<Locale>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let redirect = sanitize_redirect(form.redirect.as_deref()).to_string();

    match state
        .commerce()
        .login(&form.email, &form.password, locale)
        .await
    {
        Ok(auth) => {
            let user = CurrentUser {
                user_id: auth.user_id,
                token: auth.token,
            };
            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to(&format!("/{locale}/login?error=session")).into_response();
            }

            Redirect::to(&format!("/{locale}{redirect}")).into_response()
        }
        Err(CommerceError::Http(e)) => {
            tracing::warn!("Login request failed: {e}");
            login_error_redirect(locale, "network", &redirect)
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            login_error_redirect(locale, "credentials", &redirect)
        }
    }
}

fn login_error_redirect(locale: Locale, code: &str, redirect: &str) -> Response {
    let target = format!(
        "/{locale}/login?error={code}&redirect={}",
        urlencoding::encode(redirect)
    );
    Redirect::to(&target).into_response()
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(Path(locale): Path<Locale>, session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    Redirect::to(&format!("/{locale}")).into_response()
}
