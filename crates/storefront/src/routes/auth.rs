//! Authentication route handlers.
//!
//! Handles login, signup, and logout against the backend's auth endpoint.
//! Credentials are forwarded as-is; only the issued session is kept, in the
//! server-side session store.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use unison_core::Email;

use crate::backend::{AuthError, AuthSession};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
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
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Store the issued auth session and tag Sentry events with the user.
async fn establish_session(session: &Session, auth: AuthSession) -> Result<(), Response> {
    let current = CurrentUser {
        id: auth.user.id,
        email: auth.user.email,
        access_token: auth.access_token,
    };

    if let Err(e) = set_current_user(session, &current).await {
        tracing::error!("Failed to set session: {e}");
        return Err(Redirect::to("/auth/login?error=session").into_response());
    }

    set_sentry_user(&current.id, current.email.as_deref());
    Ok(())
}

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth().sign_in(&form.email, &form.password).await {
        Ok(auth) => match establish_session(&session, auth).await {
            Ok(()) => Redirect::to("/").into_response(),
            Err(response) => response,
        },
        Err(AuthError::InvalidCredentials) => {
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            Redirect::to("/auth/login?error=failed").into_response()
        }
    }
}

/// Display the signup page.
pub async fn signup_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    SignupTemplate { error: query.error }
}

/// Handle signup form submission.
///
/// New accounts are signed in immediately using the session returned by the
/// backend.
#[instrument(skip(state, session, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/auth/signup?error=password_mismatch").into_response();
    }

    let Ok(email) = Email::parse(&form.email) else {
        return Redirect::to("/auth/signup?error=invalid_email").into_response();
    };

    match state.auth().sign_up(email.as_str(), &form.password).await {
        Ok(auth) => match establish_session(&session, auth).await {
            Ok(()) => Redirect::to("/").into_response(),
            Err(response) => response,
        },
        Err(AuthError::UserAlreadyExists) => {
            Redirect::to("/auth/signup?error=email_taken").into_response()
        }
        Err(AuthError::WeakPassword(_)) => {
            Redirect::to("/auth/signup?error=weak_password").into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to("/auth/signup?error=invalid_email").into_response()
        }
        Err(e) => {
            tracing::warn!("Signup failed: {e}");
            Redirect::to("/auth/signup?error=failed").into_response()
        }
    }
}

/// Handle logout.
///
/// Revokes the backend session (best effort) and clears the local one.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(user)) = session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        if let Err(e) = state.auth().sign_out(&user.access_token).await {
            tracing::warn!("Failed to revoke backend session: {e}");
        }
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    clear_sentry_user();
    Redirect::to("/").into_response()
}
