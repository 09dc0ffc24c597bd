//! Authentication service routes

use axum::{
    Form, Json, Router,
    extract::State,
    response::{Html, IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::info;

use crate::{
    models::Credentials,
    state::AppState,
    templates::{render_index, render_login, render_register},
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Home page
pub async fn index(State(state): State<AppState>, jar: SignedCookieJar) -> impl IntoResponse {
    let cookies = state.session_cookies;
    let identity = cookies.identity(&jar);
    let (jar, flashes) = cookies.take_flashes(jar);

    (jar, Html(render_index(identity.as_ref(), &flashes)))
}

/// Registration form
pub async fn register_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> impl IntoResponse {
    let (jar, flashes) = state.session_cookies.take_flashes(jar);
    (jar, Html(render_register(&flashes)))
}

/// Registration submission
pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<Credentials>,
) -> impl IntoResponse {
    let cookies = state.session_cookies;

    match state
        .auth_service
        .register(&form.username, &form.password)
        .await
    {
        Ok(_) => {
            let jar = cookies.flash(jar, "Registration successful! Please login.");
            (jar, Redirect::to("/login"))
        }
        Err(e) => {
            let jar = cookies.flash(jar, e.user_message());
            (jar, Redirect::to("/register"))
        }
    }
}

/// Login form
pub async fn login_page(State(state): State<AppState>, jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flashes) = state.session_cookies.take_flashes(jar);
    (jar, Html(render_login(&flashes)))
}

/// Login submission
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<Credentials>,
) -> impl IntoResponse {
    let cookies = state.session_cookies;

    match state.auth_service.login(&form.username, &form.password).await {
        Ok(identity) => {
            let jar = cookies.establish(jar, &identity);
            let jar = cookies.flash(jar, "Login successful!");
            (jar, Redirect::to("/"))
        }
        Err(e) => {
            let jar = cookies.flash(jar, e.user_message());
            (jar, Redirect::to("/login"))
        }
    }
}

/// Logout, whether or not a session exists
pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> impl IntoResponse {
    let cookies = state.session_cookies;

    if let Some(identity) = cookies.identity(&jar) {
        info!("User {} logged out", identity.username);
    }

    let jar = cookies.clear(jar);
    let jar = cookies.flash(jar, "Logged out successfully");
    (jar, Redirect::to("/"))
}
