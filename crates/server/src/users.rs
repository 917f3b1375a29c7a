//! Registration, login and session endpoints. These are the only routes
//! reachable without a credential.

use api_types::user::{AuthResponse, LoginUser, RegisterUser, SessionResponse, UserView};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use engine::{EngineError, Registration};

use crate::{
    ServerError,
    server::{AUTH_COOKIE, BearerHeader, ServerState, credential},
};

fn auth_cookie(token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Strict)
        .build()
}

fn auth_response(message: &str, registration: Registration) -> (Cookie<'static>, AuthResponse) {
    let Registration { user, token } = registration;
    let body = AuthResponse {
        message: message.to_string(),
        user: UserView {
            id: user.id,
            name: user.name,
            email: user.email,
        },
        token: token.clone(),
    };
    (auth_cookie(token), body)
}

pub async fn register(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(payload): Json<RegisterUser>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ServerError> {
    let registration = state
        .engine
        .register(&payload.name, &payload.email, &payload.password)
        .await?;
    let (cookie, body) = auth_response("User registered successfully", registration);
    Ok((StatusCode::CREATED, jar.add(cookie), Json(body)))
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(payload): Json<LoginUser>,
) -> Result<(CookieJar, Json<AuthResponse>), ServerError> {
    let registration = state.engine.login(&payload.email, &payload.password).await?;
    let (cookie, body) = auth_response("User logged in successfully", registration);
    Ok((jar.add(cookie), Json(body)))
}

pub async fn session(
    State(state): State<ServerState>,
    bearer: BearerHeader,
    jar: CookieJar,
) -> Result<Json<SessionResponse>, ServerError> {
    let token = credential(bearer.as_ref().ok(), &jar)
        .ok_or_else(|| EngineError::Unauthorized("no credential found".to_string()))?;
    let session = state.engine.session(&token)?;
    Ok(Json(SessionResponse {
        message: "Session active".to_string(),
        user_id: session.user_id,
        expires_at: session.expires_at.timestamp(),
    }))
}
