use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    extract::CookieJar,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, analytics, budgets, transactions, users};
use engine::{Engine, EngineError};

/// Cookie carrying the credential for browser clients.
pub const AUTH_COOKIE: &str = "authToken";

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `Authorization` as extracted by handlers. A missing or non-bearer header
/// is kept as the rejection so the cookie can still be tried.
pub(crate) type BearerHeader = Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>;

/// Pick the presented credential. The bearer header wins over the cookie.
pub(crate) fn credential(
    bearer: Option<&TypedHeader<Authorization<Bearer>>>,
    jar: &CookieJar,
) -> Option<String> {
    bearer
        .map(|header| header.token().to_string())
        .or_else(|| jar.get(AUTH_COOKIE).map(|cookie| cookie.value().to_string()))
}

async fn auth(
    State(state): State<ServerState>,
    bearer: BearerHeader,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let resource = format!("{} {}", request.method(), request.uri().path());
    let token = credential(bearer.as_ref().ok(), &jar);
    let policy = state.engine.authorize(token.as_deref(), &resource);

    let allowed = policy.is_allowed();
    let identity = match policy.identity {
        Some(identity) if allowed => identity,
        _ => {
            tracing::debug!(principal = %policy.principal_id, %resource, "request denied");
            return Err(EngineError::Unauthorized("missing or invalid credential".to_string()).into());
        }
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Build the HTTP application around `engine`.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
    })
}

fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route(
            "/transactions",
            post(transactions::create)
                .get(transactions::list)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .route(
            "/budgets",
            post(budgets::create)
                .get(budgets::list)
                .patch(budgets::update)
                .delete(budgets::delete),
        )
        .route("/analytics", get(analytics::get))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/session", get(users::session))
        .merge(protected)
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
