//! # HTTP Routes
//!
//! Thin axum handlers: extract, call the service, serialize.
//!
//! ## Route Table
//! ```text
//! GET  /                            banner
//! GET  /health                      storage health
//! POST /api/auth/signup             AuthService::signup
//! POST /api/auth/login              AuthService::login
//! POST /api/auth/change-password    AuthService::change_password
//! GET  /api/stores                  StoreService::list        (optional auth)
//! POST /api/stores/{id}/rate        StoreService::rate
//! GET  /api/admin/stats             AdminService::stats
//! POST /api/admin/users             AdminService::create_user
//! GET  /api/admin/users             AdminService::list_users
//! GET  /api/admin/users/{id}        AdminService::view_user
//! POST /api/admin/stores            AdminService::create_store
//! GET  /api/admin/stores            AdminService::list_stores
//! GET  /api/owner/dashboard         OwnerService::dashboard
//! ```
//!
//! Access decisions live in the services; routes only resolve the caller.

use axum::extract::{DefaultBodyLimit, FromRequest, FromRequestParts, Path, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::services::admin_service::{CreateStoreRequest, CreateUserRequest};
use crate::services::auth_service::{ChangePasswordRequest, LoginRequest, SignupRequest};
use crate::services::store_service::RateRequest;
use crate::services::ListParams;
use crate::SharedState;
use rateboard_core::Identity;

// =============================================================================
// Extractors
// =============================================================================

/// The resolved caller, if a bearer token was presented.
///
/// No `Authorization` header → `Caller(None)`. A header that is present
/// but malformed, expired, or names a deleted user is rejected with 401,
/// even on routes that allow anonymous access.
pub struct Caller(pub Option<Identity>);

impl Caller {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl FromRequestParts<SharedState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Caller(None));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Expected a bearer token"))?;

        let identity = state.auth().identify(token).await?;
        Ok(Caller(Some(identity)))
    }
}

/// `Json` with rejections reported as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// `Query` with rejections reported as [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

// =============================================================================
// Router
// =============================================================================

/// Builds the full application router.
pub fn build_router(state: SharedState) -> Router {
    let body_limit = state.config.max_body_bytes;
    let cors = cors_layer(&state.config.cors_origin);

    let auth = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/change-password", post(change_password));

    let admin = Router::new()
        .route("/stats", get(admin_stats))
        .route("/users", post(admin_create_user).get(admin_list_users))
        .route("/users/{id}", get(admin_view_user))
        .route("/stores", post(admin_create_store).get(admin_list_stores));

    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .nest("/api/auth", auth)
        .nest("/api/admin", admin)
        .route("/api/stores", get(list_stores))
        .route("/api/stores/{id}/rate", post(rate_store))
        .route("/api/owner/dashboard", get(owner_dashboard))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin).allow_credentials(true),
        Err(_) => {
            warn!(%origin, "Invalid CORS origin, cross-origin requests disabled");
            layer
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Serialize)]
struct Banner {
    ok: bool,
    service: &'static str,
    version: &'static str,
}

async fn banner() -> Json<Banner> {
    Json(Banner {
        ok: true,
        service: "rateboard-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "unavailable" })),
        )
    }
}

async fn signup(
    State(state): State<SharedState>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.auth().signup(&req).await?))
}

async fn login(
    State(state): State<SharedState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.auth().login(&req).await?))
}

async fn change_password(
    State(state): State<SharedState>,
    caller: Caller,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.auth().change_password(caller.identity(), &req).await?,
    ))
}

async fn list_stores(
    State(state): State<SharedState>,
    caller: Caller,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.stores().list(caller.identity(), &params).await?))
}

async fn rate_store(
    State(state): State<SharedState>,
    caller: Caller,
    Path(store_id): Path<String>,
    AppJson(req): AppJson<RateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state
            .stores()
            .rate(caller.identity(), &store_id, &req)
            .await?,
    ))
}

async fn admin_stats(
    State(state): State<SharedState>,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.admin().stats(caller.identity()).await?))
}

async fn admin_create_user(
    State(state): State<SharedState>,
    caller: Caller,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.admin().create_user(caller.identity(), &req).await?,
    ))
}

async fn admin_list_users(
    State(state): State<SharedState>,
    caller: Caller,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.admin().list_users(caller.identity(), &params).await?,
    ))
}

async fn admin_view_user(
    State(state): State<SharedState>,
    caller: Caller,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.admin().view_user(caller.identity(), &user_id).await?,
    ))
}

async fn admin_create_store(
    State(state): State<SharedState>,
    caller: Caller,
    AppJson(req): AppJson<CreateStoreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.admin().create_store(caller.identity(), &req).await?,
    ))
}

async fn admin_list_stores(
    State(state): State<SharedState>,
    caller: Caller,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.admin().list_stores(caller.identity(), &params).await?,
    ))
}

async fn owner_dashboard(
    State(state): State<SharedState>,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.owner().dashboard(caller.identity()).await?))
}
