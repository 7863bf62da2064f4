//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{
    admin,
    error::ApiResult,
    middleware::{AuthUser, MaybeAuthUser, auth_middleware},
    models::{
        ApiResponse,
        admin::{RoleUpdateRequest, StatusUpdateRequest, UserListQuery},
        card::{CursorQuery, ViewRequest, ViewResponse},
        profile::ProfilePatch,
    },
    navigation, profile,
    state::AppState,
    verification,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id/status", post(update_user_status))
        .route("/admin/users/:id/role", post(upgrade_user_role))
        .route("/me", get(get_me).patch(update_me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/users/next", get(next_user))
        .route("/users/previous", get(previous_user))
        .route("/users/by-url/:url_id", get(user_by_url_id))
        .route("/users/:id/views", post(record_view))
        .route("/admins/:admin_id", get(admin_profile))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Card after the given cursor, or the landing card
pub async fn next_user(
    State(state): State<AppState>,
    Query(query): Query<CursorQuery>,
) -> ApiResult<impl IntoResponse> {
    let card = navigation::get_next_user(state.store.as_ref(), query.current_user_id).await?;
    Ok(Json(ApiResponse::ok(card)))
}

pub async fn previous_user(
    State(state): State<AppState>,
    Query(query): Query<CursorQuery>,
) -> ApiResult<impl IntoResponse> {
    let card = navigation::get_previous_user(state.store.as_ref(), query.current_user_id).await?;
    Ok(Json(ApiResponse::ok(card)))
}

pub async fn user_by_url_id(
    State(state): State<AppState>,
    Path(url_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let data = navigation::get_user_by_url_id(state.store.as_ref(), url_id).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// Count a card view. The body is optional.
pub async fn record_view(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<ViewRequest>>,
) -> ApiResult<impl IntoResponse> {
    let request = payload.map(|Json(p)| p).unwrap_or_default();

    let outcome = navigation::increment_view_count(
        state.store.as_ref(),
        state.view_ledger.as_ref(),
        id,
        request.session_id.as_deref(),
        caller.is_some(),
    )
    .await?;

    Ok(Json(ViewResponse {
        success: true,
        outcome,
    }))
}

pub async fn admin_profile(
    State(state): State<AppState>,
    Path(admin_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let profile = admin::get_admin_profile(state.store.as_ref(), admin_id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<impl IntoResponse> {
    let list = admin::list_users(state.store.as_ref(), user.id, query).await?;
    Ok(Json(ApiResponse::ok(list)))
}

pub async fn update_user_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    let update = verification::update_status(
        state.store.as_ref(),
        user.id,
        id,
        payload.action,
        payload.remarks,
    )
    .await?;
    Ok(Json(ApiResponse::ok(update)))
}

pub async fn upgrade_user_role(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    let update = verification::upgrade_role(
        state.store.as_ref(),
        user.id,
        id,
        payload.new_role,
        payload.remarks,
    )
    .await?;
    Ok(Json(ApiResponse::ok(update)))
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let profile = profile::get_own_profile(state.store.as_ref(), user.id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<impl IntoResponse> {
    let profile = profile::update_own_profile(state.store.as_ref(), user.id, patch).await?;
    Ok(Json(ApiResponse::ok(profile)))
}
