use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    error::AppResult,
    models::User,
    response::ApiResponse,
    routes::params::UserListQuery,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_users))
        .route("/", axum::routing::post(create_user))
        .route("/{id}", axum::routing::get(get_user))
        .route("/{id}", axum::routing::put(update_user))
        .route("/{id}", axum::routing::delete(delete_user))
        .route("/{user_id}/roles/{role_id}", axum::routing::post(add_role))
        .route(
            "/{user_id}/roles/{role_id}",
            axum::routing::delete(remove_role),
        )
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("pageSize" = Option<i64>, Query, description = "Items per page, default 10"),
        ("sortField" = Option<String>, Query, description = "Sort field: Id, Name, Email, Age, CreatedAt"),
        ("sortOrder" = Option<String>, Query, description = "Sort order: ascending, descending"),
        ("filter" = Option<String>, Query, description = "Substring match on name or email"),
    ),
    responses(
        (status = 200, description = "List users", body = ApiResponse<UserList>),
        (status = 400, description = "Unknown sort field"),
    ),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    Ok(Json(user_service::list_users(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Get user with roles", body = ApiResponse<User>),
        (status = 404, description = "User not found"),
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(user_service::get_user(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body(content = CreateUserRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Create user", body = ApiResponse<User>),
        (status = 400, description = "Validation failed"),
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Form(payload): Form<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let response = user_service::create_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body(content = UpdateUserRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 204, description = "Updated user"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "User not found"),
    ),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(payload): Form<UpdateUserRequest>,
) -> AppResult<StatusCode> {
    user_service::update_user(&state, id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "Deleted user and its attached roles"),
        (status = 404, description = "User not found"),
    ),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    user_service::delete_user(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/users/{user_id}/roles/{role_id}",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("role_id" = i32, Path, description = "Role ID"),
    ),
    responses(
        (status = 200, description = "Role assigned"),
        (status = 400, description = "User already has this role"),
        (status = 404, description = "User or role not found"),
    ),
    tag = "Users"
)]
pub async fn add_role(
    State(state): State<AppState>,
    Path((user_id, role_id)): Path<(i32, i32)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(user_service::add_role(&state, user_id, role_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/roles/{role_id}",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("role_id" = i32, Path, description = "Role ID"),
    ),
    responses(
        (status = 200, description = "Role removed"),
        (status = 400, description = "User does not have this role"),
        (status = 404, description = "User or role not found"),
    ),
    tag = "Users"
)]
pub async fn remove_role(
    State(state): State<AppState>,
    Path((user_id, role_id)): Path<(i32, i32)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        user_service::remove_role(&state, user_id, role_id).await?,
    ))
}
