use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    models::{Role, User},
    response::{ApiResponse, Meta},
    routes::{health, users},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::add_role,
        users::remove_role,
    ),
    components(
        schemas(
            User,
            Role,
            UserList,
            CreateUserRequest,
            UpdateUserRequest,
            Meta,
            ApiResponse<User>,
            ApiResponse<UserList>,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "User management and role assignment endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
