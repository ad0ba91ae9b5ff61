use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use validator::Validate;

use crate::{
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    entity::roles::{self, Entity as Roles},
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    models::{Role, User},
    response::{ApiResponse, Meta},
    routes::params::{SortOrder, UserListQuery, UserSortBy},
    state::AppState,
};

pub async fn list_users(
    state: &AppState,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    let (page, page_size, offset) = query.normalize();
    let (sort_by, sort_order) = query.sort()?;

    let mut condition = Condition::all();
    if let Some(filter) = query.filter.as_ref().filter(|s| !s.is_empty()) {
        // Case-sensitive substring match against name or email.
        let pattern = format!("%{}%", filter);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).like(pattern.clone()))
                .add(Expr::col(Column::Email).like(pattern)),
        );
    }

    let sort_col = match sort_by {
        UserSortBy::Id => Column::Id,
        UserSortBy::Name => Column::Name,
        UserSortBy::Email => Column::Email,
        UserSortBy::Age => Column::Age,
        UserSortBy::CreatedAt => Column::CreatedAt,
    };

    let mut finder = Users::find().filter(condition);
    finder = match sort_order {
        SortOrder::Ascending => finder.order_by_asc(sort_col),
        SortOrder::Descending => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(page_size as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|user| user_from_entity(user, Vec::new()))
        .collect();

    let meta = Meta::new(page, page_size, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn get_user(state: &AppState, id: i32) -> AppResult<ApiResponse<User>> {
    let user = Users::find_by_id(id).one(&state.orm).await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound("user")),
    };

    let user_roles = user
        .find_related(Roles)
        .order_by_asc(roles::Column::RoleId)
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "User",
        user_from_entity(user, user_roles),
        None,
    ))
}

pub async fn create_user(
    state: &AppState,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;
    ensure_age_non_negative(payload.age)?;
    ensure_email_free(&state.orm, &payload.email, None).await?;

    let active = ActiveModel {
        id: NotSet,
        name: Set(payload.name),
        email: Set(payload.email),
        age: Set(payload.age),
        created_at: NotSet,
    };
    let user = active.insert(&state.orm).await?;

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(user, Vec::new()),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    id: i32,
    payload: UpdateUserRequest,
) -> AppResult<()> {
    payload.validate()?;
    ensure_age_non_negative(payload.age)?;

    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound("user")),
    };

    ensure_email_free(&state.orm, &payload.email, Some(id)).await?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.email = Set(payload.email);
    active.age = Set(payload.age);
    active.update(&state.orm).await?;

    Ok(())
}

pub async fn delete_user(state: &AppState, id: i32) -> AppResult<()> {
    let txn = state.orm.begin().await?;

    let user = Users::find_by_id(id).one(&txn).await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound("user")),
    };

    // Attached role rows go with the user; the FK cascade is the backstop.
    Roles::delete_many()
        .filter(roles::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    user.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

pub async fn add_role(
    state: &AppState,
    user_id: i32,
    role_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    if Users::find_by_id(user_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound("user"));
    }

    // Concurrent attaches of the same role serialize on this row lock;
    // the loser observes the new owner and conflicts.
    let role = Roles::find_by_id(role_id)
        .lock_exclusive()
        .one(&txn)
        .await?;
    let role = match role {
        Some(r) => r,
        None => return Err(AppError::NotFound("role")),
    };

    if role.user_id == Some(user_id) {
        return Err(AppError::Conflict("user already has this role".to_string()));
    }

    let mut active: roles::ActiveModel = role.into();
    active.user_id = Set(Some(user_id));
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(ApiResponse::success(
        "Role assigned to user",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn remove_role(
    state: &AppState,
    user_id: i32,
    role_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    if Users::find_by_id(user_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound("user"));
    }

    let role = Roles::find_by_id(role_id)
        .lock_exclusive()
        .one(&txn)
        .await?;
    let role = match role {
        Some(r) => r,
        None => return Err(AppError::NotFound("role")),
    };

    if role.user_id != Some(user_id) {
        return Err(AppError::Conflict(
            "user does not have this role".to_string(),
        ));
    }

    let mut active: roles::ActiveModel = role.into();
    active.user_id = Set(None);
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(ApiResponse::success(
        "Role removed from user",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn ensure_age_non_negative(age: i32) -> AppResult<()> {
    // Re-checked here in addition to the derive attribute on the DTO.
    if age < 0 {
        return Err(AppError::BadRequest(
            "age must not be negative".to_string(),
        ));
    }
    Ok(())
}

async fn ensure_email_free<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    exclude_id: Option<i32>,
) -> AppResult<()> {
    let mut finder = Users::find().filter(Column::Email.eq(email));
    if let Some(id) = exclude_id {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.count(conn).await? > 0 {
        return Err(AppError::Conflict(format!(
            "email {email:?} is already in use"
        )));
    }
    Ok(())
}

fn user_from_entity(model: UserModel, user_roles: Vec<roles::Model>) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        age: model.age,
        roles: user_roles.into_iter().map(role_from_entity).collect(),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn role_from_entity(model: roles::Model) -> Role {
    Role {
        role_id: model.role_id,
        name: model.name,
    }
}
