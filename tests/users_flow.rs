use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Statement};
use user_management_api::{
    db::{create_orm_conn, run_migrations},
    dto::users::{CreateUserRequest, UpdateUserRequest},
    entity::{Roles, roles},
    error::AppError,
    routes::params::{SortOrder, UserListQuery},
    services::user_service,
    state::AppState,
};

// Integration flow: CRUD a user, attach and detach catalog roles, then check
// listing with filter, sort and pagination.
#[tokio::test]
async fn user_and_role_crud_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    // Create
    let created = user_service::create_user(
        &state,
        CreateUserRequest {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            age: 30,
        },
    )
    .await?;
    let ann = created.data.expect("created user");
    assert!(ann.id > 0);
    assert_eq!(ann.name, "Ann");
    assert_eq!(ann.age, 30);
    assert!(ann.roles.is_empty());

    // Invalid creations are rejected before touching the store.
    let err = user_service::create_user(
        &state,
        CreateUserRequest {
            name: "Bob".into(),
            email: "bob@x.com".into(),
            age: -1,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = user_service::create_user(
        &state,
        CreateUserRequest {
            name: String::new(),
            email: "bob@x.com".into(),
            age: 20,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Duplicate email is rejected.
    let err = user_service::create_user(
        &state,
        CreateUserRequest {
            name: "Ann Again".into(),
            email: "ann@x.com".into(),
            age: 31,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Attach catalog role 2 ("Admin").
    user_service::add_role(&state, ann.id, 2).await?;
    let fetched = user_service::get_user(&state, ann.id)
        .await?
        .data
        .expect("user with roles");
    let held: Vec<(i32, &str)> = fetched
        .roles
        .iter()
        .map(|r| (r.role_id, r.name.as_str()))
        .collect();
    assert_eq!(held, vec![(2, "Admin")]);

    // A second identical attach conflicts instead of succeeding.
    let err = user_service::add_role(&state, ann.id, 2).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Detaching a role the user does not hold conflicts.
    let err = user_service::remove_role(&state, ann.id, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Detach role 2: the row returns to the catalog instead of being deleted.
    user_service::remove_role(&state, ann.id, 2).await?;
    let fetched = user_service::get_user(&state, ann.id)
        .await?
        .data
        .expect("user after detach");
    assert!(fetched.roles.is_empty());
    let role2 = Roles::find_by_id(2)
        .one(&state.orm)
        .await?
        .expect("catalog role 2");
    assert_eq!(role2.user_id, None);

    // Unknown ids resolve to NotFound on every operation.
    let err = user_service::get_user(&state, 9999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = user_service::delete_user(&state, 9999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = user_service::add_role(&state, 9999, 1).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = user_service::add_role(&state, ann.id, 9999)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = user_service::remove_role(&state, ann.id, 9999)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Update overwrites all mutable fields.
    user_service::update_user(
        &state,
        ann.id,
        UpdateUserRequest {
            name: "Ann Smith".into(),
            email: "ann@x.com".into(),
            age: 31,
        },
    )
    .await?;
    let updated = user_service::get_user(&state, ann.id)
        .await?
        .data
        .expect("updated user");
    assert_eq!(updated.name, "Ann Smith");
    assert_eq!(updated.age, 31);

    let err = user_service::update_user(
        &state,
        ann.id,
        UpdateUserRequest {
            name: "Ann Smith".into(),
            email: "ann@x.com".into(),
            age: -3,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Deleting the user removes every role row it holds.
    user_service::add_role(&state, ann.id, 1).await?;
    user_service::add_role(&state, ann.id, 3).await?;
    user_service::delete_user(&state, ann.id).await?;

    let orphaned = Roles::find()
        .filter(roles::Column::UserId.eq(ann.id))
        .count(&state.orm)
        .await?;
    assert_eq!(orphaned, 0);
    assert!(Roles::find_by_id(1).one(&state.orm).await?.is_none());
    assert!(Roles::find_by_id(3).one(&state.orm).await?.is_none());
    let err = user_service::get_user(&state, ann.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Listing: three fresh users.
    for (name, email, age) in [
        ("Ann", "ann@x.com", 30),
        ("Bob", "bob@x.com", 25),
        ("Carol", "carol@x.com", 41),
    ] {
        user_service::create_user(
            &state,
            CreateUserRequest {
                name: name.into(),
                email: email.into(),
                age,
            },
        )
        .await?;
    }

    let listed = user_service::list_users(&state, UserListQuery::default()).await?;
    let meta = listed.meta.expect("list meta");
    assert_eq!(meta.total, Some(3));
    let names: Vec<String> = listed
        .data
        .expect("listed users")
        .items
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Ann", "Bob", "Carol"]);

    // Name descending, two per page.
    let listed = user_service::list_users(
        &state,
        UserListQuery {
            page_size: Some(2),
            sort_field: Some("Name".into()),
            sort_order: Some(SortOrder::Descending),
            ..Default::default()
        },
    )
    .await?;
    let names: Vec<String> = listed
        .data
        .expect("page one")
        .items
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Carol", "Bob"]);

    let listed = user_service::list_users(
        &state,
        UserListQuery {
            page: Some(2),
            page_size: Some(2),
            sort_field: Some("Name".into()),
            sort_order: Some(SortOrder::Descending),
            ..Default::default()
        },
    )
    .await?;
    let names: Vec<String> = listed
        .data
        .expect("page two")
        .items
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Ann"]);

    // The substring filter matches name or email and is case sensitive.
    let listed = user_service::list_users(
        &state,
        UserListQuery {
            filter: Some("ann".into()),
            ..Default::default()
        },
    )
    .await?;
    let items = listed.data.expect("filtered users").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].email, "ann@x.com");

    let listed = user_service::list_users(
        &state,
        UserListQuery {
            filter: Some("ANN".into()),
            ..Default::default()
        },
    )
    .await?;
    assert!(listed.data.expect("no match").items.is_empty());

    // Unknown sort fields are rejected with a typed error.
    let err = user_service::list_users(
        &state,
        UserListQuery {
            sort_field: Some("PasswordHash".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidSortField(_)));

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs, then re-run migrations to restore the
    // catalog role seed rows.
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE roles, users RESTART IDENTITY CASCADE",
    ))
    .await?;
    run_migrations(&orm).await?;

    Ok(Some(AppState { orm }))
}
