use user_management_api::dto::users::CreateUserRequest;
use user_management_api::error::AppError;
use user_management_api::routes::params::{SortOrder, UserListQuery, UserSortBy};
use validator::Validate;

#[test]
fn pagination_defaults_to_first_page_of_ten() {
    let query = UserListQuery::default();
    assert_eq!(query.normalize(), (1, 10, 0));
}

#[test]
fn pagination_clamps_zero_and_negative_input() {
    let query = UserListQuery {
        page: Some(0),
        page_size: Some(0),
        ..Default::default()
    };
    assert_eq!(query.normalize(), (1, 1, 0));

    let query = UserListQuery {
        page: Some(-5),
        page_size: Some(-20),
        ..Default::default()
    };
    assert_eq!(query.normalize(), (1, 1, 0));
}

#[test]
fn pagination_caps_page_size_and_computes_offset() {
    let query = UserListQuery {
        page: Some(3),
        page_size: Some(1000),
        ..Default::default()
    };
    assert_eq!(query.normalize(), (3, 100, 200));

    let query = UserListQuery {
        page: Some(2),
        page_size: Some(10),
        ..Default::default()
    };
    assert_eq!(query.normalize(), (2, 10, 10));
}

#[test]
fn sort_defaults_to_id_ascending() {
    let query = UserListQuery::default();
    assert_eq!(
        query.sort().unwrap(),
        (UserSortBy::Id, SortOrder::Ascending)
    );
}

#[test]
fn sort_field_accepts_allow_listed_names() {
    for (field, expected) in [
        ("Id", UserSortBy::Id),
        ("Name", UserSortBy::Name),
        ("Email", UserSortBy::Email),
        ("Age", UserSortBy::Age),
        ("CreatedAt", UserSortBy::CreatedAt),
    ] {
        let query = UserListQuery {
            sort_field: Some(field.to_string()),
            sort_order: Some(SortOrder::Descending),
            ..Default::default()
        };
        assert_eq!(query.sort().unwrap(), (expected, SortOrder::Descending));
    }
}

#[test]
fn sort_field_rejects_unknown_names() {
    for field in ["PasswordHash", "name", "id; DROP TABLE users"] {
        let query = UserListQuery {
            sort_field: Some(field.to_string()),
            ..Default::default()
        };
        match query.sort() {
            Err(AppError::InvalidSortField(rejected)) => assert_eq!(rejected, field),
            other => panic!("expected InvalidSortField for {field:?}, got {other:?}"),
        }
    }
}

#[test]
fn create_request_validation_rules() {
    let valid = CreateUserRequest {
        name: "Ann".to_string(),
        email: "ann@x.com".to_string(),
        age: 30,
    };
    assert!(valid.validate().is_ok());

    let empty_name = CreateUserRequest {
        name: String::new(),
        email: "ann@x.com".to_string(),
        age: 30,
    };
    assert!(empty_name.validate().is_err());

    let bad_email = CreateUserRequest {
        name: "Ann".to_string(),
        email: "not-an-email".to_string(),
        age: 30,
    };
    assert!(bad_email.validate().is_err());

    let negative_age = CreateUserRequest {
        name: "Ann".to_string(),
        email: "ann@x.com".to_string(),
        age: -1,
    };
    let errors = negative_age.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("age"));
}
