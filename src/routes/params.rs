use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Allow-listed sort fields for the user listing. Wire names match the
/// column names exposed by the API (`sortField=Name`); anything else is
/// rejected with a typed error instead of hitting the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
pub enum UserSortBy {
    #[default]
    Id,
    Name,
    Email,
    Age,
    CreatedAt,
}

impl std::str::FromStr for UserSortBy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Id" => Ok(Self::Id),
            "Name" => Ok(Self::Name),
            "Email" => Ok(Self::Email),
            "Age" => Ok(Self::Age),
            "CreatedAt" => Ok(Self::CreatedAt),
            other => Err(AppError::InvalidSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub filter: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl UserListQuery {
    /// Clamp pagination to sane bounds: page >= 1, page size 1..=100.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * page_size;
        (page, page_size, offset)
    }

    pub fn sort(&self) -> Result<(UserSortBy, SortOrder), AppError> {
        let sort_by = match self.sort_field.as_deref() {
            Some(field) => field.parse()?,
            None => UserSortBy::default(),
        };
        Ok((sort_by, self.sort_order.unwrap_or_default()))
    }
}
