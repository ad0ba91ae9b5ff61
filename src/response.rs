use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, page_size: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            page_size: None,
            total: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}
