//! Contact CRUD and listing endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use rolodex_core::{parse_page, validate_row, QuerySpec, RawRow, SortOrder, PAGE_SIZE};

use crate::db::{Contact, ContactRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Create/update request body. Fields default to empty so shape
/// problems surface as field validation, not deserialize failures.
#[derive(Deserialize)]
pub struct ContactBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl ContactBody {
    fn into_row(self) -> RawRow {
        RawRow {
            name: self.name,
            email: self.email,
            phone: self.phone,
        }
    }
}

/// List query parameters, all optional. Page arrives as raw text so
/// garbage degrades to the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub keyword: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
}

impl ListParams {
    fn into_spec(self) -> QuerySpec {
        QuerySpec {
            keyword: self.keyword,
            sort: self.sort,
            order: SortOrder::parse(self.order.as_deref()),
            page: parse_page(self.page.as_deref()),
        }
    }
}

/// Paginated list envelope
#[derive(Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub data: Vec<Contact>,
}

#[derive(Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: Contact,
}

#[derive(Deserialize)]
pub struct BatchDeleteBody {
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Serialize)]
pub struct BatchDeleteResponse {
    pub success: bool,
    pub deleted_count: u64,
}

/// POST /customers - create one contact
async fn create_contact(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContactBody>,
) -> Result<(StatusCode, Json<ContactResponse>), ApiError> {
    let contact = validate_row(&body.into_row())?;

    let created = ContactRepo::new(&state.pool).create(&contact).await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            success: true,
            message: "contact created",
            data: created,
        }),
    ))
}

/// GET /customers - list with search/sort/pagination
async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let spec = params.into_spec();
    let (data, total) = ContactRepo::new(&state.pool).list(&spec).await?;

    Ok(Json(ListResponse {
        success: true,
        total,
        page: spec.page,
        limit: PAGE_SIZE,
        data,
    }))
}

/// PUT /customers/{id} - update one contact
async fn update_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<ContactBody>,
) -> Result<Json<ContactResponse>, ApiError> {
    let contact = validate_row(&body.into_row())?;

    let updated = ContactRepo::new(&state.pool).update(id, &contact).await?;

    Ok(Json(ContactResponse {
        success: true,
        message: "contact updated",
        data: updated,
    }))
}

/// DELETE /customers/{id} - delete one contact
async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ContactRepo::new(&state.pool).delete(id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "contact deleted",
    })))
}

/// DELETE /customers/batch-delete - delete a set of contacts
async fn batch_delete_contacts(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchDeleteBody>,
) -> Result<Json<BatchDeleteResponse>, ApiError> {
    if body.ids.is_empty() {
        return Err(ApiError::BadRequest("ids array is required".to_string()));
    }

    let deleted_count = ContactRepo::new(&state.pool)
        .delete_many(&body.ids)
        .await?;

    Ok(Json(BatchDeleteResponse {
        success: true,
        deleted_count,
    }))
}

/// Contact routes. The static batch-delete segment takes precedence
/// over the `{id}` capture.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customers", get(list_contacts).post(create_contact))
        .route("/customers/batch-delete", delete(batch_delete_contacts))
        .route(
            "/customers/{id}",
            put(update_contact).delete(delete_contact),
        )
}
