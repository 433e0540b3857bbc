//! Bulk spreadsheet import and export endpoints

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::Serialize;

use rolodex_core::{read_rows, screen_rows, write_contacts, write_error_report, RowError};

use crate::db::ContactRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Name of the multipart field carrying the uploaded sheet.
const FILE_FIELD: &str = "file";

/// Import report: row-level errors are data here, never a failure.
#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    /// Valid rows handed to the store.
    pub attempted: usize,
    /// Rows the store actually inserted; duplicates against existing
    /// data are skipped silently and do not count.
    pub inserted: u64,
    pub errors: Vec<RowError>,
    /// Companion sheet of the error rows, for correction and re-upload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_report_base64: Option<String>,
}

/// POST /customers/upload - bulk import from an uploaded sheet
async fn upload_contacts(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(format!("malformed multipart body: {err}")))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ApiError::BadRequest(format!("failed to read upload: {err}")))?;
            file_bytes = Some(bytes);
            break;
        }
    }

    let bytes = file_bytes.ok_or_else(|| ApiError::BadRequest("no file uploaded".to_string()))?;

    let batch = screen_rows(read_rows(&bytes));
    let attempted = batch.valid.len();

    // One statement for the whole valid set; a failure here aborts
    // the request, unlike the per-row errors above.
    let inserted = ContactRepo::new(&state.pool)
        .insert_ignore_conflicts(&batch.valid)
        .await?;

    tracing::info!(
        attempted,
        inserted,
        rejected = batch.errors.len(),
        "bulk import finished"
    );

    let error_report_base64 = if batch.errors.is_empty() {
        None
    } else {
        let report = write_error_report(&batch.errors)?;
        Some(BASE64_STANDARD.encode(report))
    };

    Ok(Json(UploadResponse {
        success: true,
        attempted,
        inserted,
        errors: batch.errors,
        error_report_base64,
    }))
}

/// GET /customers/export - download the full record set as a sheet
async fn export_contacts(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let rows = ContactRepo::new(&state.pool).export_rows().await?;

    // Empty set maps to 404 through SheetError::NoRecords.
    let bytes = write_contacts(&rows)?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"contacts.csv\"",
        ),
    ];

    Ok((headers, bytes).into_response())
}

/// Import/export routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customers/upload", post(upload_contacts))
        .route("/customers/export", get(export_contacts))
}
