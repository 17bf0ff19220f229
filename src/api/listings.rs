use axum::{
    extract::{
        multipart::MultipartRejection, rejection::PathRejection, Multipart, Path, State,
    },
    http::StatusCode,
    Extension, Json,
};

use crate::api::origin::RequestOrigin;
use crate::api::state::AppState;
use crate::db::{Account, Listing};
use crate::error::AppError;
use crate::services::ListingFields;
use crate::uploads::ImageUpload;

/// GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
    origin: RequestOrigin,
) -> Result<Json<Vec<Listing>>, AppError> {
    let listings = state
        .listings
        .list()
        .await?
        .into_iter()
        .map(|listing| origin.materialize(listing))
        .collect();

    Ok(Json(listings))
}

/// POST /api/posts (requires auth)
pub async fn create_post(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    origin: RequestOrigin,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Listing>), AppError> {
    let multipart =
        multipart.map_err(|e| AppError::Validation(format!("Expected multipart form: {}", e.body_text())))?;
    let (fields, upload) = read_listing_form(multipart).await?;

    // Reject bad fields before anything touches the disk
    fields.item_name()?;

    let image = match upload {
        Some(upload) => Some(state.images.accept(upload).await?),
        None => None,
    };

    let listing = state.listings.create(account.id, fields, image).await?;
    let listing = origin.materialize(listing);

    state.broadcaster.broadcast_created(listing.clone());

    Ok((StatusCode::CREATED, Json(listing)))
}

/// DELETE /api/posts/{id} (requires auth)
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Path(id) = id.map_err(|_| AppError::NotFound("Post not found".to_string()))?;

    state.listings.delete(id, account.id).await?;
    state.broadcaster.broadcast_deleted(id);

    Ok(Json(serde_json::json!({"ok": true})))
}

async fn read_listing_form(
    mut multipart: Multipart,
) -> Result<(ListingFields, Option<ImageUpload>), AppError> {
    let mut fields = ListingFields::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(form_error)?;

            // Browsers submit an empty part when no file was chosen
            if file_name.as_deref().is_some_and(|n| !n.is_empty()) || !data.is_empty() {
                upload = Some(ImageUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            continue;
        }

        let slot = match name.as_str() {
            "itemName" => &mut fields.item_name,
            "location" => &mut fields.location,
            "phone" => &mut fields.phone,
            "price" => &mut fields.price,
            "description" => &mut fields.description,
            _ => continue,
        };
        *slot = Some(field.text().await.map_err(form_error)?);
    }

    Ok((fields, upload))
}

fn form_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::InvalidFile("Upload exceeds the size limit".to_string())
    } else {
        AppError::Validation(format!("Invalid form data: {}", err.body_text()))
    }
}
