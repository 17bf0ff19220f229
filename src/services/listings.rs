use sqlx::{Pool, Sqlite};

use crate::db::{Listing, ListingRepository, NewListing};
use crate::error::AppError;
use crate::uploads::ImageStore;

/// Client-supplied listing fields. Owner and image are never taken from here.
#[derive(Debug, Clone, Default)]
pub struct ListingFields {
    pub item_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
}

impl ListingFields {
    /// Trimmed item name, or a validation error when it is missing or blank.
    pub fn item_name(&self) -> Result<&str, AppError> {
        self.item_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::Validation("itemName is required".to_string()))
    }

    fn into_new_listing(self, image: Option<String>) -> Result<NewListing, AppError> {
        let item_name = self.item_name()?.to_string();
        Ok(NewListing {
            item_name,
            image,
            location: self.location.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        })
    }
}

#[derive(Clone)]
pub struct ListingService {
    db: Pool<Sqlite>,
    images: ImageStore,
}

impl ListingService {
    pub fn new(db: Pool<Sqlite>, images: ImageStore) -> Self {
        Self { db, images }
    }

    /// Every listing, newest first.
    pub async fn list(&self) -> Result<Vec<Listing>, AppError> {
        ListingRepository::list_recent(&self.db).await
    }

    pub async fn create(
        &self,
        owner_account_id: i64,
        fields: ListingFields,
        image: Option<String>,
    ) -> Result<Listing, AppError> {
        let new_listing = fields.into_new_listing(image)?;
        let listing = ListingRepository::create(&self.db, owner_account_id, new_listing).await?;

        tracing::info!(listing_id = listing.id, owner = owner_account_id, "listing created");
        Ok(listing)
    }

    pub async fn delete(&self, listing_id: i64, requesting_account_id: i64) -> Result<(), AppError> {
        let listing = ListingRepository::get_by_id(&self.db, listing_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if listing.owner_account_id != requesting_account_id {
            return Err(AppError::Forbidden(
                "You can only delete your own posts".to_string(),
            ));
        }

        if !ListingRepository::delete(&self.db, listing_id).await? {
            // Lost a race with another delete of the same row
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        // The row is gone; the file is only cleanup
        if let Some(filename) = listing.image.as_deref() {
            self.images.remove(filename).await;
        }

        tracing::info!(listing_id, owner = requesting_account_id, "listing deleted");
        Ok(())
    }
}
