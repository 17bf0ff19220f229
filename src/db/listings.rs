use sqlx::{Pool, Sqlite};

use crate::db::models::Listing;
use crate::error::AppError;

/// Column values for a listing insert, already validated and defaulted.
#[derive(Debug, Clone, Default)]
pub struct NewListing {
    pub item_name: String,
    pub image: Option<String>,
    pub location: String,
    pub phone: String,
    pub price: String,
    pub description: String,
}

pub struct ListingRepository;

impl ListingRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        owner_account_id: i64,
        listing: NewListing,
    ) -> Result<Listing, AppError> {
        let created_at = chrono::Utc::now().timestamp_millis();

        let listing = sqlx::query_as::<_, Listing>(
            r#"
INSERT INTO listings (item_name, image, location, phone, price, description, owner_account_id, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&listing.item_name)
        .bind(&listing.image)
        .bind(&listing.location)
        .bind(&listing.phone)
        .bind(&listing.price)
        .bind(&listing.description)
        .bind(owner_account_id)
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(listing)
    }

    pub async fn get_by_id(
        pool: &Pool<Sqlite>,
        id: i64,
    ) -> Result<Option<Listing>, AppError> {
        let listing = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(listing)
    }

    /// All listings, newest first. Rows created in the same millisecond fall back to id order.
    pub async fn list_recent(pool: &Pool<Sqlite>) -> Result<Vec<Listing>, AppError> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
SELECT * FROM listings
ORDER BY created_at DESC, id DESC
            "#
        )
        .fetch_all(pool)
        .await?;

        Ok(listings)
    }

    /// Returns whether a row was removed.
    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
