use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub password_signature: String,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub item_name: String,
    /// Stored filename, or an absolute URL once the gateway has rewritten it
    pub image: Option<String>,
    pub location: String,
    pub phone: String,
    pub price: String,
    pub description: String,
    #[serde(rename = "userId")]
    pub owner_account_id: i64,
    /// Unix milliseconds
    pub created_at: i64,
}
