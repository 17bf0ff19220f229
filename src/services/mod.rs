pub mod auth;
pub mod listings;

pub use auth::{AuthService, AuthSession};
pub use listings::{ListingFields, ListingService};
