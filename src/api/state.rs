use std::sync::Arc;

use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::realtime::Broadcaster;
use crate::services::{AuthService, ListingService};
use crate::uploads::ImageStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub listings: ListingService,
    pub images: ImageStore,
    pub broadcaster: Arc<Broadcaster>,
}

impl AppState {
    pub fn new(db: Pool<Sqlite>, config: Arc<Config>, broadcaster: Arc<Broadcaster>) -> Self {
        let images = ImageStore::new(&config.upload_dir);
        Self {
            auth: AuthService::new(db.clone(), config.clone()),
            listings: ListingService::new(db.clone(), images.clone()),
            db,
            config,
            images,
            broadcaster,
        }
    }
}
