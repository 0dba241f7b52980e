use std::sync::Arc;
use std::time::Duration;

use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub upload_delay: Duration,
}
