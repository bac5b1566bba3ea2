use crate::store::RoutineStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<RoutineStore>>,
}

impl AppState {
    pub fn new(store: RoutineStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}
