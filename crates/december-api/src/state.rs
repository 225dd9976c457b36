use std::sync::Arc;

use december_db::Store;
use december_filter::Validator;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Store,
    pub validator: Validator,
}

impl AppStateInner {
    pub fn new(store: Store, validator: Validator) -> AppState {
        Arc::new(Self { store, validator })
    }
}
