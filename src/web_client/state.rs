//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::controller::Controller;

/// Everything the handlers share. The mutex is the single writer: each
/// request holds it across load, mutate and save.
pub struct AppState {
    pub controller: Controller,
}

pub type SharedState = Arc<Mutex<AppState>>;

pub fn shared(controller: Controller) -> SharedState {
    Arc::new(Mutex::new(AppState { controller }))
}
