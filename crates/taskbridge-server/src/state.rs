//! Shared handler state

use taskbridge_mongodb::TaskBridge;

#[derive(Clone)]
pub struct AppState {
    pub bridge: TaskBridge,
}
