//! Server state

use crate::deploy::coordinator::CoordinatorHandle;

/// Server state shared across handlers
pub struct ServerState {
    pub coordinator: CoordinatorHandle,
}

impl ServerState {
    pub fn new(coordinator: CoordinatorHandle) -> Self {
        Self { coordinator }
    }
}
