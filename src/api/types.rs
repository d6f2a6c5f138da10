//! Shared types for the API layer.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::enums::UserRole;
use crate::state::AppState;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
}

impl ApiContext {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

/// Authenticated principal, injected into request extensions by the auth
/// middleware after a successful bearer-token lookup.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthContext {
    /// Ownership guard passed to patient-scoped operations: admins act on any
    /// record, patients only on their own.
    pub fn patient_scope(&self) -> Option<String> {
        match self.role {
            UserRole::Patient => Some(self.user_id.to_string()),
            _ => None,
        }
    }
}
