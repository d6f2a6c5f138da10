//! Shared application state: the database handle and outbound clients,
//! constructed once at startup and passed into the router.
//!
//! Connections are opened per request rather than held globally, so request
//! handlers never contend on one shared handle and a poisoned connection
//! cannot outlive its request.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use thiserror::Error;

use crate::db::{self, DatabaseError};
use crate::payments::PaymentClient;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub struct AppState {
    db_path: PathBuf,
    pub payments: PaymentClient,
}

impl AppState {
    /// Open (and migrate) the database once, then keep only the path.
    pub fn new(db_path: PathBuf, payments: PaymentClient) -> Result<Arc<Self>, StateError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::ConstraintViolation(format!(
                        "cannot create data directory: {e}"
                    ))
                })?;
            }
        }
        let conn = db::open_database(&db_path)?;
        drop(conn);
        Ok(Arc::new(Self { db_path, payments }))
    }

    /// Open a fresh connection for one request.
    pub fn open_db(&self) -> Result<Connection, StateError> {
        Ok(db::open_database(&self.db_path)?)
    }
}
