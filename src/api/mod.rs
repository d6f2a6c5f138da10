pub mod auth;
pub mod endpoints;
pub mod error;
pub mod response;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve_forever, start_server, ApiServer};
