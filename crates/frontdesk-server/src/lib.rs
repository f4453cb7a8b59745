//! HTTP surface for the frontdesk relay.
//!
//! Exposes the chat endpoint plus session, FAQ, and health routes over
//! axum. [`AppState`] carries the assembled components; [`build_router`]
//! wires them to the paths the widget calls.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
