pub mod analyze_payload;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod key_request;
pub mod responses;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
