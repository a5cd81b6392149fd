//! REST API module
//!
//! Public form endpoints, the admin OTP login and the token-protected
//! submission listings.

pub mod admin;
pub mod handlers;
pub mod server;

pub use handlers::AppState;
pub use server::ApiServer;
