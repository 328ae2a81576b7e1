//! API Module
//!
//! HTTP handlers and routing for the user weather REST API.
//!
//! # Endpoints
//! - `GET /cards` - Current user cards with weather
//! - `POST /users/reload` - Load a new set of users
//! - `POST /refresh` - Refresh weather now
//! - `GET /refresh/status` - Auto-refresh state and countdown
//! - `PUT /refresh/interval` - Change the auto-refresh cadence
//! - `POST /refresh/start`, `POST /refresh/stop` - Toggle auto-refresh
//! - `DELETE /cache` - Clear cached data
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
