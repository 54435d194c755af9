//! Request handling layer
//!
//! Dispatches incoming requests to the serving core.

mod router;

pub use router::{handle_request, AppState};
