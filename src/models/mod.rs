//! Models Module
//!
//! Domain model of exam activity plus the request/response DTOs of the HTTP API.

mod activity;
mod requests;
mod responses;

pub use activity::*;
pub use requests::*;
pub use responses::*;
