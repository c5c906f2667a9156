pub mod api;
pub mod controller;
pub mod format;
mod client_constants;
