pub mod auth;
pub mod profile;
pub mod router;
pub mod server;

#[cfg(test)]
mod test_support;

pub use server::{build_app, build_server, AppState, ServerError};
