mod auth;
pub use auth::extract_context_fn;
