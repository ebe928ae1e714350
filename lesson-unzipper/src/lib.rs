pub mod handler;
pub mod load_config;
pub mod rollbar;
pub mod s3;

pub use handler::{run, AppState};
