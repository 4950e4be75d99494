pub mod app;
pub mod auth;
pub mod dates;
pub mod demo;
pub mod entries;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod overview;
pub mod state;
pub mod stats;
pub mod storage;

pub use app::router;
pub use state::AppState;
pub use storage::{load_data, resolve_data_path};
