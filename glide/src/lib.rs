// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{load_hrefs_from_file, parse_target_url};

// Re-export session functionality from glide-core
pub use glide_core::{
    extract_url_path, generate_session_report, NavEventCallback, Session, SessionOptions,
};
