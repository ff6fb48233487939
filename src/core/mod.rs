// Public modules
pub mod defaults;
pub mod error;
pub mod local_files;
pub mod output;
pub mod paths;
pub mod permissions;
pub mod scaffold;
pub mod templates;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use output::{BatchSummary, ItemStatus};
