//! Project path functions - single source of truth for data file locations.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! This allows keeping several decks side by side:
//! ```bash
//! DATA_DIR=data/hsk1 cargo run
//! DATA_DIR=data/travel cargo run
//! ```

use std::path::{Path, PathBuf};

/// Base data directory when neither config.toml nor DATA_DIR set one
pub const DEFAULT_DATA_DIR: &str = "data";

/// Card collection file name
pub const CARDS_FILE: &str = "flashcards.json";

/// Progress aggregate file name
pub const PROGRESS_FILE: &str = "stats.json";

/// Card collection path inside a data directory
pub fn cards_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CARDS_FILE)
}

/// Progress path inside a data directory
pub fn progress_path(data_dir: &Path) -> PathBuf {
    data_dir.join(PROGRESS_FILE)
}
