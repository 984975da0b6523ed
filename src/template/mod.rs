pub mod fetch;
pub mod scratch;

pub use fetch::{extract_archive, fetch_template};
pub use scratch::{ScratchDir, PACKAGE_DIR};
