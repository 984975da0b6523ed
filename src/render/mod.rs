pub mod file;
pub mod placeholder;
pub mod walker;

pub use file::{is_binary, resolve_alias, FILENAME_ALIASES};
pub use placeholder::substitute;
pub use walker::{
    destination_path, enumerate, instantiate, EntryKind, FileEntry, Instantiated, PAYLOAD_DIR,
};
