mod organizer;
mod types;
mod watcher;

pub use organizer::{artifact_file_name, finalize};
pub use types::{DownloadLayout, ProcessedSet, ResolvedDownload};
pub use watcher::{DEFAULT_PENDING_SUFFIXES, DownloadWatcher};
