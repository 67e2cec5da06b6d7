//! CLI command handlers, one per file.

mod completions;
pub(super) mod vendor;
mod verify;

pub use completions::run_completions;
pub use vendor::run_vendor;
pub use verify::run_verify;
