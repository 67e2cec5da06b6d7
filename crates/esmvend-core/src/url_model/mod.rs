//! URL modeling: canonical module URL to local relative path.
//!
//! The mapping mirrors `host/path` under the output directory, forces a
//! script extension, and never lets query strings or malformed input leak
//! into a filename. [`plan_layout`] settles collisions across a module set.

mod layout;
mod path;
mod sanitize;

pub use layout::plan_layout;
pub use path::{url_to_local_path, with_digest_suffix, INVALID_PREFIX, SCRIPT_EXTENSIONS};
pub use sanitize::sanitize_segment;
