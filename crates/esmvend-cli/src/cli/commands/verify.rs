//! `esmvend verify`: check a vendored directory and print digests.

use anyhow::Result;
use esmvend_core::verify;
use std::path::Path;

/// Prints `<sha256>  <path>  <specifier>` per import map entry.
pub fn run_verify(dir: &Path, base: &str) -> Result<()> {
    let modules = verify::verify_output(dir, base)?;
    for m in &modules {
        println!("{}  {}  {}", m.sha256, m.path.display(), m.specifier);
    }
    println!("{} entr(ies) ok", modules.len());
    Ok(())
}
