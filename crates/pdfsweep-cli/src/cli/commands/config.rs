//! `pdfsweep config` – show where the config lives and what is in effect.

use anyhow::Result;
use pdfsweep_core::config::SweepConfig;
use std::path::Path;

pub fn run_config(cfg: &SweepConfig, path: &Path) -> Result<()> {
    println!("# {}", path.display());
    print!("{}", cfg.to_toml_string()?);
    if let Err(e) = cfg.validate() {
        println!("# warning: {}", e);
    }
    Ok(())
}
