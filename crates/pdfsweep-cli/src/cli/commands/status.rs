//! `pdfsweep status` – show what is on disk without touching the network.

use anyhow::Result;
use pdfsweep_core::config::SweepConfig;
use pdfsweep_core::{manifest, resume};

use crate::cli::narrate;

pub fn run_status(cfg: &SweepConfig) -> Result<()> {
    println!("Output directory: {}", cfg.output_dir.display());
    println!("Node range:       {}..={}", cfg.start_node, cfg.end_node);
    if !cfg.output_dir.is_dir() {
        println!("Output directory does not exist yet; a run would start at node {}.", cfg.start_node);
        return Ok(());
    }

    let state = resume::scan_output_dir(&cfg.output_dir, &cfg.naming(), cfg.start_node)?;
    println!("Artifacts:        {}", state.recovered.len());
    println!("{}", narrate::resume_summary(&state, cfg.end_node));

    let manifest_path = cfg.manifest_path();
    if manifest_path.is_file() {
        let listed = manifest::read_manifest(&manifest_path)?;
        let missing: Vec<_> = listed.difference(&state.recovered).copied().collect();
        let unlisted = state.recovered.difference(&listed).count();
        println!("Manifest:         {} ({} IDs)", manifest_path.display(), listed.len());
        if !missing.is_empty() {
            println!("  listed but missing on disk: {}", narrate::id_list(&missing));
        }
        if unlisted > 0 {
            println!("  on disk but not listed: {} (written by the next run)", unlisted);
        }
    } else {
        println!("Manifest:         none");
    }
    Ok(())
}
