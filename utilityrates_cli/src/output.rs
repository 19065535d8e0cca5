//! JSON output files: one per state plus the national rollup.
//!
//! Each file is serialized fully before a single write call, so an
//! interrupted run leaves no partial state file behind.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use utilityrates_lib::aggregate::{to_pretty_json, NationalSummary, StateSummary};

/// Writes one state's summary to `<out_dir>/states/<ST>.json`.
pub fn write_state_file(out_dir: &Path, summary: &StateSummary) -> Result<PathBuf> {
    let states_dir = out_dir.join("states");
    fs::create_dir_all(&states_dir)
        .with_context(|| format!("creating {}", states_dir.display()))?;
    let path = states_dir.join(format!("{}.json", summary.state));
    let json = to_pretty_json(summary)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Writes the national rollup to `<out_dir>/national_utility_rates.json`.
pub fn write_national_file(out_dir: &Path, national: &NationalSummary) -> Result<PathBuf> {
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let path = out_dir.join("national_utility_rates.json");
    let json = to_pretty_json(national)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
