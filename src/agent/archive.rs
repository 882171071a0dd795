//! Transcript archive - writes finished episodes to disk as JSON

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use super::agent_loop::EpisodeReport;
use crate::error::Result;

/// Write `report` to `<dir>/<timestamp>-<episode id>.json` and return the path
pub fn save_transcript(dir: &Path, report: &EpisodeReport) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let stamp = report.finished_at.format("%Y%m%dT%H%M%S%.3fZ");
    let episode = report.episode_id.as_deref().unwrap_or("no-episode");
    let path = dir.join(format!("{}-{}.json", stamp, episode));

    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    info!("Saved transcript to {}", path.display());
    Ok(path)
}
