use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;

use crate::records::{Competition, MatchRecord};

pub const LOGS_DIR: &str = "logs";

/// Preview lengths for the summary file.
const SUMMARY_PREVIEW: usize = 5;

pub fn ensure_logs_dir() -> Result<()> {
    fs::create_dir_all(LOGS_DIR).context("create logs dir")
}

pub fn run_timestamp() -> String {
    Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}

/// Per-competition dump paths: `logs/flashscore_{slug}_{season}_{ts}.jsonl`
/// and the matching `_summary.txt`. The season's `/` becomes `-` in file
/// names.
pub fn make_log_paths(competition_slug: &str, season_name: &str) -> Result<(PathBuf, PathBuf)> {
    ensure_logs_dir()?;
    let safe_season = season_name.replace('/', "-");
    let base = format!(
        "flashscore_{competition_slug}_{safe_season}_{}",
        run_timestamp()
    );
    let jsonl = PathBuf::from(LOGS_DIR).join(format!("{base}.jsonl"));
    let summary = PathBuf::from(LOGS_DIR).join(format!("{base}_summary.txt"));
    Ok((jsonl, summary))
}

/// One JSON object per line, results before fixtures.
pub fn write_jsonl<'a, I>(path: &Path, records: I) -> Result<()>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record).context("serialize match record")?);
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("write jsonl {}", path.display()))
}

pub fn write_summary(
    path: &Path,
    comp: &Competition,
    season_name: &str,
    results: &[MatchRecord],
    fixtures: &[MatchRecord],
    upsert_ok: usize,
    upsert_fail: usize,
) -> Result<()> {
    let mut lines = Vec::new();
    lines.push(format!("competition: {} ({})", comp.name, comp.slug));
    lines.push(format!("season: {season_name}"));
    lines.push(format!("results: {}", results.len()));
    lines.push(format!("fixtures: {}", fixtures.len()));
    lines.push(format!("upsert_ok: {upsert_ok}"));
    lines.push(format!("upsert_fail: {upsert_fail}"));
    lines.push(String::new());

    lines.push("results_preview:".to_string());
    for record in results.iter().take(SUMMARY_PREVIEW) {
        lines.push(format!("{record:?}"));
    }
    lines.push(String::new());

    lines.push("fixtures_preview:".to_string());
    for record in fixtures.iter().take(SUMMARY_PREVIEW) {
        lines.push(format!("{record:?}"));
    }

    fs::write(path, lines.join("\n"))
        .with_context(|| format!("write summary {}", path.display()))
}

/// Read a JSONL dump back as generic values. Blank lines are skipped; an
/// unparseable line is an error.
pub fn read_jsonl(path: &Path) -> Result<Vec<Value>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read jsonl {}", path.display()))?;
    let mut rows = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = serde_json::from_str(line)
            .with_context(|| format!("invalid jsonl line in {}", path.display()))?;
        rows.push(value);
    }
    Ok(rows)
}

pub fn write_json_array(path: &Path, rows: &[Value]) -> Result<()> {
    let json = serde_json::to_string_pretty(rows).context("serialize json array")?;
    fs::write(path, json).with_context(|| format!("write json {}", path.display()))
}
