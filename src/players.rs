use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn query(&self) -> String {
        format!(
            "startDate={}&endDate={}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD"))
}

/// Parses one `name - url` line. Blank lines and `#` comments yield `None`.
pub fn parse_player_line(line: &str, range: &DateRange) -> Option<Result<PlayerEntry, String>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let Some((name, url)) = line.rsplit_once(" - ") else {
        return Some(Err(format!("expected `name - url`, got {line:?}")));
    };
    let (name, url) = (name.trim(), url.trim());
    if name.is_empty() || url.is_empty() {
        return Some(Err(format!("empty name or url in {line:?}")));
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    Some(Ok(PlayerEntry {
        name: name.to_string(),
        url: format!("{url}{sep}{}", range.query()),
    }))
}

pub fn parse_player_list(raw: &str, range: &DateRange) -> (Vec<PlayerEntry>, Vec<String>) {
    let mut players = Vec::new();
    let mut errors = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        match parse_player_line(line, range) {
            Some(Ok(entry)) => players.push(entry),
            Some(Err(err)) => errors.push(format!("line {}: {err}", idx + 1)),
            None => {}
        }
    }
    (players, errors)
}

pub fn load_player_list(path: &Path, range: &DateRange) -> Result<Vec<PlayerEntry>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read player list {}", path.display()))?;
    let (players, errors) = parse_player_list(&raw, range);
    for err in &errors {
        warn!("{}: skipping {err}", path.display());
    }
    Ok(players)
}
