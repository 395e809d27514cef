use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use reqwest::blocking::Client;
use serde::Serialize;

use crate::features::ScrapedRecord;
use crate::http_client::http_client;
use crate::players::PlayerEntry;
use crate::stats_page::parse_stats_block;

/// Yields one record per player. `Ok(None)` means the player's stats are
/// unavailable (timeout, missing block); `Err` is any other failure.
pub trait RecordSource {
    fn fetch(&mut self, player: &PlayerEntry) -> Result<Option<ScrapedRecord>>;
}

pub struct HttpRecordSource {
    client: Client,
    debug_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PageDump<'a> {
    player: &'a str,
    url: &'a str,
    fetched_at: String,
    stats: BTreeMap<&'a str, &'a str>,
}

impl HttpRecordSource {
    pub fn new(timeout: Duration, debug_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = &debug_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("create debug directory {}", dir.display()))?;
        }
        Ok(Self {
            client: http_client(timeout)?,
            debug_dir,
        })
    }

    fn fetch_page(&self, player: &PlayerEntry) -> Result<Option<String>> {
        let resp = match self.client.get(&player.url).send() {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => {
                warn!("{}: timed out fetching {}", player.name, player.url);
                return Ok(None);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("request {}", player.url));
            }
        };
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("http {} for {}", status, player.url));
        }
        match resp.text() {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.is_timeout() => {
                warn!("{}: timed out reading {}", player.name, player.url);
                Ok(None)
            }
            Err(err) => Err(err).with_context(|| format!("read body {}", player.url)),
        }
    }
}

impl RecordSource for HttpRecordSource {
    fn fetch(&mut self, player: &PlayerEntry) -> Result<Option<ScrapedRecord>> {
        let Some(html) = self.fetch_page(player)? else {
            return Ok(None);
        };

        let stats = match parse_stats_block(&html) {
            Ok(stats) => stats,
            Err(err) => {
                warn!("{}: {err} ({})", player.name, player.url);
                if let Some(dir) = &self.debug_dir {
                    dump_page(dir, player, &html, None)?;
                }
                return Ok(None);
            }
        };

        if let Some(dir) = &self.debug_dir {
            dump_page(dir, player, &html, Some(&stats))?;
            info!("{}: page and stats saved under {}", player.name, dir.display());
        }

        let record = ScrapedRecord::from_stat_map(&stats);
        info!(
            "{}: extracted {} rating={}",
            player.name, record.features, record.rating
        );
        Ok(Some(record))
    }
}

fn dump_page(
    dir: &Path,
    player: &PlayerEntry,
    html: &str,
    stats: Option<&HashMap<String, String>>,
) -> Result<()> {
    let stem = file_stem(&player.name);
    let html_path = dir.join(format!("{stem}.html"));
    fs::write(&html_path, html).with_context(|| format!("write {}", html_path.display()))?;

    let Some(stats) = stats else {
        return Ok(());
    };
    let dump = PageDump {
        player: &player.name,
        url: &player.url,
        fetched_at: chrono::Utc::now().to_rfc3339(),
        stats: stats
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect(),
    };
    let json_path = dir.join(format!("{stem}.json"));
    let raw = serde_json::to_string_pretty(&dump).context("serialize page dump")?;
    fs::write(&json_path, raw).with_context(|| format!("write {}", json_path.display()))?;
    Ok(())
}

fn file_stem(name: &str) -> String {
    let stem = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    if stem.is_empty() {
        "player".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_is_filesystem_safe() {
        assert_eq!(file_stem("s1mple"), "s1mple");
        assert_eq!(file_stem("a/b c"), "a_b_c");
        assert_eq!(file_stem(""), "player");
    }

    #[test]
    fn dump_writes_html_and_stats() {
        let dir = std::env::temp_dir().join(format!("rating_fit_dump_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let player = PlayerEntry {
            name: "ropz".to_string(),
            url: "https://a.test/ropz".to_string(),
        };
        let mut stats = HashMap::new();
        stats.insert("K/D Ratio".to_string(), "1.18".to_string());

        dump_page(&dir, &player, "<html></html>", Some(&stats)).unwrap();
        assert!(dir.join("ropz.html").exists());
        let json = fs::read_to_string(dir.join("ropz.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["stats"]["K/D Ratio"], "1.18");
        assert_eq!(value["player"], "ropz");
    }
}
