use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

pub const FEATURE_COUNT: usize = 5;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "kdr",
    "damage_per_round",
    "kills_per_round",
    "assists_per_round",
    "headshot_fraction",
];

const HEADSHOT_INDEX: usize = 4;

// Labels used by the player statistics block.
pub const KEY_KDR: &str = "K/D Ratio";
pub const KEY_DAMAGE_PER_ROUND: &str = "Damage / Round";
pub const KEY_KILLS_PER_ROUND: &str = "Kills / round";
pub const KEY_ASSISTS_PER_ROUND: &str = "Assists / round";
pub const KEY_HEADSHOT: &str = "Headshot %";
pub const KEY_RATING: &str = "Rating 2.0";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("total rounds must be greater than zero")]
    ZeroRounds,
    #[error("K/D ratio must be positive, got {0}")]
    NonPositiveKdr(f64),
    #[error("damage per round cannot be negative, got {0}")]
    NegativeDamage(f64),
    #[error("headshot percentage must lie in 0..=100, got {0}")]
    HeadshotOutOfRange(f64),
    #[error("could not parse {field} from {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{field} is zero; the stat is missing or unreliable")]
    ZeroField { field: &'static str },
}

/// Model inputs in canonical order: kdr, damage/round, kills/round,
/// assists/round, headshot fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let values: [f64; FEATURE_COUNT] = values.try_into().ok()?;
        Some(Self(values))
    }

    pub fn kdr(&self) -> f64 {
        self.0[0]
    }

    pub fn headshot_fraction(&self) -> f64 {
        self.0[HEADSHOT_INDEX]
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (name, value)) in FEATURE_NAMES.iter().zip(self.0.iter()).enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value:.3}")?;
        }
        Ok(())
    }
}

/// Career totals as a player would type them in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawStats {
    pub kdr: f64,
    pub total_kills: u32,
    pub total_deaths: u32,
    pub damage_per_round: f64,
    pub rounds: u32,
    pub headshot_percent: f64,
}

impl RawStats {
    pub fn parse_fields(
        kdr: &str,
        total_kills: &str,
        total_deaths: &str,
        damage_per_round: &str,
        rounds: &str,
        headshot_percent: &str,
    ) -> Result<Self, IngestError> {
        Ok(Self {
            kdr: parse_real("K/D ratio", kdr)?,
            total_kills: parse_count("total kills", total_kills)?,
            total_deaths: parse_count("total deaths", total_deaths)?,
            damage_per_round: parse_real("damage per round", damage_per_round)?,
            rounds: parse_count("total rounds", rounds)?,
            headshot_percent: parse_real("headshot %", headshot_percent)?,
        })
    }
}

pub fn ingest(raw: &RawStats) -> Result<FeatureVector, IngestError> {
    if raw.rounds == 0 {
        return Err(IngestError::ZeroRounds);
    }
    if raw.kdr.is_nan() || raw.kdr <= 0.0 {
        return Err(IngestError::NonPositiveKdr(raw.kdr));
    }
    if raw.damage_per_round.is_nan() || raw.damage_per_round < 0.0 {
        return Err(IngestError::NegativeDamage(raw.damage_per_round));
    }
    if !(0.0..=100.0).contains(&raw.headshot_percent) {
        return Err(IngestError::HeadshotOutOfRange(raw.headshot_percent));
    }

    let rounds = raw.rounds as f64;
    let kills = raw.total_kills as f64;
    let deaths = raw.total_deaths as f64;

    let kills_per_round = kills / rounds;
    let assists_per_round = (kills / raw.kdr - deaths) / rounds;
    let headshot_fraction = raw.headshot_percent / 100.0;

    Ok(FeatureVector([
        raw.kdr,
        raw.damage_per_round,
        kills_per_round,
        assists_per_round,
        headshot_fraction,
    ]))
}

/// One observation pulled from a statistics page: features plus the
/// published rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrapedRecord {
    pub features: FeatureVector,
    pub rating: f64,
}

impl ScrapedRecord {
    /// Builds a record from `[kdr, dpr, kpr, apr, headshot_fraction, rating]`.
    pub fn from_row(row: [f64; FEATURE_COUNT + 1]) -> Self {
        let [kdr, dpr, kpr, apr, hs, rating] = row;
        Self {
            features: FeatureVector([kdr, dpr, kpr, apr, hs]),
            rating,
        }
    }

    /// Missing or unreadable keys read as zero and get caught by `validate`.
    pub fn from_stat_map(stats: &HashMap<String, String>) -> Self {
        let kdr = stat_value(stats, KEY_KDR);
        let damage_per_round = stat_value(stats, KEY_DAMAGE_PER_ROUND);
        let kills_per_round = stat_value(stats, KEY_KILLS_PER_ROUND);
        let assists_per_round = stat_value(stats, KEY_ASSISTS_PER_ROUND);
        let headshot_fraction = stats
            .get(KEY_HEADSHOT)
            .and_then(|raw| raw.trim().trim_end_matches('%').trim().parse::<f64>().ok())
            .unwrap_or(0.0)
            / 100.0;
        let rating = stat_value(stats, KEY_RATING);

        Self {
            features: FeatureVector([
                kdr,
                damage_per_round,
                kills_per_round,
                assists_per_round,
                headshot_fraction,
            ]),
            rating,
        }
    }

    /// Zero in any feature except the headshot fraction means the page did
    /// not carry that stat.
    pub fn validate(&self) -> Result<(), IngestError> {
        for (idx, value) in self.features.0.iter().enumerate() {
            if idx == HEADSHOT_INDEX {
                continue;
            }
            if *value == 0.0 {
                return Err(IngestError::ZeroField {
                    field: FEATURE_NAMES[idx],
                });
            }
        }
        Ok(())
    }
}

fn stat_value(stats: &HashMap<String, String>, key: &str) -> f64 {
    stats
        .get(key)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_real(field: &'static str, raw: &str) -> Result<f64, IngestError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| IngestError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

fn parse_count(field: &'static str, raw: &str) -> Result<u32, IngestError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| IngestError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw() -> RawStats {
        RawStats {
            kdr: 1.2,
            total_kills: 1200,
            total_deaths: 1000,
            damage_per_round: 82.5,
            rounds: 1500,
            headshot_percent: 48.0,
        }
    }

    fn stat_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn ingest_derives_per_round_features() {
        let v = ingest(&sample_raw()).unwrap();
        assert_eq!(v.kdr(), 1.2);
        assert_eq!(v.0[1], 82.5);
        assert!((v.0[2] - 0.8).abs() < 1e-12);
        // 1200 / 1.2 - 1000 = 0
        assert!(v.0[3].abs() < 1e-9);
        assert!((v.headshot_fraction() - 0.48).abs() < 1e-12);
    }

    #[test]
    fn ingest_keeps_headshot_in_unit_range() {
        for hs in [0.0, 12.5, 53.0, 100.0] {
            let raw = RawStats {
                headshot_percent: hs,
                ..sample_raw()
            };
            let v = ingest(&raw).unwrap();
            assert_eq!(v.0.len(), FEATURE_COUNT);
            assert!((0.0..=1.0).contains(&v.headshot_fraction()));
        }
    }

    #[test]
    fn ingest_rejects_zero_rounds() {
        let raw = RawStats {
            rounds: 0,
            ..sample_raw()
        };
        assert_eq!(ingest(&raw), Err(IngestError::ZeroRounds));
    }

    #[test]
    fn ingest_rejects_zero_kdr() {
        let raw = RawStats {
            kdr: 0.0,
            ..sample_raw()
        };
        assert!(matches!(ingest(&raw), Err(IngestError::NonPositiveKdr(_))));
    }

    #[test]
    fn ingest_rejects_nan_kdr_and_negative_damage() {
        let raw = RawStats {
            kdr: f64::NAN,
            ..sample_raw()
        };
        assert!(matches!(ingest(&raw), Err(IngestError::NonPositiveKdr(_))));

        let raw = RawStats {
            damage_per_round: -50.0,
            ..sample_raw()
        };
        assert_eq!(ingest(&raw), Err(IngestError::NegativeDamage(-50.0)));

        let raw = RawStats {
            damage_per_round: 0.0,
            ..sample_raw()
        };
        assert!(ingest(&raw).is_ok());
    }

    #[test]
    fn parse_fields_reports_bad_field() {
        let err = RawStats::parse_fields("1.1", "12x", "10", "80", "100", "45").unwrap_err();
        assert_eq!(
            err,
            IngestError::InvalidNumber {
                field: "total kills",
                value: "12x".to_string()
            }
        );
        let ok = RawStats::parse_fields(" 1.1 ", "120", "100", "80.5", "200", "45").unwrap();
        assert_eq!(ok.total_kills, 120);
        assert_eq!(ok.rounds, 200);
    }

    #[test]
    fn stat_map_strips_percent_and_defaults_missing() {
        let stats = stat_map(&[
            (KEY_KDR, "1.21"),
            (KEY_DAMAGE_PER_ROUND, "83.4"),
            (KEY_KILLS_PER_ROUND, "0.76"),
            (KEY_HEADSHOT, "48.2%"),
            (KEY_RATING, "1.15"),
        ]);
        let record = ScrapedRecord::from_stat_map(&stats);
        assert_eq!(record.features.kdr(), 1.21);
        assert_eq!(record.features.0[3], 0.0);
        assert!((record.features.headshot_fraction() - 0.482).abs() < 1e-12);
        assert_eq!(record.rating, 1.15);
        assert_eq!(
            record.validate(),
            Err(IngestError::ZeroField {
                field: "assists_per_round"
            })
        );
    }

    #[test]
    fn zero_headshot_is_not_a_rejection() {
        let record = ScrapedRecord::from_row([1.1, 80.0, 0.7, 0.1, 0.0, 1.05]);
        assert!(record.validate().is_ok());
    }
}
