pub mod primitives;

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use rand::{Rng, RngCore};
use rand_regex::Regex as RandRegex;
use tracing::warn;

use csvforge_core::{GeneralConstraint, Source, StringConstraint, TimestampConstraint, ValueConstraint};

use crate::faker::FakerRegistry;
use crate::model::CellStats;

pub use primitives::{DEFAULT_TIMESTAMP_FORMAT, INVALID_TIMESTAMP_FORMAT, check_format};

/// Written for a `STRING` column whose constraint cannot produce a value.
pub const INVALID_STRING_CONSTRAINT: &str = "INVALID_STRING_CONSTRAINT";

/// Written when no faker is registered for a source.
pub const UNSUPPORTED_FIELD_TYPE: &str = "UNSUPPORTED_FIELD_TYPE";

/// Produces one textual cell per call.
///
/// Holds the faker registry, the default timestamp window and a cache of
/// compiled patterns. Nothing else carries over between cells.
pub struct ValueGenerator {
    fakers: FakerRegistry,
    default_window: (DateTime<Utc>, DateTime<Utc>),
    patterns: HashMap<String, Option<RandRegex>>,
    warned: HashSet<String>,
    stats: CellStats,
}

impl ValueGenerator {
    /// Generator whose unbounded timestamps fall in `[1900-01-01, reference_time]`.
    pub fn new(fakers: FakerRegistry, reference_time: DateTime<Utc>) -> Self {
        let floor = Utc
            .with_ymd_and_hms(1900, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH);
        Self {
            fakers,
            default_window: (floor.min(reference_time), floor.max(reference_time)),
            patterns: HashMap::new(),
            warned: HashSet::new(),
            stats: CellStats::default(),
        }
    }

    pub fn stats(&self) -> CellStats {
        self.stats
    }

    /// Generate one cell.
    ///
    /// The base value is always drawn; a general constraint then empties it
    /// with probability `skip_chance`.
    pub fn generate(
        &mut self,
        source: Source,
        constraint: Option<&ValueConstraint>,
        general: Option<&GeneralConstraint>,
        rng: &mut dyn RngCore,
    ) -> String {
        let value = self.base_value(source, constraint, rng);
        if let Some(general) = general {
            if rng.random::<f64>() < general.skip_chance {
                self.stats.omitted += 1;
                return String::new();
            }
        }
        value
    }

    fn base_value(
        &mut self,
        source: Source,
        constraint: Option<&ValueConstraint>,
        rng: &mut dyn RngCore,
    ) -> String {
        match (source, constraint) {
            (Source::Integer, Some(ValueConstraint::Numeric(numeric))) => {
                primitives::integer(Some(numeric), rng)
            }
            (Source::Integer, _) => primitives::integer(None, rng),
            (Source::String, Some(ValueConstraint::String(string))) => {
                self.constrained_string(string, rng)
            }
            (Source::Timestamp, Some(ValueConstraint::Timestamp(timestamp))) => {
                self.timestamp(Some(timestamp), rng)
            }
            (Source::Timestamp, _) => self.timestamp(None, rng),
            (source, _) => match self.fakers.fake(source, rng) {
                Some(value) => value,
                None => {
                    self.warn_once(format!("faker:{source}"), || {
                        warn!(source = %source, "no value faker registered; writing sentinel");
                    });
                    self.sentinel(UNSUPPORTED_FIELD_TYPE)
                }
            },
        }
    }

    fn constrained_string(&mut self, constraint: &StringConstraint, rng: &mut dyn RngCore) -> String {
        if let Some(value) = primitives::one_of(constraint, rng) {
            return value;
        }
        let Some(pattern) = constraint.pattern() else {
            return self.sentinel(INVALID_STRING_CONSTRAINT);
        };

        if !self.patterns.contains_key(pattern) {
            let compiled = match primitives::compile_pattern(pattern) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    warn!(pattern, error = %err, "string pattern cannot be compiled; writing sentinel");
                    None
                }
            };
            self.patterns.insert(pattern.to_string(), compiled);
        }

        if let Some(Some(regex)) = self.patterns.get(pattern) {
            return primitives::from_pattern(regex, rng);
        }
        self.sentinel(INVALID_STRING_CONSTRAINT)
    }

    fn timestamp(&mut self, constraint: Option<&TimestampConstraint>, rng: &mut dyn RngCore) -> String {
        let (start, end) = constraint
            .and_then(TimestampConstraint::range)
            .unwrap_or(self.default_window);
        let format = constraint
            .map(|constraint| constraint.format.as_str())
            .filter(|format| !format.is_empty())
            .unwrap_or(DEFAULT_TIMESTAMP_FORMAT);

        let instant = primitives::instant(start, end, rng);
        match primitives::format_instant(instant, format) {
            Some(value) => value,
            None => {
                self.warn_once(format!("format:{format}"), || {
                    warn!(format, "timestamp format cannot be rendered; writing sentinel");
                });
                self.sentinel(INVALID_TIMESTAMP_FORMAT)
            }
        }
    }

    fn sentinel(&mut self, value: &str) -> String {
        self.stats.sentinel += 1;
        value.to_string()
    }

    fn warn_once(&mut self, key: String, log: impl FnOnce()) {
        if self.warned.insert(key) {
            log();
        }
    }
}

impl fmt::Debug for ValueGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueGenerator")
            .field("fakers", &self.fakers)
            .field("default_window", &self.default_window)
            .field("patterns", &self.patterns.keys().collect::<Vec<_>>())
            .field("stats", &self.stats)
            .finish()
    }
}
