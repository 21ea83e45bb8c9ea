use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive numeric range for `INTEGER` columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NumericConstraint {
    pub min: f64,
    pub max: f64,
}

impl NumericConstraint {
    /// Normalize the bounds in place.
    ///
    /// When `min < max` the two are swapped, so `min >= max` always holds
    /// afterwards. Generation samples from the range spanned by both bounds,
    /// so the swap never changes which values can be produced.
    pub fn validate(&mut self) -> Result<()> {
        if self.min < self.max {
            std::mem::swap(&mut self.min, &mut self.max);
        }
        Ok(())
    }

    /// Lower and upper integer bounds of the spanned range, truncated toward zero.
    pub fn integer_bounds(&self) -> (i64, i64) {
        let a = self.min as i64;
        let b = self.max as i64;
        (a.min(b), a.max(b))
    }
}

/// Choice list or pattern for `STRING` columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StringConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<String>,
}

impl StringConstraint {
    pub fn validate(&mut self) -> Result<()> {
        if self.one_of.is_empty() && self.pattern().is_none() {
            return Err(Error::InvalidSchema(
                "stringConstraint must specify either regex or oneOf properties".to_string(),
            ));
        }
        Ok(())
    }

    /// The regex pattern, when present and non-empty.
    pub fn pattern(&self) -> Option<&str> {
        self.regex.as_deref().filter(|pattern| !pattern.is_empty())
    }
}

/// Instant range and output format for `TIMESTAMP` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimestampConstraint {
    #[serde(rename = "after", default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(rename = "before", default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub format: String,
}

impl TimestampConstraint {
    pub fn validate(&mut self) -> Result<()> {
        if self.start_instant().is_some() != self.end_instant().is_some() {
            return Err(Error::InvalidSchema(
                "timestampConstraint must specify BOTH or NEITHER before and after".to_string(),
            ));
        }
        if self.format.is_empty() {
            return Err(Error::InvalidSchema(
                "timestampConstraint format must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        self.start.filter(|instant| !is_zero_instant(instant))
    }

    pub fn end_instant(&self) -> Option<DateTime<Utc>> {
        self.end.filter(|instant| !is_zero_instant(instant))
    }

    /// Both bounds, ordered, when the range is fully specified.
    pub fn range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.start_instant()?;
        let end = self.end_instant()?;
        Some((start.min(end), start.max(end)))
    }
}

/// `0001-01-01T00:00:00Z` is what older schema writers emit for an unset instant.
fn is_zero_instant(instant: &DateTime<Utc>) -> bool {
    instant.timestamp() == ZERO_INSTANT_SECONDS && instant.timestamp_subsec_nanos() == 0
}

const ZERO_INSTANT_SECONDS: i64 = -62_135_596_800;

/// Omission probability, applicable to every source kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneralConstraint {
    pub skip_chance: f64,
}

impl GeneralConstraint {
    pub fn validate(&mut self) -> Result<()> {
        if self.skip_chance < 0.0 {
            return Err(Error::InvalidSchema(format!(
                "generalConstraint skipChance must be >= 0.0: {:.3}",
                self.skip_chance
            )));
        }
        Ok(())
    }
}

/// The single value-shaping constraint a column may carry.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueConstraint {
    Numeric(NumericConstraint),
    String(StringConstraint),
    Timestamp(TimestampConstraint),
}

impl ValueConstraint {
    pub fn validate(&mut self) -> Result<()> {
        match self {
            ValueConstraint::Numeric(constraint) => constraint.validate(),
            ValueConstraint::String(constraint) => constraint.validate(),
            ValueConstraint::Timestamp(constraint) => constraint.validate(),
        }
    }

    /// YAML key the variant is written under.
    pub fn key(&self) -> &'static str {
        match self {
            ValueConstraint::Numeric(_) => "numericConstraint",
            ValueConstraint::String(_) => "stringConstraint",
            ValueConstraint::Timestamp(_) => "timestampConstraint",
        }
    }
}
