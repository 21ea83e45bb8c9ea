use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};
use rand_regex::Regex as RandRegex;
use regex_syntax::ParserBuilder;
use regex_syntax::hir::{Hir, HirKind};

use csvforge_core::{NumericConstraint, StringConstraint};

use crate::errors::GenerationError;

/// Upper bound for unbounded repetitions (`*`, `+`) in string patterns.
pub const DEFAULT_MAX_REPEAT: u32 = 32;

/// Output format for timestamps without a constraint.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d";

/// Written when a timestamp cannot be rendered with its format.
pub const INVALID_TIMESTAMP_FORMAT: &str = "INVALID_TIMESTAMP_FORMAT";

pub fn integer(constraint: Option<&NumericConstraint>, rng: &mut dyn RngCore) -> String {
    match constraint {
        Some(constraint) => {
            let (low, high) = constraint.integer_bounds();
            rng.random_range(low..=high).to_string()
        }
        None => rng.random::<i64>().to_string(),
    }
}

pub fn one_of(constraint: &StringConstraint, rng: &mut dyn RngCore) -> Option<String> {
    if constraint.one_of.is_empty() {
        return None;
    }
    let idx = rng.random_range(0..constraint.one_of.len());
    Some(constraint.one_of[idx].clone())
}

/// Compile a string pattern for sampling.
///
/// Perl classes (`\d`, `\w`, `\s`) are ASCII. A pattern that needs Unicode to
/// stay valid UTF-8 (`.`, negated classes) is parsed with Unicode classes.
/// Anchors and word boundaries are dropped since they only restrict matching.
pub fn compile_pattern(pattern: &str) -> Result<RandRegex, GenerationError> {
    let invalid = |err: &dyn std::fmt::Display| {
        GenerationError::InvalidPattern(format!("'{pattern}': {err}"))
    };
    let hir = ParserBuilder::new()
        .unicode(false)
        .build()
        .parse(pattern)
        .or_else(|_| ParserBuilder::new().build().parse(pattern))
        .map_err(|err| invalid(&err))?;
    RandRegex::with_hir(without_assertions(hir), DEFAULT_MAX_REPEAT).map_err(|err| invalid(&err))
}

fn without_assertions(hir: Hir) -> Hir {
    match hir.into_kind() {
        HirKind::Empty | HirKind::Look(_) => Hir::empty(),
        HirKind::Literal(literal) => Hir::literal(literal.0),
        HirKind::Class(class) => Hir::class(class),
        HirKind::Repetition(mut repetition) => {
            repetition.sub = Box::new(without_assertions(*repetition.sub));
            Hir::repetition(repetition)
        }
        HirKind::Capture(mut capture) => {
            capture.sub = Box::new(without_assertions(*capture.sub));
            Hir::capture(capture)
        }
        HirKind::Concat(subs) => Hir::concat(subs.into_iter().map(without_assertions).collect()),
        HirKind::Alternation(subs) => {
            Hir::alternation(subs.into_iter().map(without_assertions).collect())
        }
    }
}

pub fn from_pattern(regex: &RandRegex, rng: &mut dyn RngCore) -> String {
    rng.sample::<String, _>(regex)
}

/// Uniform instant in `[start, end]` at whole-second resolution.
pub fn instant(start: DateTime<Utc>, end: DateTime<Utc>, rng: &mut dyn RngCore) -> DateTime<Utc> {
    let (low, high) = (start.min(end).timestamp(), start.max(end).timestamp());
    let seconds = rng.random_range(low..=high);
    DateTime::from_timestamp(seconds, 0).unwrap_or(start)
}

/// Render an instant, or `None` when the format cannot be applied.
pub fn format_instant(instant: DateTime<Utc>, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", instant.format(format)).ok()?;
    Some(out)
}

/// Reject strftime strings containing unknown specifiers.
pub fn check_format(format: &str) -> Result<(), GenerationError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(GenerationError::InvalidFormat(format.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn integer_stays_within_constraint() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let constraint = NumericConstraint { min: 9.0, max: 1.0 };
        for _ in 0..200 {
            let value: i64 = integer(Some(&constraint), &mut rng).parse().unwrap();
            assert!((1..=9).contains(&value));
        }
    }

    #[test]
    fn degenerate_range_yields_the_bound() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let constraint = NumericConstraint { min: 4.0, max: 4.0 };
        assert_eq!(integer(Some(&constraint), &mut rng), "4");
    }

    #[test]
    fn instant_is_inclusive_and_ordered() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        for _ in 0..100 {
            let value = instant(end, start, &mut rng);
            assert!(value >= start && value <= end);
        }
        assert_eq!(instant(start, start, &mut rng), start);
    }

    #[test]
    fn check_format_flags_unknown_specifiers() {
        assert!(check_format("%Y-%m-%d").is_ok());
        assert!(check_format("%Y-%m-%dT%H:%M:%S%.3fZ").is_ok());
        assert!(matches!(
            check_format("%Y-%Q"),
            Err(GenerationError::InvalidFormat(_))
        ));
    }

    fn sample(pattern: &str, count: usize) -> Vec<String> {
        let regex = compile_pattern(pattern).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        (0..count).map(|_| from_pattern(&regex, &mut rng)).collect()
    }

    #[test]
    fn pattern_compilation_errors_are_reported() {
        assert!(compile_pattern("[a-z]{4}").is_ok());
        assert!(matches!(
            compile_pattern("(unclosed"),
            Err(GenerationError::InvalidPattern(_))
        ));
    }

    #[test]
    fn anchors_are_ignored() {
        for value in sample("^[A-Z]{3}$", 50) {
            assert_eq!(value.len(), 3, "{value}");
            assert!(value.chars().all(|c| c.is_ascii_uppercase()), "{value}");
        }
        assert_eq!(sample(r"\Afoo\z", 1), vec!["foo".to_string()]);
        assert_eq!(sample(r"^(ab|ab)$", 1), vec!["ab".to_string()]);
    }

    #[test]
    fn perl_classes_are_ascii() {
        for value in sample(r"\d{4}", 100) {
            assert_eq!(value.len(), 4, "{value}");
            assert!(value.chars().all(|c| c.is_ascii_digit()), "{value}");
        }
        for value in sample(r"\w{6}", 100) {
            assert!(
                value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
                "{value}"
            );
        }
    }

    #[test]
    fn dot_still_compiles() {
        for value in sample(".{3}", 20) {
            assert_eq!(value.chars().count(), 3, "{value}");
        }
    }
}
