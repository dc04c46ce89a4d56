//! Cron expression parsing and expansion.
//!
//! Parses five-field cron expressions (minute, hour, day, month, weekday)
//! and expands them into the discrete calendar points launchd's
//! `StartCalendarInterval` format requires. launchd has no cron syntax of
//! its own, so a field like `3,18` has to become one calendar dict per
//! value, and several constrained fields become their cross product.

use std::collections::BTreeSet;
use thiserror::Error;

use crate::config::Schedule;

/// Errors that can occur when parsing a cron expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CronParseError {
    /// Fewer than five whitespace-separated fields.
    #[error("too few fields: expected 5, got {0}")]
    TooFewFields(usize),

    /// More than five whitespace-separated fields.
    #[error("too many fields: expected 5, got {0}")]
    TooManyFields(usize),

    /// A field value that is neither a number nor a known name.
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// A value outside its field's domain, or an inverted range.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// A step that is zero or not a number.
    #[error("invalid step: {0}")]
    InvalidStep(String),
}

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

const MINUTE: FieldSpec = FieldSpec {
    name: "minute",
    min: 0,
    max: 59,
    domain_max: 59,
    names: &[],
    names_base: 0,
};
const HOUR: FieldSpec = FieldSpec {
    name: "hour",
    min: 0,
    max: 23,
    domain_max: 23,
    names: &[],
    names_base: 0,
};
const DAY: FieldSpec = FieldSpec {
    name: "day",
    min: 1,
    max: 31,
    domain_max: 31,
    names: &[],
    names_base: 1,
};
const MONTH: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    domain_max: 12,
    names: &MONTH_NAMES,
    names_base: 1,
};
// weekday accepts 0-7 on input; 7 is an alias for Sunday (0)
const WEEKDAY: FieldSpec = FieldSpec {
    name: "weekday",
    min: 0,
    max: 7,
    domain_max: 6,
    names: &WEEKDAY_NAMES,
    names_base: 0,
};

/// Domain and symbolic names for one cron field position.
struct FieldSpec {
    name: &'static str,
    min: u32,
    /// Highest accepted input value.
    max: u32,
    /// Highest distinct value after normalization.
    domain_max: u32,
    names: &'static [&'static str],
    names_base: u32,
}

impl FieldSpec {
    /// Resolve a single token to a numeric value, accepting symbolic names
    /// case-insensitively.
    fn value(&self, token: &str) -> Result<u32, CronParseError> {
        if !self.names.is_empty() {
            let lower = token.to_ascii_lowercase();
            if let Some(pos) = self.names.iter().position(|n| *n == lower) {
                return Ok(self.names_base + pos as u32);
            }
        }
        let v: u32 = token
            .parse()
            .map_err(|_| CronParseError::InvalidField(format!("{} value '{}'", self.name, token)))?;
        if v < self.min || v > self.max {
            return Err(CronParseError::InvalidRange(format!(
                "{} {} outside {}-{}",
                self.name, v, self.min, self.max
            )));
        }
        Ok(v)
    }

    /// Map an accepted value onto the field's domain.
    fn normalize(&self, value: u32) -> u32 {
        if value > self.domain_max { self.min } else { value }
    }

    /// Expand one comma-separated term (`*`, `a`, `a-b`, with an optional
    /// `/step`) into the value set.
    fn expand_term(&self, term: &str, out: &mut BTreeSet<u32>) -> Result<(), CronParseError> {
        let (range_part, step) = match term.split_once('/') {
            Some((range_part, step_part)) => {
                let step: u32 = step_part.parse().map_err(|_| {
                    CronParseError::InvalidStep(format!("{} term '{}'", self.name, term))
                })?;
                if step == 0 {
                    return Err(CronParseError::InvalidStep(format!(
                        "{} term '{}'",
                        self.name, term
                    )));
                }
                (range_part, Some(step))
            }
            None => (term, None),
        };

        let (start, end) = if range_part == "*" {
            (self.min, self.domain_max)
        } else if let Some((lo, hi)) = range_part.split_once('-') {
            (self.value(lo)?, self.value(hi)?)
        } else {
            let v = self.value(range_part)?;
            // "N/step" runs from N to the end of the field's domain
            match step {
                Some(_) => (v, self.domain_max),
                None => (v, v),
            }
        };

        if start > end {
            return Err(CronParseError::InvalidRange(format!(
                "{} range {}-{} is inverted",
                self.name, start, end
            )));
        }

        let step = step.unwrap_or(1);
        let mut v = start;
        while v <= end {
            out.insert(self.normalize(v));
            // a step may exceed the remaining span, or even u32::MAX - v
            match v.checked_add(step) {
                Some(next) => v = next,
                None => break,
            }
        }
        Ok(())
    }
}

/// One parsed cron field, resolved to the ordered set of values it matches.
#[derive(Debug, Clone, PartialEq)]
struct CronField {
    /// Matched values, ascending and deduplicated.
    values: Vec<u32>,
    /// True when the set covers the whole domain and so constrains nothing.
    full: bool,
}

impl CronField {
    fn parse(s: &str, spec: &FieldSpec) -> Result<Self, CronParseError> {
        let mut values = BTreeSet::new();
        for term in s.split(',') {
            spec.expand_term(term.trim(), &mut values)?;
        }
        let domain = (spec.domain_max - spec.min + 1) as usize;
        let full = values.len() == domain;
        Ok(Self {
            values: values.into_iter().collect(),
            full,
        })
    }
}

/// A parsed five-field cron expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CronExpression {
    minute: CronField,
    hour: CronField,
    day: CronField,
    month: CronField,
    weekday: CronField,
}

impl CronExpression {
    /// Parse a cron expression from a string.
    pub fn parse(expr: &str) -> Result<Self, CronParseError> {
        let parts: Vec<&str> = expr.split_whitespace().collect();

        if parts.len() < 5 {
            return Err(CronParseError::TooFewFields(parts.len()));
        }
        if parts.len() > 5 {
            return Err(CronParseError::TooManyFields(parts.len()));
        }

        Ok(Self {
            minute: CronField::parse(parts[0], &MINUTE)?,
            hour: CronField::parse(parts[1], &HOUR)?,
            day: CronField::parse(parts[2], &DAY)?,
            month: CronField::parse(parts[3], &MONTH)?,
            weekday: CronField::parse(parts[4], &WEEKDAY)?,
        })
    }

    /// Expand into one schedule per combination of constrained field values.
    ///
    /// Fields whose value set covers the whole domain contribute nothing;
    /// a fully unconstrained expression yields exactly one empty schedule.
    /// Fields combine in (minute, hour, day, month, weekday) order with
    /// later fields varying fastest, so the output order is reproducible.
    pub fn schedules(&self) -> Vec<Schedule> {
        let mut out = vec![Schedule::default()];
        Self::constrain(&mut out, &self.minute, |s, v| s.minute = Some(v));
        Self::constrain(&mut out, &self.hour, |s, v| s.hour = Some(v));
        Self::constrain(&mut out, &self.day, |s, v| s.day = Some(v));
        Self::constrain(&mut out, &self.month, |s, v| s.month = Some(v));
        Self::constrain(&mut out, &self.weekday, |s, v| s.weekday = Some(v));
        out
    }

    /// Multiply the partial schedules by one constrained field's values.
    fn constrain(out: &mut Vec<Schedule>, field: &CronField, set: impl Fn(&mut Schedule, u32)) {
        if field.full {
            return;
        }
        let mut next = Vec::with_capacity(out.len() * field.values.len());
        for partial in out.iter() {
            for &value in &field.values {
                let mut schedule = *partial;
                set(&mut schedule, value);
                next.push(schedule);
            }
        }
        *out = next;
    }
}

/// Parse and expand a cron expression in one step.
pub fn expand(expr: &str) -> Result<Vec<Schedule>, CronParseError> {
    Ok(CronExpression::parse(expr)?.schedules())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_expands_to_single_empty_schedule() {
        let schedules = expand("* * * * *").unwrap();
        assert_eq!(schedules.len(), 1);
        assert!(schedules[0].is_empty());
    }

    #[test]
    fn test_full_range_counts_as_no_constraint() {
        // 0-59 covers the whole minute domain, same as *
        let schedules = expand("0-59 * * * *").unwrap();
        assert_eq!(schedules.len(), 1);
        assert!(schedules[0].is_empty());
    }

    #[test]
    fn test_step_of_one_counts_as_no_constraint() {
        let schedules = expand("*/1 * * * *").unwrap();
        assert_eq!(schedules.len(), 1);
        assert!(schedules[0].is_empty());
    }

    #[test]
    fn test_single_value_field() {
        let schedules = expand("30 * * * *").unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].minute, Some(30));
        assert_eq!(schedules[0].hour, None);
    }

    #[test]
    fn test_list_expands_per_value() {
        let schedules = expand("0,15,30 * * * *").unwrap();
        let minutes: Vec<Option<u32>> = schedules.iter().map(|s| s.minute).collect();
        assert_eq!(minutes, vec![Some(0), Some(15), Some(30)]);
        assert!(schedules.iter().all(|s| s.hour.is_none()));
    }

    #[test]
    fn test_daily_at_five_past_midnight_on_two_days() {
        let schedules = expand("5 0 3,18 * *").unwrap();
        assert_eq!(
            schedules,
            vec![
                Schedule {
                    minute: Some(5),
                    hour: Some(0),
                    day: Some(3),
                    ..Schedule::default()
                },
                Schedule {
                    minute: Some(5),
                    hour: Some(0),
                    day: Some(18),
                    ..Schedule::default()
                },
            ]
        );
    }

    #[test]
    fn test_cross_product_order() {
        // minute varies slowest, hour fastest
        let schedules = expand("0,30 9,17 * * *").unwrap();
        let pairs: Vec<(Option<u32>, Option<u32>)> =
            schedules.iter().map(|s| (s.minute, s.hour)).collect();
        assert_eq!(
            pairs,
            vec![
                (Some(0), Some(9)),
                (Some(0), Some(17)),
                (Some(30), Some(9)),
                (Some(30), Some(17)),
            ]
        );
    }

    #[test]
    fn test_cross_product_size() {
        let schedules = expand("0,30 8,12,18 1,15 * *").unwrap();
        assert_eq!(schedules.len(), 2 * 3 * 2);
    }

    #[test]
    fn test_range_field() {
        let schedules = expand("0 9-11 * * *").unwrap();
        let hours: Vec<Option<u32>> = schedules.iter().map(|s| s.hour).collect();
        assert_eq!(hours, vec![Some(9), Some(10), Some(11)]);
        assert!(schedules.iter().all(|s| s.minute == Some(0)));
    }

    #[test]
    fn test_step_field() {
        let schedules = expand("*/15 * * * *").unwrap();
        let minutes: Vec<Option<u32>> = schedules.iter().map(|s| s.minute).collect();
        assert_eq!(minutes, vec![Some(0), Some(15), Some(30), Some(45)]);
    }

    #[test]
    fn test_range_with_step() {
        let schedules = expand("10-30/10 * * * *").unwrap();
        let minutes: Vec<Option<u32>> = schedules.iter().map(|s| s.minute).collect();
        assert_eq!(minutes, vec![Some(10), Some(20), Some(30)]);
    }

    #[test]
    fn test_plain_start_with_step_runs_to_domain_end() {
        let schedules = expand("5/15 * * * *").unwrap();
        let minutes: Vec<Option<u32>> = schedules.iter().map(|s| s.minute).collect();
        assert_eq!(minutes, vec![Some(5), Some(20), Some(35), Some(50)]);
    }

    #[test]
    fn test_step_larger_than_field_span_keeps_only_start() {
        let schedules = expand("*/75 * * * *").unwrap();
        let minutes: Vec<Option<u32>> = schedules.iter().map(|s| s.minute).collect();
        assert_eq!(minutes, vec![Some(0)]);
    }

    #[test]
    fn test_step_near_u32_max_keeps_only_start() {
        let schedules = expand("1/4294967295 * * * *").unwrap();
        let minutes: Vec<Option<u32>> = schedules.iter().map(|s| s.minute).collect();
        assert_eq!(minutes, vec![Some(1)]);
    }

    #[test]
    fn test_mixed_terms_are_merged_and_sorted() {
        let schedules = expand("40,1-3,2-4 * * * *").unwrap();
        let minutes: Vec<Option<u32>> = schedules.iter().map(|s| s.minute).collect();
        assert_eq!(
            minutes,
            vec![Some(1), Some(2), Some(3), Some(4), Some(40)]
        );
    }

    #[test]
    fn test_month_names() {
        let schedules = expand("0 0 1 jan,JUL *").unwrap();
        let months: Vec<Option<u32>> = schedules.iter().map(|s| s.month).collect();
        assert_eq!(months, vec![Some(1), Some(7)]);
    }

    #[test]
    fn test_weekday_names_in_range() {
        let schedules = expand("0 9 * * mon-fri").unwrap();
        let days: Vec<Option<u32>> = schedules.iter().map(|s| s.weekday).collect();
        assert_eq!(days, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
    }

    #[test]
    fn test_weekday_seven_is_sunday() {
        let schedules = expand("0 0 * * 7").unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].weekday, Some(0));
    }

    #[test]
    fn test_weekday_zero_and_seven_collapse() {
        let schedules = expand("0 0 * * 0,7").unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].weekday, Some(0));
    }

    #[test]
    fn test_weekday_full_range_with_seven_counts_as_no_constraint() {
        let schedules = expand("0 0 * * 0-7").unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].weekday, None);
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let first = expand("0,30 9,17 * mar,sep 1-5").unwrap();
        let second = expand("0,30 9,17 * mar,sep 1-5").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_too_few_fields() {
        assert!(matches!(
            CronExpression::parse("* * * *"),
            Err(CronParseError::TooFewFields(4))
        ));
    }

    #[test]
    fn test_too_many_fields() {
        assert!(matches!(
            CronExpression::parse("* * * * * *"),
            Err(CronParseError::TooManyFields(6))
        ));
    }

    #[test]
    fn test_value_out_of_range() {
        assert!(matches!(
            CronExpression::parse("60 * * * *"),
            Err(CronParseError::InvalidRange(_))
        ));
        assert!(matches!(
            CronExpression::parse("* 24 * * *"),
            Err(CronParseError::InvalidRange(_))
        ));
        assert!(matches!(
            CronExpression::parse("* * 0 * *"),
            Err(CronParseError::InvalidRange(_))
        ));
        assert!(matches!(
            CronExpression::parse("* * * 13 *"),
            Err(CronParseError::InvalidRange(_))
        ));
        assert!(matches!(
            CronExpression::parse("* * * * 8"),
            Err(CronParseError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_inverted_range() {
        assert!(matches!(
            CronExpression::parse("* 17-9 * * *"),
            Err(CronParseError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_zero_step() {
        assert!(matches!(
            CronExpression::parse("*/0 * * * *"),
            Err(CronParseError::InvalidStep(_))
        ));
    }

    #[test]
    fn test_garbage_field() {
        assert!(matches!(
            CronExpression::parse("bogus * * * *"),
            Err(CronParseError::InvalidField(_))
        ));
        assert!(matches!(
            CronExpression::parse("1,, * * * *"),
            Err(CronParseError::InvalidField(_))
        ));
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!(matches!(
            CronExpression::parse("0 0 * janvier *"),
            Err(CronParseError::InvalidField(_))
        ));
    }
}
