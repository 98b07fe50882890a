//! Activation rows.

use std::fmt;
use std::str::FromStr;

use wf_core::{ms, parse_positive, s, to_seconds, WfError};

use crate::error::SequenceError;

/// Unit a duration was entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DurationUnit {
    #[default]
    Seconds,
    Millis,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 2] = [DurationUnit::Seconds, DurationUnit::Millis];

    pub fn tag(self) -> &'static str {
        match self {
            DurationUnit::Seconds => "s",
            DurationUnit::Millis => "ms",
        }
    }

    pub fn to_seconds(self, value: f64) -> f64 {
        match self {
            DurationUnit::Seconds => to_seconds(s(value)),
            DurationUnit::Millis => to_seconds(ms(value)),
        }
    }
}

impl FromStr for DurationUnit {
    type Err = SequenceError;

    fn from_str(v: &str) -> Result<Self, Self::Err> {
        match v.trim() {
            "s" => Ok(DurationUnit::Seconds),
            "ms" => Ok(DurationUnit::Millis),
            other => Err(SequenceError::UnknownTag {
                what: "duration unit",
                value: other.to_string(),
            }),
        }
    }
}

/// Primary or secondary activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Priority {
    /// Runs first.
    Primary,
    #[default]
    Secondary,
}

impl Priority {
    pub fn tag(self) -> &'static str {
        match self {
            Priority::Primary => "P",
            Priority::Secondary => "S",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Priority::Primary => Priority::Secondary,
            Priority::Secondary => Priority::Primary,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Priority {
    type Err = SequenceError;

    fn from_str(v: &str) -> Result<Self, Self::Err> {
        match v.trim() {
            "P" => Ok(Priority::Primary),
            "S" => Ok(Priority::Secondary),
            other => Err(SequenceError::UnknownTag {
                what: "priority",
                value: other.to_string(),
            }),
        }
    }
}

/// One activation of one washing component through one pump output.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceRow {
    pub pump_index: usize,
    /// 1-based.
    pub output_index: u32,
    pub component_id: String,
    pub display_name: String,
    /// As entered; empty until the user types a value.
    pub duration: String,
    pub unit: DurationUnit,
    pub priority: Priority,
}

impl SequenceRow {
    /// A fresh row with the default empty duration, seconds and secondary priority.
    pub fn new(
        pump_index: usize,
        output_index: u32,
        component_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            pump_index,
            output_index,
            component_id: component_id.into(),
            display_name: display_name.into(),
            duration: String::new(),
            unit: DurationUnit::default(),
            priority: Priority::default(),
        }
    }

    pub fn has_entry(&self) -> bool {
        !self.duration.trim().is_empty()
    }

    /// Entered duration as a positive number in the row's unit.
    pub fn duration_value(&self) -> Result<f64, WfError> {
        parse_positive(&self.duration, &self.display_name)
    }

    /// Duration in seconds, `None` when not a positive number.
    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration_value()
            .ok()
            .map(|v| self.unit.to_seconds(v))
    }

    /// Copy what the user entered from `previous`.
    pub fn carry_from(&mut self, previous: &SequenceRow) {
        self.duration = previous.duration.clone();
        self.unit = previous.unit;
        self.priority = previous.priority;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_empty_seconds_secondary() {
        let row = SequenceRow::new(0, 1, "wc", "W");
        assert_eq!(row.duration, "");
        assert_eq!(row.unit, DurationUnit::Seconds);
        assert_eq!(row.priority, Priority::Secondary);
        assert_eq!(row.duration_seconds(), None);
    }

    #[test]
    fn millis_are_converted() {
        let mut row = SequenceRow::new(0, 1, "wc", "W");
        row.duration = "250".into();
        row.unit = DurationUnit::Millis;
        let secs = row.duration_seconds().unwrap();
        assert!((secs - 0.25).abs() < 1e-12);
    }

    #[test]
    fn non_positive_durations_are_rejected() {
        let mut row = SequenceRow::new(0, 1, "wc", "W");
        row.duration = "0".into();
        assert!(row.duration_value().is_err());
        row.duration = "abc".into();
        assert!(row.duration_value().is_err());
        row.duration = "1,5".into();
        assert_eq!(row.duration_value().unwrap(), 1.5);
    }

    #[test]
    fn tags_parse() {
        assert_eq!("P".parse::<Priority>().unwrap(), Priority::Primary);
        assert_eq!("ms".parse::<DurationUnit>().unwrap(), DurationUnit::Millis);
        assert!("X".parse::<Priority>().is_err());
        assert_eq!(Priority::Primary.opposite(), Priority::Secondary);
    }
}
