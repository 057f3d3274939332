use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{
  Deserialize,
  Serialize
};

/// Named date-range shortcut offered by
/// the filter, plus `Custom` for an
/// explicitly picked range.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum DatePreset {
  Today,
  Yesterday,
  LastWeek,
  LastMonth,
  LastQuarter,
  LastYear,
  WeekToDate,
  MonthToDate,
  QuarterToDate,
  YearToDate,
  Custom
}

impl DatePreset {
  /// Named presets in the order the
  /// popover lists them.
  pub const NAMED: [DatePreset; 10] = [
    DatePreset::Today,
    DatePreset::Yesterday,
    DatePreset::LastWeek,
    DatePreset::LastMonth,
    DatePreset::LastQuarter,
    DatePreset::LastYear,
    DatePreset::WeekToDate,
    DatePreset::MonthToDate,
    DatePreset::QuarterToDate,
    DatePreset::YearToDate
  ];

  pub fn as_key(self) -> &'static str {
    match self {
      | DatePreset::Today => "today",
      | DatePreset::Yesterday => {
        "yesterday"
      }
      | DatePreset::LastWeek => {
        "lastWeek"
      }
      | DatePreset::LastMonth => {
        "lastMonth"
      }
      | DatePreset::LastQuarter => {
        "lastQuarter"
      }
      | DatePreset::LastYear => {
        "lastYear"
      }
      | DatePreset::WeekToDate => {
        "weekToDate"
      }
      | DatePreset::MonthToDate => {
        "monthToDate"
      }
      | DatePreset::QuarterToDate => {
        "quarterToDate"
      }
      | DatePreset::YearToDate => {
        "yearToDate"
      }
      | DatePreset::Custom => "custom"
    }
  }

  pub fn from_key(
    raw: &str
  ) -> Option<Self> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case(
      "custom"
    ) {
      return Some(DatePreset::Custom);
    }
    Self::NAMED.into_iter().find(
      |preset| {
        preset
          .as_key()
          .eq_ignore_ascii_case(trimmed)
      }
    )
  }

  pub fn is_custom(self) -> bool {
    self == DatePreset::Custom
  }
}

impl fmt::Display for DatePreset {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_key())
  }
}

impl FromStr for DatePreset {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::from_key(s).ok_or_else(|| {
      anyhow!(
        "unknown date preset: {s} \
         (expected one of today, \
         yesterday, lastWeek, \
         lastMonth, lastQuarter, \
         lastYear, weekToDate, \
         monthToDate, quarterToDate, \
         yearToDate, custom)"
      )
    })
  }
}
