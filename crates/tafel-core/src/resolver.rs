//! Maps a preset keyword and "today" to
//! a concrete inclusive date window.
//!
//! Every function here takes `today`
//! explicitly; nothing reads the system
//! clock, so results are deterministic
//! for a fixed anchor.

use anyhow::anyhow;
use chrono::{
  DateTime,
  Datelike,
  NaiveDate,
  Utc
};
use chrono_tz::Tz;
use serde::{
  Deserialize,
  Serialize
};

use crate::calendar::{
  add_days,
  first_day_of_month,
  last_day_of_month,
  monday_of_week
};
use crate::clock::local_midnight_to_utc;
use crate::preset::DatePreset;

/// Inclusive `[start, end]` range of
/// calendar days. `start <= end` always
/// holds.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct DateWindow {
  pub start: NaiveDate,
  pub end:   NaiveDate
}

impl DateWindow {
  /// Builds a window from two days in
  /// either order.
  pub fn new(
    a: NaiveDate,
    b: NaiveDate
  ) -> Self {
    if a <= b {
      Self { start: a, end: b }
    } else {
      Self { start: b, end: a }
    }
  }

  pub fn single(day: NaiveDate) -> Self {
    Self {
      start: day,
      end:   day
    }
  }

  pub fn contains(
    &self,
    day: NaiveDate
  ) -> bool {
    self.start <= day && day <= self.end
  }

  /// Number of days covered, counting
  /// both ends.
  pub fn len_days(&self) -> i64 {
    (self.end - self.start).num_days()
      + 1
  }

  /// Half-open UTC bounds
  /// `[start 00:00, end+1 00:00)` in the
  /// given timezone, for querying
  /// timestamped data.
  #[tracing::instrument(skip(self, tz), fields(start = %self.start, end = %self.end, tz = %tz))]
  pub fn to_utc_bounds(
    &self,
    tz: Tz
  ) -> anyhow::Result<(
    DateTime<Utc>,
    DateTime<Utc>
  )> {
    let lower = local_midnight_to_utc(
      tz,
      self.start,
      "window-start"
    )?;
    let day_after =
      add_days(self.end, 1)?;
    let upper = local_midnight_to_utc(
      tz,
      day_after,
      "window-end"
    )?;
    Ok((lower, upper))
  }
}

/// Resolves a named preset relative to
/// `today`. `Custom` has no implicit
/// window; use [`resolve_custom`].
#[tracing::instrument(level = "debug")]
pub fn resolve_preset(
  preset: DatePreset,
  today: NaiveDate
) -> anyhow::Result<DateWindow> {
  let year = today.year();
  let month = today.month();

  let window = match preset {
    | DatePreset::Today => {
      DateWindow::single(today)
    }
    | DatePreset::Yesterday => {
      DateWindow::single(add_days(
        today, -1
      )?)
    }
    | DatePreset::LastWeek => {
      let this_monday =
        monday_of_week(today)?;
      let start =
        add_days(this_monday, -7)?;
      DateWindow {
        start,
        end: add_days(start, 6)?
      }
    }
    | DatePreset::LastMonth => {
      let (prev_year, prev_month) =
        if month == 1 {
          (year - 1, 12)
        } else {
          (year, month - 1)
        };
      DateWindow {
        start: first_day_of_month(
          prev_year, prev_month
        )?,
        end:   last_day_of_month(
          prev_year, prev_month
        )?
      }
    }
    | DatePreset::LastQuarter => {
      let quarter = today.month0() / 3;
      let (q_year, q_index) =
        if quarter == 0 {
          (year - 1, 3)
        } else {
          (year, quarter - 1)
        };
      DateWindow {
        start: first_day_of_month(
          q_year,
          q_index * 3 + 1
        )?,
        end:   last_day_of_month(
          q_year,
          q_index * 3 + 3
        )?
      }
    }
    | DatePreset::LastYear => {
      DateWindow {
        start: first_day_of_month(
          year - 1,
          1
        )?,
        end:   last_day_of_month(
          year - 1,
          12
        )?
      }
    }
    | DatePreset::WeekToDate => {
      DateWindow {
        start: monday_of_week(today)?,
        end:   today
      }
    }
    | DatePreset::MonthToDate => {
      DateWindow {
        start: first_day_of_month(
          year, month
        )?,
        end:   today
      }
    }
    | DatePreset::QuarterToDate => {
      let quarter = today.month0() / 3;
      DateWindow {
        start: first_day_of_month(
          year,
          quarter * 3 + 1
        )?,
        end:   today
      }
    }
    | DatePreset::YearToDate => {
      DateWindow {
        start: first_day_of_month(
          year, 1
        )?,
        end:   today
      }
    }
    | DatePreset::Custom => {
      return Err(anyhow!(
        "custom preset has no implicit \
         window; supply start and end"
      ));
    }
  };

  tracing::debug!(
    preset = %preset,
    start = %window.start,
    end = %window.end,
    "resolved preset window"
  );
  Ok(window)
}

/// Explicit range picked by the user.
/// A missing `end` collapses to `start`.
pub fn resolve_custom(
  start: NaiveDate,
  end: Option<NaiveDate>
) -> DateWindow {
  DateWindow::new(
    start,
    end.unwrap_or(start)
  )
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    DateWindow,
    resolve_custom,
    resolve_preset
  };
  use crate::preset::DatePreset;

  fn day(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn window(
    preset: DatePreset,
    today: NaiveDate
  ) -> DateWindow {
    resolve_preset(preset, today)
      .expect("resolve preset")
  }

  #[test]
  fn last_week_is_previous_monday_to_sunday()
   {
    let today = day(2025, 6, 18);
    assert_eq!(
      window(DatePreset::LastWeek, today),
      DateWindow {
        start: day(2025, 6, 9),
        end:   day(2025, 6, 15)
      }
    );
  }

  #[test]
  fn last_week_from_a_sunday_skips_current_week()
   {
    // 2025-06-22 is a Sunday; its week
    // began on 2025-06-16.
    assert_eq!(
      window(
        DatePreset::LastWeek,
        day(2025, 6, 22)
      ),
      DateWindow {
        start: day(2025, 6, 9),
        end:   day(2025, 6, 15)
      }
    );
  }

  #[test]
  fn quarter_to_date_starts_on_quarter_boundary()
   {
    assert_eq!(
      window(
        DatePreset::QuarterToDate,
        day(2025, 8, 20)
      ),
      DateWindow {
        start: day(2025, 7, 1),
        end:   day(2025, 8, 20)
      }
    );
  }

  #[test]
  fn last_quarter_rolls_back_into_previous_year()
   {
    assert_eq!(
      window(
        DatePreset::LastQuarter,
        day(2025, 2, 10)
      ),
      DateWindow {
        start: day(2024, 10, 1),
        end:   day(2024, 12, 31)
      }
    );
    assert_eq!(
      window(
        DatePreset::LastQuarter,
        day(2025, 8, 20)
      ),
      DateWindow {
        start: day(2025, 4, 1),
        end:   day(2025, 6, 30)
      }
    );
  }

  #[test]
  fn last_month_handles_january_and_leap_february()
   {
    assert_eq!(
      window(
        DatePreset::LastMonth,
        day(2025, 1, 15)
      ),
      DateWindow {
        start: day(2024, 12, 1),
        end:   day(2024, 12, 31)
      }
    );
    assert_eq!(
      window(
        DatePreset::LastMonth,
        day(2024, 3, 31)
      ),
      DateWindow {
        start: day(2024, 2, 1),
        end:   day(2024, 2, 29)
      }
    );
  }

  #[test]
  fn single_day_presets() {
    let today = day(2025, 3, 1);
    assert_eq!(
      window(DatePreset::Today, today),
      DateWindow::single(today)
    );
    assert_eq!(
      window(
        DatePreset::Yesterday,
        today
      ),
      DateWindow::single(day(
        2025, 2, 28
      ))
    );
  }

  #[test]
  fn to_date_presets_end_today() {
    let today = day(2025, 6, 18);
    assert_eq!(
      window(
        DatePreset::WeekToDate,
        today
      )
      .start,
      day(2025, 6, 16)
    );
    assert_eq!(
      window(
        DatePreset::MonthToDate,
        today
      )
      .start,
      day(2025, 6, 1)
    );
    assert_eq!(
      window(
        DatePreset::YearToDate,
        today
      ),
      DateWindow {
        start: day(2025, 1, 1),
        end:   today
      }
    );
    assert_eq!(
      window(DatePreset::LastYear, today),
      DateWindow {
        start: day(2024, 1, 1),
        end:   day(2024, 12, 31)
      }
    );
  }

  #[test]
  fn week_to_date_on_monday_is_single_day()
   {
    let monday = day(2025, 6, 16);
    assert_eq!(
      window(
        DatePreset::WeekToDate,
        monday
      ),
      DateWindow::single(monday)
    );
  }

  #[test]
  fn custom_needs_explicit_dates() {
    assert!(
      resolve_preset(
        DatePreset::Custom,
        day(2025, 1, 1)
      )
      .is_err()
    );
    assert_eq!(
      resolve_custom(
        day(2025, 3, 5),
        None
      ),
      DateWindow::single(day(2025, 3, 5))
    );
    assert_eq!(
      resolve_custom(
        day(2025, 3, 9),
        Some(day(2025, 3, 5))
      ),
      DateWindow {
        start: day(2025, 3, 5),
        end:   day(2025, 3, 9)
      }
    );
  }

  #[test]
  fn utc_bounds_follow_restaurant_timezone()
   {
    let bounds = DateWindow::single(day(
      2025, 6, 18
    ))
    .to_utc_bounds(
      chrono_tz::Europe::Amsterdam
    )
    .expect("bounds");
    assert_eq!(
      bounds.0.to_rfc3339(),
      "2025-06-17T22:00:00+00:00"
    );
    assert_eq!(
      bounds.1.to_rfc3339(),
      "2025-06-18T22:00:00+00:00"
    );
  }
}
