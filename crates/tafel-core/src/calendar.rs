use anyhow::anyhow;
use chrono::{
  Datelike,
  Duration,
  NaiveDate
};
use serde::{
  Deserialize,
  Serialize
};

use crate::i18n::{
  Language,
  month_title
};
use crate::selection::RangeSelection;

/// Cells per month grid: six Monday-first
/// weeks, so the layout never reflows
/// between short and long months.
pub const GRID_CELLS: usize = 42;

/// Month shown in the right-hand
/// ("current") pane. The left pane is
/// always the month before it.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct CalendarViewMonth {
  year:   i32,
  month0: u32
}

impl CalendarViewMonth {
  pub fn new(
    year: i32,
    month0: u32
  ) -> anyhow::Result<Self> {
    if month0 > 11 {
      return Err(anyhow!(
        "month index out of range: \
         {month0} (expected 0-11)"
      ));
    }
    Ok(Self { year, month0 })
  }

  pub fn of(date: NaiveDate) -> Self {
    Self {
      year:   date.year(),
      month0: date.month0()
    }
  }

  pub fn year(self) -> i32 {
    self.year
  }

  pub fn month0(self) -> u32 {
    self.month0
  }

  /// One-based month, as chrono counts.
  pub fn month(self) -> u32 {
    self.month0 + 1
  }

  pub fn shift(
    self,
    months: i32
  ) -> Self {
    let total = i64::from(self.year)
      * 12
      + i64::from(self.month0)
      + i64::from(months);
    let year = total.div_euclid(12);
    let month0 =
      total.rem_euclid(12) as u32;
    Self {
      year: year
        .clamp(
          i64::from(i32::MIN),
          i64::from(i32::MAX)
        ) as i32,
      month0
    }
  }

  pub fn previous(self) -> Self {
    self.shift(-1)
  }

  pub fn next(self) -> Self {
    self.shift(1)
  }

  pub fn first_day(
    self
  ) -> anyhow::Result<NaiveDate> {
    first_day_of_month(
      self.year,
      self.month()
    )
  }

  pub fn contains(
    self,
    date: NaiveDate
  ) -> bool {
    date.year() == self.year
      && date.month0() == self.month0
  }
}

/// Which of the two side-by-side month
/// grids a cell belongs to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PaneKind {
  Previous,
  Current
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct CalendarCell {
  pub date:               NaiveDate,
  pub in_displayed_month: bool,
  pub is_today:           bool,
  pub is_selected:        bool,
  pub is_future:          bool
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarPane {
  pub kind:  PaneKind,
  pub view:  CalendarViewMonth,
  pub cells: Vec<CalendarCell>
}

impl CalendarPane {
  pub fn cell(
    &self,
    date: NaiveDate
  ) -> Option<&CalendarCell> {
    self
      .cells
      .iter()
      .find(|cell| cell.date == date)
  }

  /// Days outside the displayed month
  /// are never clickable. Days after
  /// today are blocked only in the
  /// current pane.
  pub fn is_selectable(
    &self,
    date: NaiveDate
  ) -> bool {
    let Some(cell) = self.cell(date)
    else {
      return false;
    };
    if !cell.in_displayed_month {
      return false;
    }
    !(self.kind == PaneKind::Current
      && cell.is_future)
  }

  pub fn title(
    &self,
    language: Language
  ) -> String {
    month_title(language, self.view)
  }

  pub fn weeks(
    &self
  ) -> impl Iterator<Item = &[CalendarCell]>
  {
    self.cells.chunks(7)
  }
}

/// 42 consecutive days starting on the
/// Monday on or before the 1st of the
/// month. `month0` is zero-based.
#[tracing::instrument(level = "trace")]
pub fn month_grid(
  year: i32,
  month0: u32
) -> anyhow::Result<[NaiveDate; GRID_CELLS]>
{
  let view =
    CalendarViewMonth::new(year, month0)?;
  let first = view.first_day()?;
  let grid_start =
    monday_of_week(first)?;

  let mut cells =
    [grid_start; GRID_CELLS];
  for (offset, slot) in
    cells.iter_mut().enumerate()
  {
    *slot =
      add_days(grid_start, offset as i64)?;
  }
  Ok(cells)
}

pub fn build_pane(
  view: CalendarViewMonth,
  kind: PaneKind,
  selection: &RangeSelection,
  today: NaiveDate
) -> anyhow::Result<CalendarPane> {
  let cells = month_grid(
    view.year(),
    view.month0()
  )?
  .into_iter()
  .map(|date| {
    CalendarCell {
      date,
      in_displayed_month: view
        .contains(date),
      is_today: date == today,
      is_selected: selection
        .is_selected(date),
      is_future: date > today
    }
  })
  .collect();

  Ok(CalendarPane { kind, view, cells })
}

/// Both panes for a popover whose
/// current pane shows `current`.
pub fn build_panes(
  current: CalendarViewMonth,
  selection: &RangeSelection,
  today: NaiveDate
) -> anyhow::Result<[CalendarPane; 2]> {
  Ok([
    build_pane(
      current.previous(),
      PaneKind::Previous,
      selection,
      today
    )?,
    build_pane(
      current,
      PaneKind::Current,
      selection,
      today
    )?
  ])
}

pub(crate) fn first_day_of_month(
  year: i32,
  month: u32
) -> anyhow::Result<NaiveDate> {
  NaiveDate::from_ymd_opt(year, month, 1)
    .ok_or_else(|| {
      anyhow!(
        "invalid month: {year}-{month:02}"
      )
    })
}

pub(crate) fn last_day_of_month(
  year: i32,
  month: u32
) -> anyhow::Result<NaiveDate> {
  let (next_year, next_month) =
    if month >= 12 {
      (year.saturating_add(1), 1_u32)
    } else {
      (year, month + 1)
    };
  add_days(
    first_day_of_month(
      next_year, next_month
    )?,
    -1
  )
}

pub(crate) fn add_days(
  date: NaiveDate,
  days: i64
) -> anyhow::Result<NaiveDate> {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .ok_or_else(|| {
      anyhow!(
        "date out of range: {date} \
         {days:+} days"
      )
    })
}

pub(crate) fn monday_of_week(
  day: NaiveDate
) -> anyhow::Result<NaiveDate> {
  let diff = day
    .weekday()
    .num_days_from_monday()
    as i64;
  add_days(day, -diff)
}
