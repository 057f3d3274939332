//! The date filter popover: an edit
//! buffer seeded from the committed
//! filter, driven by preset clicks,
//! calendar clicks and typed dates, and
//! either confirmed into a
//! [`FilterSink`] or discarded.

use chrono::NaiveDate;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info
};

use crate::calendar::{
  CalendarPane,
  CalendarViewMonth,
  PaneKind,
  build_pane,
  build_panes
};
use crate::output::{
  CustomRange,
  EmittedFilterValue,
  FilterSink,
  format_output
};
use crate::preset::DatePreset;
use crate::resolver::resolve_preset;
use crate::selection::RangeSelection;

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
pub enum RangeEndpoint {
  Start,
  End
}

#[derive(Debug, Clone)]
struct EditBuffer {
  preset:    Option<DatePreset>,
  selection: RangeSelection,
  view:      CalendarViewMonth,
  today:     NaiveDate
}

#[derive(Debug, Clone, Default)]
pub struct DateFilterPopover {
  committed_custom: Option<CustomRange>,
  edit:             Option<EditBuffer>
}

impl DateFilterPopover {
  pub fn new() -> Self {
    Self::default()
  }

  /// Popover that remembers a custom
  /// range confirmed in an earlier run.
  pub fn with_committed_custom(
    committed_custom: Option<CustomRange>
  ) -> Self {
    Self {
      committed_custom,
      edit: None
    }
  }

  pub fn committed_custom(
    &self
  ) -> Option<CustomRange> {
    self.committed_custom
  }

  pub fn is_open(&self) -> bool {
    self.edit.is_some()
  }

  /// The document-level outside-click
  /// listener exists exactly while open.
  pub fn listens_for_outside_clicks(
    &self
  ) -> bool {
    self.is_open()
  }

  pub fn active_preset(
    &self
  ) -> Option<DatePreset> {
    self.edit.as_ref()?.preset
  }

  pub fn selection(
    &self
  ) -> Option<&RangeSelection> {
    self.edit.as_ref().map(|e| &e.selection)
  }

  pub fn view(
    &self
  ) -> Option<CalendarViewMonth> {
    self.edit.as_ref().map(|e| e.view)
  }

  pub fn today(&self) -> Option<NaiveDate> {
    self.edit.as_ref().map(|e| e.today)
  }

  /// Opens the popover and snapshots the
  /// committed selection into a fresh
  /// edit buffer. Opening while open
  /// keeps the current buffer.
  #[tracing::instrument(skip(self))]
  pub fn open(
    &mut self,
    selected_filter: Option<DatePreset>,
    today: NaiveDate
  ) -> anyhow::Result<()> {
    if self.is_open() {
      debug!("popover already open");
      return Ok(());
    }

    let (selection, view) =
      match selected_filter {
        | Some(DatePreset::Custom) => {
          match self.committed_custom {
            | Some(range) => {
              (
                RangeSelection::from_window(
                  range.window()
                ),
                CalendarViewMonth::of(
                  range.end
                )
              )
            }
            | None => {
              (
                RangeSelection::default(),
                CalendarViewMonth::of(today)
              )
            }
          }
        }
        | Some(named) => {
          (
            RangeSelection::from_window(
              resolve_preset(named, today)?
            ),
            CalendarViewMonth::of(today)
          )
        }
        | None => {
          (
            RangeSelection::default(),
            CalendarViewMonth::of(today)
          )
        }
      };

    info!(
      preset = ?selected_filter,
      view_year = view.year(),
      view_month = view.month(),
      "opened date filter"
    );
    self.edit = Some(EditBuffer {
      preset: selected_filter,
      selection,
      view,
      today
    });
    Ok(())
  }

  /// Preset click. Named presets replace
  /// the tracked range with their
  /// resolved window; `custom` keeps
  /// whatever is tracked.
  #[tracing::instrument(skip(self))]
  pub fn select_preset(
    &mut self,
    preset: DatePreset
  ) -> anyhow::Result<bool> {
    let Some(edit) = self.edit.as_mut()
    else {
      debug!("preset ignored while closed");
      return Ok(false);
    };

    if !preset.is_custom() {
      edit.selection =
        RangeSelection::from_window(
          resolve_preset(
            preset, edit.today
          )?
        );
    }
    edit.preset = Some(preset);
    Ok(true)
  }

  /// Calendar click. Returns whether the
  /// click changed anything; disabled
  /// cells are no-ops.
  #[tracing::instrument(skip(self))]
  pub fn click_day(
    &mut self,
    pane: PaneKind,
    date: NaiveDate
  ) -> anyhow::Result<bool> {
    let Some(edit) = self.edit.as_mut()
    else {
      debug!("day click ignored while closed");
      return Ok(false);
    };

    let view = match pane {
      | PaneKind::Previous => {
        edit.view.previous()
      }
      | PaneKind::Current => edit.view
    };
    let rendered = build_pane(
      view,
      pane,
      &edit.selection,
      edit.today
    )?;
    if !rendered.is_selectable(date) {
      debug!(
        %date,
        "day is not selectable in this pane"
      );
      return Ok(false);
    }

    edit.selection.click(date);
    edit.preset = Some(DatePreset::Custom);
    Ok(true)
  }

  /// Typed day/month/year fields. A
  /// value that is not a real date is
  /// ignored without complaint.
  #[tracing::instrument(skip(self))]
  pub fn enter_date(
    &mut self,
    endpoint: RangeEndpoint,
    day: &str,
    month: &str,
    year: &str
  ) -> bool {
    let Some(edit) = self.edit.as_mut()
    else {
      return false;
    };
    let Some(date) =
      parse_date_fields(day, month, year)
    else {
      debug!("ignoring invalid typed date");
      return false;
    };

    match endpoint {
      | RangeEndpoint::Start => {
        edit.selection.set_start(date)
      }
      | RangeEndpoint::End => {
        edit.selection.set_end(date)
      }
    }
    edit.preset = Some(DatePreset::Custom);
    true
  }

  pub fn navigate_previous(
    &mut self
  ) -> bool {
    self.shift_view(-1)
  }

  pub fn navigate_next(&mut self) -> bool {
    self.shift_view(1)
  }

  fn shift_view(
    &mut self,
    months: i32
  ) -> bool {
    let Some(edit) = self.edit.as_mut()
    else {
      return false;
    };
    edit.view = edit.view.shift(months);
    debug!(
      year = edit.view.year(),
      month = edit.view.month(),
      "calendar view moved"
    );
    true
  }

  /// Previous and current month panes,
  /// or `None` while closed.
  pub fn panes(
    &self
  ) -> anyhow::Result<Option<[CalendarPane; 2]>>
  {
    let Some(edit) = self.edit.as_ref()
    else {
      return Ok(None);
    };
    build_panes(
      edit.view,
      &edit.selection,
      edit.today
    )
    .map(Some)
  }

  /// Value a confirm would emit right
  /// now, if any.
  pub fn pending_value(
    &self
  ) -> Option<EmittedFilterValue> {
    let edit = self.edit.as_ref()?;
    format_output(
      edit.preset,
      &edit.selection
    )
  }

  pub fn can_confirm(&self) -> bool {
    self.pending_value().is_some()
  }

  /// Emits the edit buffer to `sink`
  /// exactly once and closes. With an
  /// incomplete custom range nothing is
  /// emitted and the popover stays open.
  #[tracing::instrument(skip(self, sink))]
  pub fn confirm<S>(
    &mut self,
    sink: &mut S
  ) -> Option<EmittedFilterValue>
  where
    S: FilterSink + ?Sized
  {
    let Some(value) = self.pending_value()
    else {
      debug!(
        open = self.is_open(),
        "confirm is inert"
      );
      return None;
    };

    if let Some(range) = value.custom_range()
    {
      self.committed_custom = Some(*range);
    }
    self.edit = None;

    info!(
      preset = %value.preset(),
      start = ?value.custom_range().map(|r| r.start),
      end = ?value.custom_range().map(|r| r.end),
      "confirmed date filter"
    );
    value.emit_to(sink);
    Some(value)
  }

  /// Drops the edit buffer. The
  /// committed filter is untouched.
  pub fn cancel(&mut self) -> bool {
    let was_open = self.edit.take().is_some();
    if was_open {
      info!("cancelled date filter");
    }
    was_open
  }

  /// Pointer-down outside the popover
  /// behaves like cancel.
  pub fn outside_click(&mut self) -> bool {
    if !self.listens_for_outside_clicks() {
      return false;
    }
    debug!("outside click closes popover");
    self.cancel()
  }
}

fn parse_date_fields(
  day: &str,
  month: &str,
  year: &str
) -> Option<NaiveDate> {
  let day = day.trim().parse::<u32>().ok()?;
  let month =
    month.trim().parse::<u32>().ok()?;
  let year = year.trim().parse::<i32>().ok()?;
  NaiveDate::from_ymd_opt(year, month, day)
}
