use chrono::NaiveDate;

use crate::resolver::DateWindow;

/// Progress of a two-click range pick.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum SelectionState {
  Empty,
  OneSelected,
  TwoSelected
}

/// Range tracked while the popover is
/// open. `end` is only ever set together
/// with an earlier-or-equal `start`.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub struct RangeSelection {
  start: Option<NaiveDate>,
  end:   Option<NaiveDate>
}

impl RangeSelection {
  pub fn from_window(
    window: DateWindow
  ) -> Self {
    Self {
      start: Some(window.start),
      end:   Some(window.end)
    }
  }

  pub fn start(&self) -> Option<NaiveDate> {
    self.start
  }

  pub fn end(&self) -> Option<NaiveDate> {
    self.end
  }

  pub fn state(&self) -> SelectionState {
    match (self.start, self.end) {
      | (None, _) => SelectionState::Empty,
      | (Some(_), None) => {
        SelectionState::OneSelected
      }
      | (Some(_), Some(_)) => {
        SelectionState::TwoSelected
      }
    }
  }

  /// Applies a day click. After a full
  /// range the next click starts over.
  pub fn click(&mut self, day: NaiveDate) {
    match (self.start, self.end) {
      | (Some(start), None) => {
        if day < start {
          self.start = Some(day);
          self.end = Some(start);
        } else {
          self.end = Some(day);
        }
      }
      | _ => {
        self.start = Some(day);
        self.end = None;
      }
    }
    tracing::trace!(
      start = ?self.start,
      end = ?self.end,
      "range selection updated"
    );
  }

  /// Sets `start` directly, keeping the
  /// pair ordered.
  pub fn set_start(
    &mut self,
    day: NaiveDate
  ) {
    match self.end {
      | Some(end) if day > end => {
        self.start = Some(end);
        self.end = Some(day);
      }
      | _ => self.start = Some(day)
    }
  }

  /// Sets `end` directly. Without a
  /// start the day becomes a lone start.
  pub fn set_end(&mut self, day: NaiveDate) {
    match self.start {
      | None => {
        self.start = Some(day);
        self.end = None;
      }
      | Some(start) if day < start => {
        self.start = Some(day);
        self.end = Some(start);
      }
      | Some(_) => self.end = Some(day)
    }
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }

  pub fn is_selected(
    &self,
    day: NaiveDate
  ) -> bool {
    match (self.start, self.end) {
      | (Some(start), None) => {
        day == start
      }
      | (Some(start), Some(end)) => {
        start <= day && day <= end
      }
      | (None, _) => false
    }
  }

  /// Window for the current pick; a lone
  /// start counts as a single day.
  pub fn window(&self) -> Option<DateWindow> {
    self.start.map(|start| {
      DateWindow::new(
        start,
        self.end.unwrap_or(start)
      )
    })
  }
}
