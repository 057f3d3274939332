use chrono::NaiveDate;
use serde::{
  Deserialize,
  Serialize
};

use crate::preset::DatePreset;
use crate::resolver::DateWindow;
use crate::selection::RangeSelection;

/// Wire format for dates handed to the
/// parent: the local calendar day, never
/// a UTC conversion of it.
pub const DATE_KEY_FORMAT: &str =
  "%Y-%m-%d";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(from = "StoredRange")]
pub struct CustomRange {
  pub start: NaiveDate,
  pub end:   NaiveDate
}

/// On-disk shape of a range. Read back
/// through [`DateWindow::new`] so a
/// hand-edited, reversed pair comes out
/// ordered.
#[derive(Deserialize)]
struct StoredRange {
  start: NaiveDate,
  end:   NaiveDate
}

impl From<StoredRange> for CustomRange {
  fn from(stored: StoredRange) -> Self {
    DateWindow::new(
      stored.start,
      stored.end
    )
    .into()
  }
}

impl CustomRange {
  pub fn start_key(&self) -> String {
    self
      .start
      .format(DATE_KEY_FORMAT)
      .to_string()
  }

  pub fn end_key(&self) -> String {
    self.end.format(DATE_KEY_FORMAT).to_string()
  }

  pub fn window(&self) -> DateWindow {
    DateWindow::new(self.start, self.end)
  }
}

impl From<DateWindow> for CustomRange {
  fn from(window: DateWindow) -> Self {
    Self {
      start: window.start,
      end:   window.end
    }
  }
}

/// Value produced by a confirm: a named
/// preset alone, or `custom` with its
/// range.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct EmittedFilterValue {
  preset:       DatePreset,
  #[serde(
    flatten,
    skip_serializing_if = "Option::is_none"
  )]
  custom_range: Option<CustomRange>
}

impl EmittedFilterValue {
  pub fn named(
    preset: DatePreset
  ) -> Option<Self> {
    (!preset.is_custom()).then_some(Self {
      preset,
      custom_range: None
    })
  }

  pub fn custom(range: CustomRange) -> Self {
    Self {
      preset:       DatePreset::Custom,
      custom_range: Some(range)
    }
  }

  pub fn preset(&self) -> DatePreset {
    self.preset
  }

  pub fn custom_range(
    &self
  ) -> Option<&CustomRange> {
    self.custom_range.as_ref()
  }

  pub fn emit_to<S>(&self, sink: &mut S)
  where
    S: FilterSink + ?Sized
  {
    sink.on_filter_change(
      self.preset,
      self.custom_range.as_ref()
    );
  }
}

/// Receiver of confirmed filter values;
/// the parent that runs the data query.
pub trait FilterSink {
  fn on_filter_change(
    &mut self,
    preset: DatePreset,
    custom_range: Option<&CustomRange>
  );
}

impl<F> FilterSink for F
where
  F: FnMut(DatePreset, Option<&CustomRange>)
{
  fn on_filter_change(
    &mut self,
    preset: DatePreset,
    custom_range: Option<&CustomRange>
  ) {
    self(preset, custom_range)
  }
}

/// Turns the edit buffer into the value
/// to emit. `None` means confirm must be
/// inert: no preset, or `custom` without
/// a start day.
pub fn format_output(
  preset: Option<DatePreset>,
  selection: &RangeSelection
) -> Option<EmittedFilterValue> {
  match preset? {
    | DatePreset::Custom => {
      let start = selection.start()?;
      let end =
        selection.end().unwrap_or(start);
      Some(EmittedFilterValue::custom(
        CustomRange { start, end }
      ))
    }
    | named => {
      EmittedFilterValue::named(named)
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    CustomRange,
    EmittedFilterValue,
    format_output
  };
  use crate::preset::DatePreset;
  use crate::selection::RangeSelection;

  fn day(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn lone_start_emits_single_day_custom_range()
   {
    let mut sel = RangeSelection::default();
    sel.click(day(2025, 3, 5));
    let value = format_output(
      Some(DatePreset::Custom),
      &sel
    )
    .expect("emitted value");
    assert_eq!(
      serde_json::to_value(&value)
        .expect("json"),
      serde_json::json!({
        "preset": "custom",
        "start": "2025-03-05",
        "end": "2025-03-05"
      })
    );
  }

  #[test]
  fn named_preset_emits_bare_keyword() {
    let mut sel = RangeSelection::default();
    sel.click(day(2025, 3, 5));
    let value = format_output(
      Some(DatePreset::LastMonth),
      &sel
    )
    .expect("emitted value");
    assert_eq!(value.custom_range(), None);
    assert_eq!(
      serde_json::to_value(&value)
        .expect("json"),
      serde_json::json!({ "preset": "lastMonth" })
    );
  }

  #[test]
  fn incomplete_custom_or_missing_preset_is_inert()
   {
    assert!(
      format_output(
        Some(DatePreset::Custom),
        &RangeSelection::default()
      )
      .is_none()
    );
    assert!(
      format_output(
        None,
        &RangeSelection::default()
      )
      .is_none()
    );
  }

  #[test]
  fn closures_act_as_sinks() {
    let mut seen = Vec::new();
    let value =
      EmittedFilterValue::custom(
        CustomRange {
          start: day(2025, 1, 2),
          end:   day(2025, 1, 9)
        }
      );
    let mut sink =
      |preset: DatePreset,
       range: Option<&CustomRange>| {
        seen.push((
          preset,
          range.map(|r| {
            (r.start_key(), r.end_key())
          })
        ));
      };
    value.emit_to(&mut sink);
    assert_eq!(
      seen,
      vec![(
        DatePreset::Custom,
        Some((
          "2025-01-02".to_string(),
          "2025-01-09".to_string()
        ))
      )]
    );
  }
}
