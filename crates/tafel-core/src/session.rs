//! Scripted popover sessions: one user
//! action per line, replayed against a
//! [`DateFilterPopover`].
//!
//! ```text
//! open
//! click current 2025-06-10
//! click prev 2025-05-28
//! confirm
//! ```

use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::calendar::PaneKind;
use crate::clock::Clock;
use crate::output::EmittedFilterValue;
use crate::popover::{DateFilterPopover, RangeEndpoint};
use crate::preset::DatePreset;
use crate::render::Renderer;
use crate::store::{FilterStore, StoreSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStep {
    Open,
    Preset(DatePreset),
    Click(PaneKind, NaiveDate),
    Type {
        endpoint: RangeEndpoint,
        day: String,
        month: String,
        year: String,
    },
    Previous,
    Next,
    Confirm,
    Cancel,
    Outside,
    Render,
    Status,
}

impl FromStr for SessionStep {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let step = match words.as_slice() {
            ["open"] => SessionStep::Open,
            ["preset", keyword] => SessionStep::Preset(keyword.parse()?),
            ["click", pane, date] => {
                let pane = match pane.to_ascii_lowercase().as_str() {
                    "prev" | "previous" | "left" => PaneKind::Previous,
                    "current" | "right" => PaneKind::Current,
                    other => return Err(anyhow!("unknown pane: {other}")),
                };
                let date = NaiveDate::from_str(date)
                    .with_context(|| format!("invalid date: {date}"))?;
                SessionStep::Click(pane, date)
            }
            ["type", endpoint, day, month, year] => {
                let endpoint = match endpoint.to_ascii_lowercase().as_str() {
                    "start" => RangeEndpoint::Start,
                    "end" => RangeEndpoint::End,
                    other => return Err(anyhow!("unknown endpoint: {other}")),
                };
                SessionStep::Type {
                    endpoint,
                    day: day.to_string(),
                    month: month.to_string(),
                    year: year.to_string(),
                }
            }
            ["prev"] | ["previous"] => SessionStep::Previous,
            ["next"] => SessionStep::Next,
            ["confirm"] => SessionStep::Confirm,
            ["cancel"] => SessionStep::Cancel,
            ["outside"] => SessionStep::Outside,
            ["render"] => SessionStep::Render,
            ["status"] => SessionStep::Status,
            _ => return Err(anyhow!("unrecognized session step: {line}")),
        };
        Ok(step)
    }
}

/// Parses a script, skipping blank lines and `#` comments.
pub fn parse_script(script: &str) -> anyhow::Result<Vec<SessionStep>> {
    let mut steps = Vec::new();
    for (line_num, raw_line) in script.lines().enumerate() {
        let line = match raw_line.split_once('#') {
            Some((before, _)) => before.trim(),
            None => raw_line.trim(),
        };
        if line.is_empty() {
            continue;
        }
        let step = line
            .parse::<SessionStep>()
            .with_context(|| format!("line {}", line_num + 1))?;
        steps.push(step);
    }
    Ok(steps)
}

#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub steps: usize,
    pub emitted: Vec<EmittedFilterValue>,
}

/// Replays `steps`. Confirms are handed to the store; render and status
/// steps write to `out`.
#[tracing::instrument(skip_all, fields(steps = steps.len()))]
pub fn run_session<W: Write>(
    steps: &[SessionStep],
    store: &dyn FilterStore,
    clock: &dyn Clock,
    renderer: &Renderer,
    json: bool,
    out: &mut W,
) -> anyhow::Result<SessionSummary> {
    let committed = store.load()?;
    let mut popover = DateFilterPopover::with_committed_custom(committed.custom_range);
    let mut summary = SessionSummary::default();

    for step in steps {
        debug!(?step, "session step");
        summary.steps += 1;
        match step {
            SessionStep::Open => {
                let committed = store.load()?;
                popover.open(committed.preset, clock.today())?;
            }
            SessionStep::Preset(preset) => {
                popover.select_preset(*preset)?;
            }
            SessionStep::Click(pane, date) => {
                popover.click_day(*pane, *date)?;
            }
            SessionStep::Type {
                endpoint,
                day,
                month,
                year,
            } => {
                popover.enter_date(*endpoint, day, month, year);
            }
            SessionStep::Previous => {
                popover.navigate_previous();
            }
            SessionStep::Next => {
                popover.navigate_next();
            }
            SessionStep::Confirm => {
                let mut sink = StoreSink::new(store)?;
                let emitted = popover.confirm(&mut sink);
                sink.finish()?;
                if let Some(value) = emitted {
                    renderer.write_emitted(out, &value)?;
                    summary.emitted.push(value);
                }
            }
            SessionStep::Cancel => {
                popover.cancel();
            }
            SessionStep::Outside => {
                popover.outside_click();
            }
            SessionStep::Render => {
                if json {
                    let panes = popover.panes()?;
                    writeln!(out, "{}", serde_json::to_string_pretty(&panes)?)?;
                } else {
                    renderer.write_popover(out, &popover)?;
                }
            }
            SessionStep::Status => {
                renderer.write_committed(out, &store.load()?, clock.today())?;
            }
        }
    }

    info!(
        steps = summary.steps,
        emitted = summary.emitted.len(),
        "session finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{SessionStep, parse_script, run_session};
    use crate::calendar::PaneKind;
    use crate::clock::FixedClock;
    use crate::i18n::Language;
    use crate::preset::DatePreset;
    use crate::render::Renderer;
    use crate::store::{CommittedFilter, FilterStore, MemoryFilterStore};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parses_steps_and_skips_comments() {
        let steps = parse_script(
            "# pick last two weeks\nopen\n\nclick current 2025-06-04  # start\nprev\n",
        )
        .expect("parse");
        assert_eq!(
            steps,
            vec![
                SessionStep::Open,
                SessionStep::Click(PaneKind::Current, day(2025, 6, 4)),
                SessionStep::Previous,
            ]
        );
    }

    #[test]
    fn reports_the_bad_line() {
        let err = parse_script("open\nclick sideways 2025-06-04").expect_err("bad pane");
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn confirmed_custom_range_is_committed() {
        let store = MemoryFilterStore::default();
        let clock = FixedClock(day(2025, 6, 18));
        let renderer = Renderer::plain(Language::En);
        let steps = parse_script(
            "open\nclick current 2025-06-12\nclick prev 2025-05-30\nconfirm\n",
        )
        .expect("parse");

        let mut out = Vec::new();
        let summary =
            run_session(&steps, &store, &clock, &renderer, false, &mut out).expect("session");

        assert_eq!(summary.emitted.len(), 1);
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text.trim(),
            r#"{"preset":"custom","start":"2025-05-30","end":"2025-06-12"}"#
        );
        let committed = store.load().expect("load");
        assert_eq!(committed.preset, Some(DatePreset::Custom));
    }

    #[test]
    fn cancelled_session_leaves_store_alone() {
        let initial = CommittedFilter {
            preset: Some(DatePreset::LastMonth),
            custom_range: None,
        };
        let store = MemoryFilterStore::new(initial);
        let clock = FixedClock(day(2025, 6, 18));
        let renderer = Renderer::plain(Language::En);
        let steps = parse_script("open\nclick current 2025-06-02\ncancel\nopen\nconfirm\n")
            .expect("parse");

        let mut out = Vec::new();
        let summary =
            run_session(&steps, &store, &clock, &renderer, false, &mut out).expect("session");

        assert_eq!(summary.emitted.len(), 1);
        assert_eq!(summary.emitted[0].preset(), DatePreset::LastMonth);
        assert_eq!(store.load().expect("load"), initial);
    }
}
