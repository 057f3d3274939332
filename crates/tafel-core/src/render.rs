use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::{Datelike, NaiveDate};
use unicode_width::UnicodeWidthStr;

use crate::calendar::{CalendarCell, CalendarPane, CalendarViewMonth, GRID_CELLS, PaneKind};
use crate::config::Config;
use crate::i18n::{Language, TextKey, format_date, month_title, translate, weekday_labels};
use crate::output::EmittedFilterValue;
use crate::popover::DateFilterPopover;
use crate::preset::DatePreset;
use crate::resolver::DateWindow;
use crate::store::CommittedFilter;

const CELL_WIDTH: usize = 4;
const PANE_WIDTH: usize = CELL_WIDTH * 7;
const PANE_GAP: &str = "   ";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    language: Language,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: cfg.color && io::stdout().is_terminal(),
            language: cfg.language,
        }
    }

    /// Renderer without ANSI escapes, for tests and piped output.
    pub fn plain(language: Language) -> Self {
        Self {
            color: false,
            language,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Short text for the filter's trigger button.
    pub fn trigger_label(&self, filter: &CommittedFilter) -> String {
        match (filter.preset, filter.custom_range) {
            (None, _) | (Some(DatePreset::Custom), None) => {
                translate(self.language, TextKey::NoSelection).to_string()
            }
            (Some(DatePreset::Custom), Some(range)) => format!(
                "{} - {}",
                format_date(self.language, range.start),
                format_date(self.language, range.end)
            ),
            (Some(named), _) => translate(self.language, TextKey::Preset(named)).to_string(),
        }
    }

    #[tracing::instrument(skip(self, out, window))]
    pub fn write_window<W: Write>(
        &self,
        out: &mut W,
        preset: DatePreset,
        window: &DateWindow,
    ) -> anyhow::Result<()> {
        writeln!(
            out,
            "{:<16} {} .. {} ({} days)",
            translate(self.language, TextKey::Preset(preset)),
            window.start.format("%Y-%m-%d"),
            window.end.format("%Y-%m-%d"),
            window.len_days()
        )?;
        Ok(())
    }

    #[tracing::instrument(skip(self, out, grid))]
    pub fn write_grid<W: Write>(
        &self,
        out: &mut W,
        view: CalendarViewMonth,
        grid: &[NaiveDate; GRID_CELLS],
    ) -> anyhow::Result<()> {
        writeln!(out, "{}", center(&month_title(self.language, view), PANE_WIDTH))?;
        writeln!(out, "{}", self.weekday_header())?;
        for week in grid.chunks(7) {
            let line: String = week
                .iter()
                .map(|date| {
                    let text = format!("{:>3} ", date.day());
                    if view.contains(*date) {
                        text
                    } else {
                        self.paint(&text, "2")
                    }
                })
                .collect();
            writeln!(out, "{}", line.trim_end())?;
        }
        Ok(())
    }

    pub fn write_committed<W: Write>(
        &self,
        out: &mut W,
        filter: &CommittedFilter,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        writeln!(
            out,
            "{}: {}",
            translate(self.language, TextKey::FilterTitle),
            self.trigger_label(filter)
        )?;
        if let Some(window) = filter.window(today)? {
            writeln!(
                out,
                "{} .. {}",
                window.start.format("%Y-%m-%d"),
                window.end.format("%Y-%m-%d")
            )?;
        }
        Ok(())
    }

    pub fn write_emitted<W: Write>(
        &self,
        out: &mut W,
        value: &EmittedFilterValue,
    ) -> anyhow::Result<()> {
        writeln!(out, "{}", serde_json::to_string(value)?)?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn write_popover<W: Write>(
        &self,
        out: &mut W,
        popover: &DateFilterPopover,
    ) -> anyhow::Result<()> {
        let Some([previous, current]) = popover.panes()? else {
            return Err(anyhow!("date filter is not open"));
        };
        let active = popover.active_preset();

        writeln!(out, "{}", translate(self.language, TextKey::FilterTitle))?;
        for preset in DatePreset::NAMED.into_iter().chain([DatePreset::Custom]) {
            let marker = if active == Some(preset) { "(*)" } else { "( )" };
            writeln!(
                out,
                "  {marker} {}",
                translate(self.language, TextKey::Preset(preset))
            )?;
        }
        writeln!(out)?;

        let previous_label = translate(self.language, TextKey::PreviousMonth);
        let next_label = translate(self.language, TextKey::NextMonth);
        let padding = (PANE_WIDTH * 2 + PANE_GAP.len()).saturating_sub(
            4 + UnicodeWidthStr::width(previous_label) + UnicodeWidthStr::width(next_label),
        );
        let nav = format!("< {previous_label}{}{next_label} >", " ".repeat(padding));
        writeln!(out, "{nav}")?;
        writeln!(
            out,
            "{}{PANE_GAP}{}",
            center(&previous.title(self.language), PANE_WIDTH),
            center(&current.title(self.language), PANE_WIDTH)
        )?;
        let header = self.weekday_header();
        writeln!(out, "{header}{PANE_GAP}{header}")?;

        let left: Vec<String> = previous.weeks().map(|w| self.pane_row(&previous, w)).collect();
        let right: Vec<String> = current.weeks().map(|w| self.pane_row(&current, w)).collect();
        for (l, r) in left.iter().zip(right.iter()) {
            writeln!(out, "{l}{PANE_GAP}{}", r.trim_end())?;
        }
        writeln!(out)?;

        let selection = popover.selection().copied().unwrap_or_default();
        let show = |date: Option<NaiveDate>| {
            date.map(|d| format_date(self.language, d))
                .unwrap_or_else(|| "-".to_string())
        };
        writeln!(
            out,
            "{}: {}   {}: {}",
            translate(self.language, TextKey::StartDate),
            show(selection.start()),
            translate(self.language, TextKey::EndDate),
            show(selection.end())
        )?;

        let confirm = translate(self.language, TextKey::Confirm);
        let confirm = if popover.can_confirm() {
            format!("[{confirm}]")
        } else {
            self.paint(&format!("({confirm})"), "2")
        };
        writeln!(
            out,
            "[{}] {confirm}",
            translate(self.language, TextKey::Cancel)
        )?;
        Ok(())
    }

    fn weekday_header(&self) -> String {
        weekday_labels(self.language)
            .iter()
            .map(|label| format!("{label:>3} "))
            .collect()
    }

    fn pane_row(&self, pane: &CalendarPane, week: &[CalendarCell]) -> String {
        week.iter()
            .map(|cell| {
                if !cell.in_displayed_month {
                    return " ".repeat(CELL_WIDTH);
                }
                let disabled = pane.kind == PaneKind::Current && cell.is_future;
                let day = cell.date.day();
                if cell.is_selected {
                    self.paint(&format!("[{day:>2}]"), "7")
                } else if cell.is_today {
                    self.paint(&format!("<{day:>2}>"), "4")
                } else if disabled {
                    if self.color {
                        self.paint(&format!(" {day:>2} "), "2")
                    } else {
                        format!(" {day:>2}~")
                    }
                } else {
                    format!(" {day:>2} ")
                }
            })
            .collect()
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn center(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(text);
    let total = width.saturating_sub(visible);
    let left = total / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(total - left))
}
