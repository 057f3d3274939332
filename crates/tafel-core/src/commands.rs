use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, anyhow};
use tracing::info;

use crate::calendar::{CalendarViewMonth, month_grid};
use crate::cli::Command;
use crate::clock::Clock;
use crate::output::{CustomRange, EmittedFilterValue};
use crate::popover::DateFilterPopover;
use crate::preset::DatePreset;
use crate::render::Renderer;
use crate::resolver::{DateWindow, resolve_custom, resolve_preset};
use crate::session::{parse_script, run_session};
use crate::store::{FilterStore, StoreSink};

/// Everything a command needs, built once in [`crate::run`].
pub struct CommandContext<'a> {
    pub store: &'a dyn FilterStore,
    pub clock: &'a dyn Clock,
    pub renderer: &'a Renderer,
    pub json: bool,
}

#[tracing::instrument(skip(ctx, out))]
pub fn dispatch<W: Write>(ctx: &CommandContext<'_>, command: Command, out: &mut W) -> anyhow::Result<()> {
    match command {
        Command::Resolve { preset, start, end } => {
            let window = window_for(preset, start, end, ctx.clock)?;
            if ctx.json {
                writeln!(out, "{}", serde_json::to_string(&window)?)?;
            } else {
                ctx.renderer.write_window(out, preset, &window)?;
            }
        }
        Command::Grid { year, month } => {
            let view = CalendarViewMonth::new(year, month - 1)?;
            let grid = month_grid(view.year(), view.month0())?;
            if ctx.json {
                writeln!(out, "{}", serde_json::to_string(&grid.to_vec())?)?;
            } else {
                ctx.renderer.write_grid(out, view, &grid)?;
            }
        }
        Command::Show => {
            let committed = ctx.store.load()?;
            let mut popover = DateFilterPopover::with_committed_custom(committed.custom_range);
            popover.open(committed.preset, ctx.clock.today())?;
            if ctx.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&popover.panes()?)?)?;
            } else {
                ctx.renderer.write_popover(out, &popover)?;
            }
        }
        Command::Status => {
            let committed = ctx.store.load()?;
            if ctx.json {
                writeln!(out, "{}", serde_json::to_string(&committed)?)?;
            } else {
                ctx.renderer
                    .write_committed(out, &committed, ctx.clock.today())?;
            }
        }
        Command::Set { preset, start, end } => {
            let value = match preset {
                DatePreset::Custom => {
                    let start = start.ok_or_else(|| anyhow!("custom filter needs --start"))?;
                    EmittedFilterValue::custom(CustomRange::from(resolve_custom(start, end)))
                }
                named => EmittedFilterValue::named(named)
                    .ok_or_else(|| anyhow!("{named} is not a named preset"))?,
            };
            let mut sink = StoreSink::new(ctx.store)?;
            value.emit_to(&mut sink);
            let committed = sink.finish()?;
            info!(preset = ?committed.preset, "committed filter");
            ctx.renderer.write_emitted(out, &value)?;
        }
        Command::Session { script } => {
            let text = match script {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read session script from stdin")?;
                    buf
                }
            };
            let steps = parse_script(&text)?;
            run_session(&steps, ctx.store, ctx.clock, ctx.renderer, ctx.json, out)?;
        }
    }

    Ok(())
}

fn window_for(
    preset: DatePreset,
    start: Option<chrono::NaiveDate>,
    end: Option<chrono::NaiveDate>,
    clock: &dyn Clock,
) -> anyhow::Result<DateWindow> {
    match preset {
        DatePreset::Custom => {
            let start = start.ok_or_else(|| anyhow!("custom window needs --start"))?;
            Ok(resolve_custom(start, end))
        }
        named => resolve_preset(named, clock.today()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{CommandContext, dispatch};
    use crate::cli::Command;
    use crate::clock::FixedClock;
    use crate::i18n::Language;
    use crate::preset::DatePreset;
    use crate::render::Renderer;
    use crate::store::{FilterStore, MemoryFilterStore};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn run(store: &MemoryFilterStore, command: Command, json: bool) -> String {
        let clock = FixedClock(day(2025, 8, 20));
        let renderer = Renderer::plain(Language::En);
        let ctx = CommandContext {
            store,
            clock: &clock,
            renderer: &renderer,
            json,
        };
        let mut out = Vec::new();
        dispatch(&ctx, command, &mut out).expect("dispatch");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn resolve_prints_window_as_json() {
        let store = MemoryFilterStore::default();
        let text = run(
            &store,
            Command::Resolve {
                preset: DatePreset::QuarterToDate,
                start: None,
                end: None,
            },
            true,
        );
        assert_eq!(text.trim(), r#"{"start":"2025-07-01","end":"2025-08-20"}"#);
    }

    #[test]
    fn set_custom_without_end_commits_single_day() {
        let store = MemoryFilterStore::default();
        let text = run(
            &store,
            Command::Set {
                preset: DatePreset::Custom,
                start: Some(day(2025, 3, 5)),
                end: None,
            },
            false,
        );
        assert_eq!(
            text.trim(),
            r#"{"preset":"custom","start":"2025-03-05","end":"2025-03-05"}"#
        );
        let committed = store.load().expect("load");
        assert_eq!(committed.preset, Some(DatePreset::Custom));
    }

    #[test]
    fn status_shows_trigger_label_and_window() {
        let store = MemoryFilterStore::default();
        run(
            &store,
            Command::Set {
                preset: DatePreset::LastQuarter,
                start: None,
                end: None,
            },
            false,
        );
        let text = run(&store, Command::Status, false);
        assert!(text.contains("Date range: Last quarter"));
        assert!(text.contains("2025-04-01 .. 2025-06-30"));
    }
}
