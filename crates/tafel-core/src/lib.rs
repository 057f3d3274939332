pub mod calendar;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod i18n;
pub mod output;
pub mod popover;
pub mod preset;
pub mod render;
pub mod resolver;
pub mod selection;
pub mod session;
pub mod store;

use std::ffi::OsString;
use std::io;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use calendar::{
  CalendarCell,
  CalendarPane,
  CalendarViewMonth,
  PaneKind,
  month_grid
};
pub use output::{
  CustomRange,
  EmittedFilterValue,
  FilterSink,
  format_output
};
pub use popover::{
  DateFilterPopover,
  RangeEndpoint
};
pub use preset::DatePreset;
pub use resolver::{
  DateWindow,
  resolve_custom,
  resolve_preset
};
pub use selection::{
  RangeSelection,
  SelectionState
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting tafel CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  )?;

  let timezone = cfg.timezone();
  let system_clock =
    clock::SystemClock::new(timezone);
  let fixed_clock =
    cli.today.map(clock::FixedClock);
  let clock: &dyn clock::Clock =
    match fixed_clock.as_ref() {
      | Some(fixed) => fixed,
      | None => &system_clock
    };
  info!(
    timezone = %timezone,
    today = %clock.today(),
    language = %cfg.language,
    "resolved clock"
  );

  let state_file = cfg
    .resolve_state_file(
      cli.state.as_deref()
    )
    .context(
      "failed to resolve state file"
    )?;
  let store =
    store::JsonFilterStore::open(
      &state_file
    )
    .with_context(|| {
      format!(
        "failed to open filter store at \
         {}",
        state_file.display()
      )
    })?;

  let renderer =
    render::Renderer::new(&cfg);
  let ctx = commands::CommandContext {
    store: &store,
    clock,
    renderer: &renderer,
    json: cli.json
  };

  let mut out = io::stdout().lock();
  commands::dispatch(
    &ctx,
    cli.command,
    &mut out
  )?;

  info!("done");
  Ok(())
}
