use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::output::{CustomRange, EmittedFilterValue, FilterSink};
use crate::preset::DatePreset;
use crate::resolver::{DateWindow, resolve_preset};

/// The parent's committed filter. The custom range outlives a switch to a
/// named preset so that reopening on `custom` can restore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedFilter {
    #[serde(default)]
    pub preset: Option<DatePreset>,
    #[serde(default)]
    pub custom_range: Option<CustomRange>,
}

impl CommittedFilter {
    pub fn apply(&mut self, value: &EmittedFilterValue) {
        self.record(value.preset(), value.custom_range());
    }

    fn record(&mut self, preset: DatePreset, custom_range: Option<&CustomRange>) {
        self.preset = Some(preset);
        if let Some(range) = custom_range {
            self.custom_range = Some(*range);
        }
    }

    /// Concrete window the parent should query for, if a filter is set.
    pub fn window(&self, today: NaiveDate) -> anyhow::Result<Option<DateWindow>> {
        match self.preset {
            None => Ok(None),
            Some(DatePreset::Custom) => Ok(self.custom_range.map(|range| range.window())),
            Some(named) => resolve_preset(named, today).map(Some),
        }
    }
}

/// Where the parent keeps its committed filter between popover sessions.
pub trait FilterStore {
    fn load(&self) -> anyhow::Result<CommittedFilter>;
    fn save(&self, filter: &CommittedFilter) -> anyhow::Result<()>;
}

/// The parent side of a confirm: every emitted value is folded into the
/// committed filter and saved. A failed save is held until [`StoreSink::finish`].
pub struct StoreSink<'a> {
    store: &'a dyn FilterStore,
    committed: CommittedFilter,
    emitted: usize,
    error: Option<anyhow::Error>,
}

impl<'a> StoreSink<'a> {
    pub fn new(store: &'a dyn FilterStore) -> anyhow::Result<Self> {
        Ok(Self {
            committed: store.load()?,
            store,
            emitted: 0,
            error: None,
        })
    }

    pub fn committed(&self) -> CommittedFilter {
        self.committed
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn finish(self) -> anyhow::Result<CommittedFilter> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.committed),
        }
    }
}

impl FilterSink for StoreSink<'_> {
    fn on_filter_change(&mut self, preset: DatePreset, custom_range: Option<&CustomRange>) {
        self.emitted += 1;
        self.committed.record(preset, custom_range);
        if let Err(err) = self.store.save(&self.committed) {
            warn!(error = %err, "failed to save committed filter");
            self.error.get_or_insert(err);
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryFilterStore {
    inner: RefCell<CommittedFilter>,
}

impl MemoryFilterStore {
    pub fn new(initial: CommittedFilter) -> Self {
        Self {
            inner: RefCell::new(initial),
        }
    }
}

impl FilterStore for MemoryFilterStore {
    fn load(&self) -> anyhow::Result<CommittedFilter> {
        Ok(*self.inner.borrow())
    }

    fn save(&self, filter: &CommittedFilter) -> anyhow::Result<()> {
        *self.inner.borrow_mut() = *filter;
        Ok(())
    }
}

/// Committed filter kept as one JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFilterStore {
    pub path: PathBuf,
}

impl JsonFilterStore {
    #[tracing::instrument(skip(path))]
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let path = path.to_path_buf();
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        info!(file = %path.display(), "opened filter store");
        Ok(Self { path })
    }
}

impl FilterStore for JsonFilterStore {
    #[tracing::instrument(skip(self), fields(file = %self.path.display()))]
    fn load(&self) -> anyhow::Result<CommittedFilter> {
        if !self.path.exists() {
            debug!("no committed filter yet");
            return Ok(CommittedFilter::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(CommittedFilter::default());
        }

        let filter: CommittedFilter = serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing {}", self.path.display()))?;
        debug!(preset = ?filter.preset, "loaded committed filter");
        Ok(filter)
    }

    #[tracing::instrument(skip(self, filter), fields(file = %self.path.display()))]
    fn save(&self, filter: &CommittedFilter) -> anyhow::Result<()> {
        debug!(preset = ?filter.preset, "saving committed filter atomically");

        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        let serialized = serde_json::to_string_pretty(filter)?;
        writeln!(temp, "{serialized}")?;
        temp.flush()?;

        temp.persist(&self.path)
            .map_err(|err| anyhow!("failed to persist {}: {}", self.path.display(), err))?;
        Ok(())
    }
}
