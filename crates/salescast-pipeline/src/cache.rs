//! Shared, read-mostly cache of the parsed sales table.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use salescast_core::{DatasetProfile, PipelineError, SalesTable};

use crate::loader::load_sales_table;

/// When a cached table is considered stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Keep the table until [`TableCache::invalidate`] is called.
    Never,
    /// Reload on the first access after this age.
    MaxAge(Duration),
}

impl CachePolicy {
    /// `0` means never expire.
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        if secs == 0 {
            Self::Never
        } else {
            Self::MaxAge(Duration::from_secs(secs))
        }
    }
}

type Loader = Box<dyn Fn() -> Result<SalesTable, PipelineError> + Send + Sync>;

struct Entry {
    table: Arc<SalesTable>,
    loaded_at: Instant,
}

/// Parses the source file on first use and hands out the same immutable
/// table to every request until it expires or is invalidated.
///
/// Two requests racing on an empty cache may both load; the later write
/// wins and both see a complete table.
pub struct TableCache {
    loader: Loader,
    policy: CachePolicy,
    entry: RwLock<Option<Entry>>,
}

impl std::fmt::Debug for TableCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableCache")
            .field("policy", &self.policy)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl TableCache {
    /// Cache backed by the CSV file at `path`.
    #[must_use]
    pub fn for_file(path: PathBuf, profile: DatasetProfile, policy: CachePolicy) -> Self {
        Self::with_loader(move || load_sales_table(&path, &profile), policy)
    }

    #[must_use]
    pub fn with_loader<F>(loader: F, policy: CachePolicy) -> Self
    where
        F: Fn() -> Result<SalesTable, PipelineError> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            policy,
            entry: RwLock::new(None),
        }
    }

    /// Current table, loading it if absent or stale.
    ///
    /// # Errors
    ///
    /// Propagates the loader's error; a failed load leaves the cache empty.
    pub fn get(&self) -> Result<Arc<SalesTable>, PipelineError> {
        {
            let guard = self.entry.read().map_err(|_| poisoned())?;
            if let Some(entry) = guard.as_ref() {
                if self.is_fresh(entry) {
                    return Ok(Arc::clone(&entry.table));
                }
            }
        }

        let table = Arc::new((self.loader)()?);
        let mut guard = self.entry.write().map_err(|_| poisoned())?;
        *guard = Some(Entry {
            table: Arc::clone(&table),
            loaded_at: Instant::now(),
        });
        tracing::debug!(rows = table.len(), "sales table cached");
        Ok(table)
    }

    /// Drop the cached table; the next [`get`](Self::get) reloads it.
    pub fn invalidate(&self) {
        match self.entry.write() {
            Ok(mut guard) => *guard = None,
            Err(poison) => *poison.into_inner() = None,
        }
        tracing::info!("sales table cache invalidated");
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.entry
            .read()
            .map(|guard| guard.as_ref().is_some_and(|e| self.is_fresh(e)))
            .unwrap_or(false)
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        match self.policy {
            CachePolicy::Never => true,
            CachePolicy::MaxAge(max_age) => entry.loaded_at.elapsed() < max_age,
        }
    }
}

fn poisoned() -> PipelineError {
    PipelineError::DataUnavailable("sales table cache lock poisoned".to_string())
}
