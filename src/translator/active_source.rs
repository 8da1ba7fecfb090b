use std::sync::{Arc, RwLock};

/// Supplies the table/collection used when a request names none.
///
/// The translator only reads through this trait; whoever ingests data owns
/// the writes.
pub trait ActiveSource: Send + Sync {
    fn resolve_active_source(&self) -> Option<String>;
}

/// Shared handle to the most recently ingested table or collection.
///
/// Clones share the same cell. Writes replace the whole name under the
/// lock, so a concurrent reader sees either the old or the new value.
#[derive(Debug, Clone, Default)]
pub struct SharedActiveSource {
    cell: Arc<RwLock<Option<String>>>,
}

impl SharedActiveSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(name: &str) -> Self {
        let source = Self::new();
        source.set(name);
        source
    }

    /// Record `name` as the active source. Last writer wins.
    pub fn set(&self, name: &str) {
        match self.cell.write() {
            Ok(mut guard) => *guard = Some(name.to_string()),
            Err(poisoned) => *poisoned.into_inner() = Some(name.to_string()),
        }
        tracing::debug!(source = name, "active source updated");
    }

    pub fn clear(&self) {
        match self.cell.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

impl ActiveSource for SharedActiveSource {
    fn resolve_active_source(&self) -> Option<String> {
        let guard = self.cell.read().ok()?;
        guard.clone()
    }
}

/// Fixed source, handy for tests and single-table callers.
impl ActiveSource for Option<String> {
    fn resolve_active_source(&self) -> Option<String> {
        self.clone()
    }
}

/// Nothing has been ingested.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoActiveSource;

impl ActiveSource for NoActiveSource {
    fn resolve_active_source(&self) -> Option<String> {
        None
    }
}
