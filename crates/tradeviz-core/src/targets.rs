// File: crates/tradeviz-core/src/targets.rs
// Summary: Named render targets (the page's element ids) resolved to output PNG paths.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::LoadError;

#[derive(Clone, Debug)]
pub struct RenderTargets {
    out_dir: PathBuf,
    ids: BTreeSet<String>,
}

impl RenderTargets {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into(), ids: BTreeSet::new() }
    }

    pub fn with<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Output path for `id`. A leading `#` (CSS selector form) is ignored.
    pub fn resolve(&self, id: &str) -> Result<PathBuf, LoadError> {
        let id = id.trim_start_matches('#');
        if !self.contains(id) {
            return Err(LoadError::MissingTarget(id.to_string()));
        }
        Ok(self.out_dir.join(format!("{id}.png")))
    }

    /// Output path for frame `index` of an animated target.
    pub fn resolve_frame(&self, id: &str, index: usize) -> Result<PathBuf, LoadError> {
        let id = id.trim_start_matches('#');
        if !self.contains(id) {
            return Err(LoadError::MissingTarget(id.to_string()));
        }
        Ok(self.out_dir.join(id).join(format!("frame_{index:04}.png")))
    }
}
