//! Visual ↔ physical row mapping
//!
//! [`RowOrderMap`] holds the permutation produced by the last sort pass.
//! [`RowTranslator`] is the shared handle the host registers as its row index
//! filter; it can be suppressed so the engine reads raw rows while it rebuilds
//! the map.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Permutation between visual row positions and physical row indices.
///
/// Empty means "no translation". Otherwise `value_at(v)` is the physical row
/// shown at visual position `v`, and the map covers every row `0..len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowOrderMap {
    visual_to_physical: Vec<usize>,
    physical_to_visual: Vec<usize>,
}

impl RowOrderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.visual_to_physical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visual_to_physical.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.visual_to_physical
    }

    pub fn value_at(&self, visual_row: usize) -> Option<usize> {
        self.visual_to_physical.get(visual_row).copied()
    }

    pub fn index_of(&self, physical_row: usize) -> Option<usize> {
        self.physical_to_visual.get(physical_row).copied()
    }

    /// Check that the map is a bijection on `0..len()`
    pub fn is_permutation(&self) -> bool {
        let len = self.len();
        let mut seen = vec![false; len];
        for &physical in &self.visual_to_physical {
            if physical >= len || seen[physical] {
                return false;
            }
            seen[physical] = true;
        }
        true
    }

    pub fn replace_all(&mut self, mapping: Vec<usize>) {
        self.visual_to_physical = mapping;
        self.rebuild_inverse();
        debug_assert!(self.is_permutation(), "row order map is not a permutation");
    }

    pub fn clear(&mut self) {
        self.visual_to_physical.clear();
        self.physical_to_visual.clear();
    }

    /// Make room for `count` rows inserted at physical index `at`.
    ///
    /// Every mapped value `>= at` moves up by `count`, then the new rows are
    /// placed at positions `at..at + count`, each mapping to itself.
    pub fn shift_on_insert(&mut self, at: usize, count: usize) {
        if count == 0 {
            return;
        }
        let at = at.min(self.len());
        for physical in self.visual_to_physical.iter_mut() {
            if *physical >= at {
                *physical += count;
            }
        }
        let tail = self.visual_to_physical.split_off(at);
        self.visual_to_physical.extend(at..at + count);
        self.visual_to_physical.extend(tail);
        self.rebuild_inverse();
        tracing::trace!(at, count, len = self.len(), "shifted row map for insert");
    }

    /// Drop the given physical rows and compact the remaining values.
    ///
    /// Indices outside the map are ignored.
    pub fn shift_on_remove(&mut self, removed_physical: &[usize]) {
        let len = self.len();
        let mut removed: Vec<usize> = removed_physical
            .iter()
            .copied()
            .filter(|&row| row < len)
            .collect();
        removed.sort_unstable();
        removed.dedup();
        if removed.is_empty() {
            return;
        }

        self.visual_to_physical
            .retain(|row| removed.binary_search(row).is_err());
        for physical in self.visual_to_physical.iter_mut() {
            *physical -= removed.partition_point(|&r| r < *physical);
        }
        self.rebuild_inverse();
        tracing::trace!(removed = removed.len(), len = self.len(), "shifted row map for remove");
    }

    fn rebuild_inverse(&mut self) {
        let len = self.visual_to_physical.len();
        self.physical_to_visual = vec![0; len];
        for (visual, &physical) in self.visual_to_physical.iter().enumerate() {
            if let Some(slot) = self.physical_to_visual.get_mut(physical) {
                *slot = visual;
            }
        }
    }
}

/// Who is asking for a row translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationSource {
    /// Rendering, selection, editing and every other host read
    Host,
    /// The sorting engine itself; never translated
    ColumnSorting,
}

/// Shared row translation handle.
///
/// Cloning is cheap; every clone sees the same map and suppression state.
#[derive(Debug, Clone, Default)]
pub struct RowTranslator {
    map: Arc<RwLock<RowOrderMap>>,
    suppress_depth: Arc<AtomicUsize>,
}

impl RowTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress translation until the returned guard is dropped.
    ///
    /// Guards nest; translation resumes when the last one goes away.
    pub fn suppress(&self) -> TranslationGuard {
        self.suppress_depth.fetch_add(1, AtomicOrdering::SeqCst);
        TranslationGuard {
            depth: Arc::clone(&self.suppress_depth),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppress_depth.load(AtomicOrdering::SeqCst) > 0
    }

    fn bypass(&self, source: TranslationSource) -> bool {
        source == TranslationSource::ColumnSorting || self.is_suppressed()
    }

    /// Physical row displayed at `visual_row`.
    ///
    /// Identity while nothing is sorted or translation is bypassed; `None` for
    /// rows the active map does not cover.
    pub fn visual_to_physical(&self, visual_row: usize, source: TranslationSource) -> Option<usize> {
        if self.bypass(source) {
            return Some(visual_row);
        }
        let map = self.map.read();
        if map.is_empty() {
            Some(visual_row)
        } else {
            map.value_at(visual_row)
        }
    }

    /// Visual position of `physical_row`
    pub fn physical_to_visual(
        &self,
        physical_row: usize,
        source: TranslationSource,
    ) -> Option<usize> {
        if self.bypass(source) {
            return Some(physical_row);
        }
        let map = self.map.read();
        if map.is_empty() {
            Some(physical_row)
        } else {
            map.index_of(physical_row)
        }
    }

    /// Copy of the current visual → physical mapping
    pub fn mapping(&self) -> Vec<usize> {
        self.map.read().as_slice().to_vec()
    }

    pub fn is_active(&self) -> bool {
        !self.map.read().is_empty()
    }

    pub(crate) fn read<T>(&self, f: impl FnOnce(&RowOrderMap) -> T) -> T {
        f(&self.map.read())
    }

    pub(crate) fn update<T>(&self, f: impl FnOnce(&mut RowOrderMap) -> T) -> T {
        f(&mut self.map.write())
    }
}

/// Keeps row translation suppressed while alive
#[derive(Debug)]
#[must_use = "translation resumes as soon as the guard is dropped"]
pub struct TranslationGuard {
    depth: Arc<AtomicUsize>,
}

impl Drop for TranslationGuard {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, AtomicOrdering::SeqCst);
    }
}
