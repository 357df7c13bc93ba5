//! Common test utilities and mocks

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use zqlz_column_sorting::{
    CellValue, ColumnSortConfig, ColumnSortOverrides, GridHost, PersistedSortState, RowTranslator,
    SortObserver, SortStateStore, TranslationSource,
};

/// In-memory grid standing in for a real table view.
///
/// Rows are stored in physical order with physical columns. Visual columns map
/// through `column_order`. Once a translator is attached, cell reads go
/// through it the way a real grid's row index filter would.
pub struct MockGrid {
    rows: Vec<Vec<CellValue>>,
    /// `column_order[visual] = physical`
    column_order: Vec<usize>,
    spare_rows: usize,
    max_rows: usize,
    meta: BTreeMap<usize, ColumnSortOverrides>,
    translator: Option<RowTranslator>,
    /// Visual column whose physical lookup fails
    unmapped_visual: Option<usize>,
    /// Physical column whose visual lookup fails
    unplaced_physical: Option<usize>,
    pub render_count: Arc<Mutex<usize>>,
    /// `(row, translated)` for every cell read made while a translator is attached
    pub read_log: Arc<Mutex<Vec<(usize, Option<usize>)>>>,
}

impl MockGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        let column_count = rows.first().map(|r| r.len()).unwrap_or(0);
        Self {
            rows,
            column_order: (0..column_count).collect(),
            spare_rows: 0,
            max_rows: usize::MAX,
            meta: BTreeMap::new(),
            translator: None,
            unmapped_visual: None,
            unplaced_physical: None,
            render_count: Arc::new(Mutex::new(0)),
            read_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// One column of values, one row per value
    pub fn single_column<V: Into<CellValue>>(values: Vec<V>) -> Self {
        let mut grid = Self::new(values.into_iter().map(|v| vec![v.into()]).collect());
        grid.column_order = vec![0];
        grid
    }

    pub fn with_spare_rows(mut self, spare_rows: usize) -> Self {
        self.spare_rows = spare_rows;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_column_meta(mut self, physical_column: usize, meta: ColumnSortOverrides) -> Self {
        self.meta.insert(physical_column, meta);
        self
    }

    pub fn attach(&mut self, translator: RowTranslator) {
        self.translator = Some(translator);
    }

    /// Make `to_physical_column(visual_column)` return `None`
    pub fn break_physical_lookup(&mut self, visual_column: usize) {
        self.unmapped_visual = Some(visual_column);
    }

    /// Make `to_visual_column(physical_column)` return `None`
    pub fn break_visual_lookup(&mut self, physical_column: usize) {
        self.unplaced_physical = Some(physical_column);
    }

    /// Move a visual column, the way dragging a header would
    pub fn move_column(&mut self, from: usize, to: usize) {
        let physical = self.column_order.remove(from);
        self.column_order.insert(to, physical);
    }

    pub fn insert_rows(&mut self, at: usize, rows: Vec<Vec<CellValue>>) {
        let at = at.min(self.rows.len());
        let tail = self.rows.split_off(at);
        self.rows.extend(rows);
        self.rows.extend(tail);
    }

    pub fn remove_physical_rows(&mut self, mut physical: Vec<usize>) {
        physical.sort_unstable();
        for row in physical.into_iter().rev() {
            self.rows.remove(row);
        }
    }

    pub fn set_cell(&mut self, physical_row: usize, physical_column: usize, value: CellValue) {
        self.rows[physical_row][physical_column] = value;
    }

    pub fn renders(&self) -> usize {
        *self.render_count.lock()
    }

    /// Values of a visual column top to bottom, as the grid would display them
    pub fn displayed(&self, translator: &RowTranslator, visual_column: usize) -> Vec<CellValue> {
        let physical_column = self.column_order[visual_column];
        (0..self.rows.len())
            .map(|visual_row| {
                let physical_row = translator
                    .visual_to_physical(visual_row, TranslationSource::Host)
                    .expect("visual row should be mapped");
                self.rows[physical_row][physical_column].clone()
            })
            .collect()
    }
}

impl GridHost for MockGrid {
    fn column_count(&self) -> usize {
        self.column_order.len()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell_value(&self, row: usize, visual_column: usize) -> CellValue {
        let physical_row = match &self.translator {
            Some(translator) => {
                let translated = translator.visual_to_physical(row, TranslationSource::Host);
                self.read_log.lock().push((row, translated));
                translated.unwrap_or(row)
            }
            None => row,
        };
        self.rows[physical_row][self.column_order[visual_column]].clone()
    }

    fn to_physical_column(&self, visual_column: usize) -> Option<usize> {
        if self.unmapped_visual == Some(visual_column) {
            return None;
        }
        self.column_order.get(visual_column).copied()
    }

    fn to_visual_column(&self, physical_column: usize) -> Option<usize> {
        if self.unplaced_physical == Some(physical_column) {
            return None;
        }
        self.column_order.iter().position(|&p| p == physical_column)
    }

    fn request_render(&self) {
        *self.render_count.lock() += 1;
    }

    fn spare_rows(&self) -> usize {
        self.spare_rows
    }

    fn max_rows(&self) -> usize {
        self.max_rows
    }

    fn column_meta(&self, physical_column: usize) -> Option<ColumnSortOverrides> {
        self.meta.get(&physical_column).cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortEvent {
    Before {
        current: Vec<ColumnSortConfig>,
        requested: Vec<ColumnSortConfig>,
        is_valid: bool,
    },
    After {
        previous: Vec<ColumnSortConfig>,
        current: Vec<ColumnSortConfig>,
        is_valid: bool,
    },
}

/// Observer that records every notification and can veto sorts
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub events: Arc<Mutex<Vec<SortEvent>>>,
    veto: bool,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vetoing() -> Self {
        Self {
            veto: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<SortEvent> {
        self.events.lock().clone()
    }
}

impl SortObserver for RecordingObserver {
    fn before_sort(
        &self,
        current: &[ColumnSortConfig],
        requested: &[ColumnSortConfig],
        is_valid: bool,
    ) -> bool {
        self.events.lock().push(SortEvent::Before {
            current: current.to_vec(),
            requested: requested.to_vec(),
            is_valid,
        });
        !self.veto
    }

    fn after_sort(&self, previous: &[ColumnSortConfig], current: &[ColumnSortConfig], is_valid: bool) {
        self.events.lock().push(SortEvent::After {
            previous: previous.to_vec(),
            current: current.to_vec(),
            is_valid,
        });
    }
}

/// Store that fails loads or saves on demand
#[derive(Default)]
pub struct FailingStore {
    fail_load: bool,
    fail_save: bool,
    pub save_attempts: Arc<Mutex<usize>>,
}

impl FailingStore {
    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub fn failing_save() -> Self {
        Self {
            fail_save: true,
            ..Self::default()
        }
    }

    pub fn save_attempts(&self) -> usize {
        *self.save_attempts.lock()
    }
}

impl SortStateStore for FailingStore {
    fn load(&self, _key: &str) -> anyhow::Result<Option<PersistedSortState>> {
        if self.fail_load {
            anyhow::bail!("saved sort state is corrupt");
        }
        Ok(None)
    }

    fn save(&self, _key: &str, _state: &PersistedSortState) -> anyhow::Result<()> {
        *self.save_attempts.lock() += 1;
        if self.fail_save {
            anyhow::bail!("disk full");
        }
        Ok(())
    }

    fn remove(&self, _key: &str) -> anyhow::Result<bool> {
        Ok(false)
    }
}

/// Name / age / joined rows used across tests
pub fn people_grid() -> MockGrid {
    MockGrid::new(vec![
        vec!["Carol".into(), 34.into(), "03/02/2021".into()],
        vec!["alice".into(), 29.into(), "15/11/2019".into()],
        vec!["Bob".into(), CellValue::Null, "01/01/2020".into()],
        vec!["dave".into(), 29.into(), "".into()],
        vec!["Eve".into(), 41.into(), "28/02/2018".into()],
    ])
}

pub fn texts(values: &[CellValue]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
