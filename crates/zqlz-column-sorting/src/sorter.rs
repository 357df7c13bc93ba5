//! Column sorting orchestration
//!
//! [`ColumnSorting`] owns the sort state and drives full sort passes. The grid
//! is passed into each call; the engine never holds on to it. The resulting
//! order is published through the shared [`RowTranslator`].

use std::sync::Arc;

use crate::comparator::{CompositeComparator, KeyComparator, RowSnapshot};
use crate::config::{ColumnSortingConfig, RowInsertPolicy, RowRemapPolicy};
use crate::criteria::{ColumnSortConfig, SortCriterion, SortDirection, SortRequest};
use crate::error::{SortError, SortResult};
use crate::host::{GridHost, SortObserver};
use crate::mapper::{RowTranslator, TranslationSource};
use crate::options::SortOptionsUpdate;
use crate::persistence::{PersistedSortState, SortStateStore};
use crate::state::{validate_columns, SortState};

/// Result of a sort request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    /// The new criteria were committed and rows re-ordered
    Applied,
    /// The request was invalid; nothing changed
    Rejected,
    /// An observer cancelled the sort; nothing changed
    Vetoed,
    /// Sorting is disabled, or the header does not react to clicks
    Ignored,
}

impl SortOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// What a column header should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSortState {
    pub direction: SortDirection,
    /// 1-based position in the queue; only set when more than one column is sorted
    pub priority: Option<usize>,
    pub show_indicator: bool,
}

pub struct ColumnSorting {
    config: ColumnSortingConfig,
    state: SortState,
    translator: RowTranslator,
    observers: Vec<Box<dyn SortObserver>>,
    store: Option<Arc<dyn SortStateStore>>,
    enabled: bool,
}

impl ColumnSorting {
    pub fn new(config: ColumnSortingConfig) -> Self {
        let state = Self::initial_state(&config);
        Self {
            config,
            state,
            translator: RowTranslator::new(),
            observers: Vec::new(),
            store: None,
            enabled: false,
        }
    }

    /// Persist sort state through `store` under the configured persistence key
    pub fn with_store(mut self, store: Arc<dyn SortStateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn SortObserver>) {
        self.observers.push(observer);
    }

    /// Handle for the host's row index filters
    pub fn translator(&self) -> RowTranslator {
        self.translator.clone()
    }

    pub fn config(&self) -> &ColumnSortingConfig {
        &self.config
    }

    pub fn sort_state(&self) -> &SortState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True when enabled and at least one column is sorted
    pub fn is_sorted(&self) -> bool {
        self.enabled && !self.state.is_empty()
    }

    fn initial_state(config: &ColumnSortingConfig) -> SortState {
        let mut state = SortState::new(config.default_options());
        state.update_column_options(&SortOptionsUpdate {
            columns: config.columns.clone(),
            ..SortOptionsUpdate::default()
        });
        state
    }

    /// Turn sorting on and apply saved state, or the initial config when
    /// nothing was saved.
    pub fn enable(&mut self, host: &dyn GridHost) -> SortResult<()> {
        if self.enabled {
            return Ok(());
        }

        let configs = match self.load_saved_state(host)? {
            Some(configs) => configs,
            None => self.config.initial_config.clone(),
        };
        self.enabled = true;
        tracing::debug!("column sorting enabled");

        if !configs.is_empty() {
            self.sort(host, configs)?;
        }
        Ok(())
    }

    /// Turn sorting off. Criteria, the row map and option changes are dropped.
    pub fn disable(&mut self, host: &dyn GridHost) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.state = Self::initial_state(&self.config);
        self.translator.update(|map| map.clear());
        tracing::debug!("column sorting disabled");
        host.request_render();
    }

    fn load_saved_state(&mut self, host: &dyn GridHost) -> SortResult<Option<Vec<ColumnSortConfig>>> {
        let (Some(key), Some(store)) = (&self.config.persistence_key, &self.store) else {
            return Ok(None);
        };
        let Some(saved) = store.load(key)? else {
            return Ok(None);
        };

        tracing::info!(
            "Restoring sort state for {}: {} criteria",
            key,
            saved.criteria.len()
        );
        self.state
            .restore_column_options(saved.defaults, saved.columns);

        let configs = saved
            .criteria
            .iter()
            .filter_map(|criterion| match host.to_visual_column(criterion.column) {
                Some(visual) => Some(ColumnSortConfig::new(visual, criterion.direction)),
                None => {
                    tracing::warn!(
                        column = criterion.column,
                        "saved sort column no longer exists, skipping"
                    );
                    None
                }
            })
            .collect();
        Ok(Some(configs))
    }

    fn save_state(&self) -> SortResult<()> {
        let (Some(key), Some(store)) = (&self.config.persistence_key, &self.store) else {
            return Ok(());
        };
        let saved = PersistedSortState {
            criteria: self.state.criteria().to_vec(),
            defaults: self.state.defaults().clone(),
            columns: self.state.column_overrides().clone(),
        };
        store.save(key, &saved).map_err(|e| {
            tracing::warn!("Failed to save sort state for {}: {}", key, e);
            SortError::Persistence(e)
        })
    }

    /// Sort by one column, a full queue of columns, or nothing (clear).
    ///
    /// The queue replaces the current one wholesale. An invalid queue leaves
    /// every piece of state untouched and returns [`SortOutcome::Rejected`];
    /// observers are told either way and may veto beforehand.
    pub fn sort(
        &mut self,
        host: &dyn GridHost,
        request: impl Into<SortRequest>,
    ) -> SortResult<SortOutcome> {
        if !self.enabled {
            tracing::debug!("sort requested while column sorting is disabled");
            return Ok(SortOutcome::Ignored);
        }

        let current = self.get_sort_config(host);
        let requested = request.into().into_configs();

        let validation = validate_columns(
            requested.iter().map(|c| c.column),
            host.column_count(),
            self.config.multi_column,
        );
        if let Err(reason) = &validation {
            tracing::warn!("Rejected sort config {:?}: {}", requested, reason);
        }
        let is_valid = validation.is_ok();

        let allowed = self
            .observers
            .iter()
            .all(|o| o.before_sort(&current, &requested, is_valid));
        if !allowed {
            tracing::debug!("sort vetoed by observer");
            return Ok(SortOutcome::Vetoed);
        }

        if !is_valid {
            for observer in &self.observers {
                observer.after_sort(&current, &current, false);
            }
            return Ok(SortOutcome::Rejected);
        }

        let criteria = self.to_physical_criteria(host, &requested)?;
        let previous = self.state.criteria().to_vec();
        self.state.set_criteria(criteria);
        if let Err(e) = self.run_sort_pass(host) {
            self.state.set_criteria(previous);
            return Err(e);
        }

        let applied = self.get_sort_config(host);
        tracing::debug!("Applied sort: [{}]", describe(&applied));
        for observer in &self.observers {
            observer.after_sort(&current, &applied, true);
        }
        host.request_render();

        self.save_state()?;
        Ok(SortOutcome::Applied)
    }

    pub fn clear_sort(&mut self, host: &dyn GridHost) -> SortResult<SortOutcome> {
        self.sort(host, SortRequest::Clear)
    }

    fn to_physical_criteria(
        &self,
        host: &dyn GridHost,
        configs: &[ColumnSortConfig],
    ) -> SortResult<Vec<SortCriterion>> {
        let criteria = configs
            .iter()
            .map(|config| {
                host.to_physical_column(config.column)
                    .map(|physical| SortCriterion::new(physical, config.direction))
                    .ok_or_else(|| {
                        SortError::HostContract(format!(
                            "visual column {} has no physical column",
                            config.column
                        ))
                    })
            })
            .collect::<SortResult<Vec<_>>>()?;

        if validate_columns(criteria.iter().map(|c| c.column), usize::MAX, true).is_err() {
            return Err(SortError::HostContract(
                "column translation mapped two visual columns to one physical column".to_string(),
            ));
        }
        Ok(criteria)
    }

    /// Current criteria in visual column coordinates.
    ///
    /// Columns the host can no longer place are left out.
    pub fn get_sort_config(&self, host: &dyn GridHost) -> Vec<ColumnSortConfig> {
        self.state
            .criteria()
            .iter()
            .filter_map(|criterion| {
                host.to_visual_column(criterion.column)
                    .map(|visual| ColumnSortConfig::new(visual, criterion.direction))
            })
            .collect()
    }

    /// Sort config for one visual column, or `None` if it is not sorted
    pub fn get_column_sort_config(
        &self,
        host: &dyn GridHost,
        visual_column: usize,
    ) -> Option<ColumnSortConfig> {
        let physical = host.to_physical_column(visual_column)?;
        self.state
            .criterion(physical)
            .map(|criterion| ColumnSortConfig::new(visual_column, criterion.direction))
    }

    /// Re-run the sort pass with the current criteria
    pub fn refresh(&mut self, host: &dyn GridHost) -> SortResult<()> {
        if !self.enabled {
            return Ok(());
        }
        self.run_sort_pass(host)
    }

    /// Rebuild the row map from scratch.
    ///
    /// Only the leading `min(max_rows, row_count) - spare_rows` rows are
    /// compared; the rest keep their place at the end.
    fn run_sort_pass(&mut self, host: &dyn GridHost) -> SortResult<()> {
        if self.state.is_empty() {
            self.translator.update(|map| map.clear());
            return Ok(());
        }

        let row_count = host.row_count();
        let column_count = host.column_count();
        let participating = row_count
            .min(host.max_rows())
            .saturating_sub(host.spare_rows());

        let criteria = self.state.criteria().to_vec();
        let mut keys = Vec::with_capacity(criteria.len());
        let mut visual_columns = Vec::with_capacity(criteria.len());
        for criterion in &criteria {
            let visual = host
                .to_visual_column(criterion.column)
                .filter(|&visual| visual < column_count)
                .ok_or_else(|| {
                    SortError::HostContract(format!(
                        "sorted physical column {} has no visual column",
                        criterion.column
                    ))
                })?;
            let options = self
                .state
                .column_options(criterion.column, || host.column_meta(criterion.column));
            keys.push(KeyComparator::new(criterion, options));
            visual_columns.push(visual);
        }

        let mut snapshots: Vec<RowSnapshot> = {
            let _raw = self.translator.suppress();
            (0..participating)
                .map(|row| {
                    let values = visual_columns
                        .iter()
                        .map(|&column| host.cell_value(row, column))
                        .collect();
                    RowSnapshot::new(row, values)
                })
                .collect()
        };

        let comparator = CompositeComparator::new(keys);
        comparator.sort(&mut snapshots);

        let mut mapping: Vec<usize> = snapshots.into_iter().map(|s| s.row).collect();
        mapping.extend(participating..row_count);
        self.translator.update(|map| map.replace_all(mapping));

        tracing::debug!(
            criteria = criteria.len(),
            rows = row_count,
            participating,
            "sort pass complete"
        );
        Ok(())
    }

    /// Merge partial option changes and re-sort if needed
    pub fn update_settings(
        &mut self,
        host: &dyn GridHost,
        update: &SortOptionsUpdate,
    ) -> SortResult<()> {
        self.state.update_column_options(update);
        if self.is_sorted() {
            self.run_sort_pass(host)?;
            host.request_render();
            self.save_state()?;
        }
        Ok(())
    }

    /// `count` rows were inserted into the source at physical index `at`
    pub fn on_rows_inserted(
        &mut self,
        host: &dyn GridHost,
        at: usize,
        count: usize,
    ) -> SortResult<()> {
        if !self.is_sorted() {
            return Ok(());
        }
        self.translator.update(|map| map.shift_on_insert(at, count));

        let in_sync = self.translator.read(|map| map.len()) == host.row_count();
        if self.config.row_insert_policy == RowInsertPolicy::Resort || !in_sync {
            if !in_sync {
                tracing::warn!("row map out of sync after insert, rebuilding");
            }
            self.run_sort_pass(host)?;
        }
        Ok(())
    }

    /// `count` rows starting at `visual_start` were removed from the grid
    pub fn on_rows_removed(
        &mut self,
        host: &dyn GridHost,
        visual_start: usize,
        count: usize,
    ) -> SortResult<()> {
        if !self.is_sorted() {
            return Ok(());
        }
        let removed: Vec<usize> = self.translator.read(|map| {
            (visual_start..visual_start.saturating_add(count))
                .map_while(|visual| map.value_at(visual))
                .collect()
        });
        self.translator.update(|map| map.shift_on_remove(&removed));

        if self.translator.read(|map| map.len()) != host.row_count() {
            tracing::warn!("row map out of sync after remove, rebuilding");
            self.run_sort_pass(host)?;
        }
        Ok(())
    }

    /// Another component trimmed or restored rows
    pub fn on_rows_trimmed(&mut self, host: &dyn GridHost) -> SortResult<()> {
        self.on_rows_remapped(host)
    }

    /// Rows were moved by hand
    pub fn on_rows_moved(&mut self, host: &dyn GridHost) -> SortResult<()> {
        self.on_rows_remapped(host)
    }

    fn on_rows_remapped(&mut self, host: &dyn GridHost) -> SortResult<()> {
        if !self.is_sorted() {
            return Ok(());
        }
        match self.config.row_remap_policy {
            RowRemapPolicy::Resort => self.run_sort_pass(host),
            RowRemapPolicy::ClearSort => self.clear_sort(host).map(|_| ()),
        }
    }

    /// The grid loaded a new data set
    pub fn on_data_loaded(&mut self, host: &dyn GridHost) -> SortResult<()> {
        self.state.invalidate_options();
        if self.is_sorted() {
            self.run_sort_pass(host)
        } else {
            self.translator.update(|map| map.clear());
            Ok(())
        }
    }

    /// Cell values changed; sorted rows may need to move
    pub fn on_data_changed(&mut self, host: &dyn GridHost) -> SortResult<()> {
        if self.is_sorted() {
            self.run_sort_pass(host)?;
            host.request_render();
        }
        Ok(())
    }

    /// Direction a header click would move this column to: none → asc → desc → none
    pub fn next_direction(&self, host: &dyn GridHost, visual_column: usize) -> Option<SortDirection> {
        match self
            .get_column_sort_config(host, visual_column)
            .map(|c| c.direction)
        {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        }
    }

    /// Advance a column to its next direction, as a header click would.
    ///
    /// With `append` (and multi-column sorting on) the rest of the queue is
    /// kept; otherwise the column becomes the only criterion.
    pub fn toggle_column(
        &mut self,
        host: &dyn GridHost,
        visual_column: usize,
        append: bool,
    ) -> SortResult<SortOutcome> {
        if !self.enabled {
            return Ok(SortOutcome::Ignored);
        }
        if let Some(physical) = host.to_physical_column(visual_column) {
            let options = self
                .state
                .column_options(physical, || host.column_meta(physical));
            if !options.header_action {
                return Ok(SortOutcome::Ignored);
            }
        }

        let next = self.next_direction(host, visual_column);
        let configs = if append && self.config.multi_column {
            let mut configs = self.get_sort_config(host);
            match (configs.iter().position(|c| c.column == visual_column), next) {
                (Some(ix), Some(direction)) => configs[ix].direction = direction,
                (Some(ix), None) => {
                    configs.remove(ix);
                }
                (None, Some(direction)) => configs.push(ColumnSortConfig::new(visual_column, direction)),
                (None, None) => {}
            }
            configs
        } else {
            next.map(|direction| vec![ColumnSortConfig::new(visual_column, direction)])
                .unwrap_or_default()
        };

        self.sort(host, configs)
    }

    /// Physical row shown at `visual_row`; see [`RowTranslator::visual_to_physical`]
    pub fn visual_to_physical(&self, visual_row: usize, source: TranslationSource) -> Option<usize> {
        self.translator.visual_to_physical(visual_row, source)
    }

    pub fn physical_to_visual(&self, physical_row: usize, source: TranslationSource) -> Option<usize> {
        self.translator.physical_to_visual(physical_row, source)
    }

    /// Indicator state for a column header, `None` when the column is not sorted
    pub fn header_state(
        &mut self,
        host: &dyn GridHost,
        visual_column: usize,
    ) -> Option<HeaderSortState> {
        if !self.enabled {
            return None;
        }
        let physical = host.to_physical_column(visual_column)?;
        let index = self.state.index_in_queue(physical)?;
        let direction = self.state.criteria()[index].direction;
        let queue_len = self.state.criteria().len();
        let show_indicator = self
            .state
            .column_options(physical, || host.column_meta(physical))
            .indicator;

        Some(HeaderSortState {
            direction,
            priority: (queue_len > 1).then_some(index + 1),
            show_indicator,
        })
    }
}

fn describe(configs: &[ColumnSortConfig]) -> String {
    configs
        .iter()
        .map(|c| format!("{} {}", c.column, c.direction.label()))
        .collect::<Vec<_>>()
        .join(", ")
}
