//! Application state management
//!
//! This module manages the application state including the loaded catalogue,
//! the table/map selection, UI settings, and file loading operations.

use crate::app::bridge::{MapCallback, MapCommand, MapHandle, MarkerColors};
use crate::app::settings::Settings;
use crate::data::{
    Column, DataError, EventRecord, EventTable, SortIndicator, TableAdapter, TableModel, quakeml,
};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Table id used for the event catalogue on both sides of the map bridge
pub const CATALOGUE_TABLE_ID: &str = "cat";

/// Main application state
pub struct AppState {
    /// Currently loaded catalogue, replaced on every successful load
    pub catalogue: Option<Catalogue>,

    /// Main window end of the map bridge
    pub map: MapHandle,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// File loading state
    pub file_loader: FileLoader,

    /// Statistics about loaded data
    pub stats: Stats,

    /// Fit the map to the markers on the next frame
    pub pending_fit_bounds: bool,
}

/// A loaded catalogue with its table view state
pub struct Catalogue {
    /// File the events were read from
    pub source: PathBuf,

    /// Events and their row-index mapping
    pub table: EventTable,

    /// Adapter the table view is bound to, rebuilt on every sort
    pub adapter: TableAdapter,

    /// Column the header indicator sits on
    pub sort_column: usize,

    /// Last indicator reported by the table header
    pub sort_indicator: SortIndicator,

    /// Highlighted event as a record index
    pub selected: Option<usize>,

    /// Scroll the table view to the selected row on the next frame
    pub scroll_to_selected: bool,
}

impl Catalogue {
    pub fn new(source: PathBuf, records: Vec<EventRecord>) -> Self {
        let table = EventTable::new(records);
        let adapter = TableAdapter::new(&table);
        Self {
            source,
            table,
            adapter,
            // Header starts with a descending indicator on the first column
            sort_column: Column::EventId.index(),
            sort_indicator: SortIndicator::Descending,
            selected: None,
            scroll_to_selected: false,
        }
    }

    /// Display row of the highlighted event
    pub fn selected_row(&self) -> Option<usize> {
        self.selected.and_then(|r| self.table.row_of_record(r))
    }

    /// The highlighted event
    pub fn selected_record(&self) -> Option<&EventRecord> {
        self.selected.and_then(|r| self.table.record(r))
    }
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone)]
pub struct UiSettings {
    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Current active tab in sidebar
    pub active_tab: SidebarTab,

    /// Whether the table window is open
    pub show_table: bool,

    /// Marker colours used for newly plotted events
    pub marker_colors: MarkerColors,

    /// Whether to show profiling in settings
    pub show_profiling: bool,
}

/// Sidebar tabs
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SidebarTab {
    Catalogue,
    Settings,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }
}

/// File loading state and operations
pub struct FileLoader {
    /// Files pending load
    pub pending_files: Vec<PathBuf>,

    /// Load errors
    pub errors: Vec<(PathBuf, String)>,

    /// Show file picker dialog
    pub show_picker: bool,
}

/// Statistics about loaded data
#[derive(Default)]
pub struct Stats {
    /// Number of events
    pub event_count: usize,

    /// Number of events without a magnitude
    pub missing_magnitudes: usize,

    /// Smallest and largest magnitude
    pub magnitude_range: Option<(f64, f64)>,

    /// Earliest and latest origin time
    pub time_span: Option<(DateTime<Utc>, DateTime<Utc>)>,

    /// Duration of the last load in milliseconds
    pub last_load_time_ms: f64,
}

impl AppState {
    /// Create new application state from CLI settings
    pub fn new(settings: &Settings, map: MapHandle) -> Self {
        let file_loader = FileLoader {
            pending_files: settings.catalogue.iter().cloned().collect(),
            errors: Vec::new(),
            show_picker: false,
        };

        Self {
            catalogue: None,
            map,
            ui_settings: UiSettings::default(),
            file_loader,
            stats: Stats::default(),
            pending_fit_bounds: false,
        }
    }

    /// Parse a QuakeML file and replace the loaded catalogue with it
    pub fn open_catalogue(&mut self, path: PathBuf) -> Result<(), DataError> {
        profiling::scope!("open_catalogue");

        let load_start = instant::Instant::now();
        match quakeml::read_file(&path) {
            Ok(records) => {
                self.stats.last_load_time_ms = load_start.elapsed().as_secs_f64() * 1000.0;
                tracing::info!(
                    "Loaded {} events from {} in {:.1} ms",
                    records.len(),
                    path.display(),
                    self.stats.last_load_time_ms
                );
                self.install_catalogue(path, records);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {e}", path.display());
                self.file_loader.errors.push((path, e.to_string()));
                Err(e)
            }
        }
    }

    /// Replace the loaded catalogue and rebuild the map markers from scratch
    pub fn install_catalogue(&mut self, source: PathBuf, records: Vec<EventRecord>) {
        self.catalogue = Some(Catalogue::new(source, records));
        self.map.send(MapCommand::Clear);
        self.plot_events();
        self.update_stats();
        self.ui_settings.show_table = true;
        self.pending_fit_bounds = true;
    }

    /// Send one marker per event to the map
    fn plot_events(&self) {
        let Some(catalogue) = &self.catalogue else {
            return;
        };

        for (row_index, record) in catalogue.table.records().iter().enumerate() {
            self.map.send(MapCommand::AddMarker {
                id: record.event_id.clone(),
                table_id: CATALOGUE_TABLE_ID.to_string(),
                row: row_index,
                lat: record.latitude,
                lon: record.longitude,
                colors: self.ui_settings.marker_colors,
            });
        }
    }

    /// Sort after a click on a column header.
    ///
    /// Clicking the indicator's column flips the indicator; any other column
    /// starts from the default indicator.
    pub fn header_clicked(&mut self, column_index: usize) {
        let Some(catalogue) = &self.catalogue else {
            return;
        };

        let indicator = if catalogue.sort_column == column_index {
            catalogue.sort_indicator.toggled()
        } else {
            SortIndicator::default()
        };

        self.sort_table(column_index, indicator);
    }

    /// Sort the table by a column and rebind the view to a fresh adapter
    pub fn sort_table(&mut self, column_index: usize, indicator: SortIndicator) {
        profiling::scope!("sort_table");

        let Some(catalogue) = self.catalogue.as_mut() else {
            return;
        };
        let Some(column) = Column::from_index(column_index) else {
            tracing::warn!("Ignoring sort on unknown column {column_index}");
            return;
        };

        catalogue.table.sort_by_indicator(column, indicator);
        catalogue.sort_column = column_index;
        catalogue.sort_indicator = indicator;
        catalogue.adapter = TableAdapter::new(&catalogue.table);
        catalogue.scroll_to_selected = catalogue.selected.is_some();
    }

    /// Highlight the event shown at a display row of the table
    pub fn table_row_clicked(&mut self, row: usize) {
        let Some(record_index) = self
            .catalogue
            .as_ref()
            .and_then(|c| c.table.record_at_row(row))
        else {
            tracing::warn!("Clicked row {row} is not in the table");
            return;
        };

        self.highlight_record(CATALOGUE_TABLE_ID, record_index);
    }

    /// Select the table row of a clicked map marker
    pub fn marker_selected(&mut self, event_id: &str, table_id: &str, row_index: usize) {
        tracing::debug!("Marker selected: {event_id} ({table_id}, record {row_index})");
        self.highlight_record(table_id, row_index);
    }

    /// Select a record in its table and highlight its marker
    pub fn highlight_record(&mut self, table_id: &str, record_index: usize) {
        if table_id != CATALOGUE_TABLE_ID {
            tracing::warn!("Unknown table '{table_id}'");
            return;
        }
        let Some(catalogue) = self.catalogue.as_mut() else {
            return;
        };
        let Some(record) = catalogue.table.record(record_index) else {
            tracing::warn!("Record {record_index} is not in table '{table_id}'");
            return;
        };

        let id = record.event_id.clone();
        catalogue.selected = Some(record_index);
        catalogue.scroll_to_selected = true;
        self.map.send(MapCommand::Highlight { id });
    }

    /// Handle every pending callback from the map.
    ///
    /// Returns true if any callback was handled.
    pub fn process_map_callbacks(&mut self) -> bool {
        let mut handled = false;
        while let Some(callback) = self.map.try_recv() {
            match callback {
                MapCallback::MarkerSelected {
                    event_id,
                    table_id,
                    row_index,
                    ..
                } => self.marker_selected(&event_id, &table_id, row_index),
            }
            handled = true;
        }
        handled
    }

    /// Load the oldest pending file
    pub fn process_pending_files(&mut self) {
        if !self.file_loader.pending_files.is_empty() {
            let path = self.file_loader.pending_files.remove(0);
            let _ = self.open_catalogue(path);
        }
    }

    /// Add a file to the pending load queue
    pub fn queue_file(&mut self, path: PathBuf) {
        if !self.file_loader.pending_files.contains(&path) {
            self.file_loader.pending_files.push(path);
        }
    }

    /// Update statistics from the loaded catalogue
    pub fn update_stats(&mut self) {
        let last_load_time_ms = self.stats.last_load_time_ms;
        self.stats = Stats {
            last_load_time_ms,
            ..Default::default()
        };

        let Some(catalogue) = &self.catalogue else {
            return;
        };
        let records = catalogue.table.records();

        self.stats.event_count = records.len();
        self.stats.missing_magnitudes = records.iter().filter(|r| r.magnitude.is_none()).count();
        self.stats.magnitude_range = records
            .iter()
            .filter_map(|r| r.magnitude)
            .fold(None, |range, m| match range {
                None => Some((m, m)),
                Some((lo, hi)) => Some((f64::min(lo, m), f64::max(hi, m))),
            });
        self.stats.time_span = records.iter().map(|r| r.time).fold(None, |span, t| match span {
            None => Some((t, t)),
            Some((first, last)) => Some((first.min(t), last.max(t))),
        });
    }

    /// Clear the loaded catalogue and its markers
    pub fn clear_catalogue(&mut self) {
        self.catalogue = None;
        self.map.send(MapCommand::Clear);
        self.file_loader.errors.clear();
        self.file_loader.pending_files.clear();
        self.stats = Stats::default();
    }

    /// Number of rows the table view currently shows
    pub fn table_row_count(&self) -> usize {
        self.catalogue
            .as_ref()
            .map_or(0, |c| c.adapter.row_count())
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
            active_tab: SidebarTab::Catalogue,
            show_table: false,
            marker_colors: MarkerColors::default(),
            show_profiling: false,
        }
    }
}

impl FileLoader {
    /// Check if any files are waiting to be loaded
    pub fn is_busy(&self) -> bool {
        !self.pending_files.is_empty()
    }
}

impl Stats {
    /// Format the magnitude range
    pub fn format_magnitudes(&self) -> String {
        match self.magnitude_range {
            Some((lo, hi)) => format!("{lo:.1} – {hi:.1}"),
            None => "–".to_string(),
        }
    }

    /// Format the time span as two dates
    pub fn format_time_span(&self) -> String {
        match self.time_span {
            Some((first, last)) => format!(
                "{} – {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            ),
            None => "–".to_string(),
        }
    }

    /// Format event count with thousands separators
    pub fn format_events(&self) -> String {
        format_number_with_commas(self.event_count)
    }
}

/// Helper to format numbers with comma separators
fn format_number_with_commas(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
