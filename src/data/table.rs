//! Event table with derived display fields and a sort-stable row-index mapping

use crate::data::{CellValue, EventRecord};
use std::cmp::Ordering;

/// Table columns, in display order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    EventId,
    Timestamp,
    Latitude,
    Longitude,
    Depth,
    Magnitude,
    TimeString,
    JulianDay,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::EventId,
        Column::Timestamp,
        Column::Latitude,
        Column::Longitude,
        Column::Depth,
        Column::Magnitude,
        Column::TimeString,
        Column::JulianDay,
    ];

    /// Column at a display index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Header label shown by the table view
    pub fn header(&self) -> &'static str {
        match self {
            Self::EventId => "Event ID",
            Self::Timestamp => "Time (UTC Timestamp)",
            Self::Latitude => "Lat (dd)",
            Self::Longitude => "Lon  (dd)",
            Self::Depth => "Depth (km)",
            Self::Magnitude => "Mag",
            Self::TimeString => "Time (UTC)",
            Self::JulianDay => "Julian Day",
        }
    }
}

/// Sort direction indicator as reported by the table header widget
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortIndicator {
    /// Set when a new column is clicked
    #[default]
    Ascending = 0,
    Descending = 1,
}

impl SortIndicator {
    /// Raw indicator value
    pub fn raw(&self) -> u8 {
        *self as u8
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// The last sort applied to a table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortState {
    pub column: Column,
    pub ascending: bool,
}

/// Loaded events plus the fields derived for display
#[derive(Clone, Debug, Default)]
pub struct EventTable {
    records: Vec<EventRecord>,
    /// Human-readable origin time per record
    time_strings: Vec<String>,
    /// Day of year per record
    julian_days: Vec<u32>,
    /// Display row -> record index
    row_index: Vec<usize>,
    sort: Option<SortState>,
}

impl EventTable {
    /// Build the table, computing derived fields once
    pub fn new(records: Vec<EventRecord>) -> Self {
        profiling::scope!("EventTable::new");

        let time_strings = records.iter().map(EventRecord::time_string).collect();
        let julian_days = records.iter().map(EventRecord::julian_day).collect();
        let row_index = (0..records.len()).collect();

        Self {
            records,
            time_strings,
            julian_days,
            row_index,
            sort: None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in file order
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn record(&self, record_index: usize) -> Option<&EventRecord> {
        self.records.get(record_index)
    }

    /// Current display order as record indexes
    pub fn row_index(&self) -> &[usize] {
        &self.row_index
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort
    }

    /// Record index shown at a display row
    pub fn record_at_row(&self, row: usize) -> Option<usize> {
        self.row_index.get(row).copied()
    }

    /// Display row currently showing a record
    pub fn row_of_record(&self, record_index: usize) -> Option<usize> {
        self.row_index.iter().position(|&r| r == record_index)
    }

    /// Record index of an event id
    pub fn find_event(&self, event_id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.event_id == event_id)
    }

    /// Value of one column for a record
    pub fn value(&self, record_index: usize, column: Column) -> Option<CellValue> {
        let record = self.records.get(record_index)?;
        Some(match column {
            Column::EventId => CellValue::Text(record.event_id.clone()),
            Column::Timestamp => CellValue::Int(record.timestamp()),
            Column::Latitude => CellValue::Float(record.latitude),
            Column::Longitude => CellValue::Float(record.longitude),
            Column::Depth => CellValue::Float(record.depth_km),
            Column::Magnitude => record.magnitude.map_or(CellValue::Null, CellValue::Float),
            Column::TimeString => CellValue::Text(self.time_strings[record_index].clone()),
            Column::JulianDay => CellValue::Int(self.julian_days[record_index] as i64),
        })
    }

    /// Reorder rows by a column and rebuild the row-index mapping.
    ///
    /// The sort is stable over the current display order. Null values are
    /// placed last in both directions.
    pub fn sort_by(&mut self, column: Column, ascending: bool) {
        profiling::scope!("EventTable::sort_by");

        let keys: Vec<CellValue> = (0..self.records.len())
            .map(|i| self.value(i, column).unwrap_or(CellValue::Null))
            .collect();

        self.row_index.sort_by(|&a, &b| {
            let (ka, kb) = (&keys[a], &keys[b]);
            match (ka.is_null(), kb.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) if ascending => ka.compare(kb),
                (false, false) => ka.compare(kb).reverse(),
            }
        });

        self.sort = Some(SortState { column, ascending });
        tracing::debug!(
            "Sorted {} rows by '{}' ({})",
            self.row_index.len(),
            column.header(),
            if ascending { "ascending" } else { "descending" }
        );
    }

    /// Sort using the header's indicator.
    ///
    /// The raw indicator value is the ascending flag, so
    /// [`SortIndicator::Ascending`] (0) sorts descending.
    pub fn sort_by_indicator(&mut self, column: Column, indicator: SortIndicator) {
        self.sort_by(column, indicator.raw() != 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn create_test_record(id: &str, day: u32, magnitude: Option<f64>, depth_km: f64) -> EventRecord {
        EventRecord {
            event_id: id.to_string(),
            time: Utc.with_ymd_and_hms(2020, 1, day, 12, 0, 0).single().unwrap(),
            latitude: day as f64,
            longitude: -(day as f64),
            depth_km,
            magnitude,
        }
    }

    fn create_test_table() -> EventTable {
        EventTable::new(vec![
            create_test_record("A", 3, Some(4.5), 10.0),
            create_test_record("B", 1, None, 30.0),
            create_test_record("C", 2, Some(6.1), 10.0),
            create_test_record("D", 4, Some(2.0), 20.0),
        ])
    }

    fn ids_in_display_order(table: &EventTable) -> Vec<&str> {
        table
            .row_index()
            .iter()
            .map(|&i| table.records()[i].event_id.as_str())
            .collect()
    }

    #[test]
    fn test_table_creation() {
        let table = create_test_table();
        assert_eq!(table.len(), 4);
        assert!(!table.is_empty());
        assert_eq!(table.row_index(), &[0, 1, 2, 3]);
        assert_eq!(table.sort_state(), None);
    }

    #[test]
    fn test_derived_fields() {
        let table = create_test_table();
        assert_eq!(
            table.value(0, Column::TimeString),
            Some(CellValue::Text("Fri Jan  3 12:00:00 2020".to_string()))
        );
        assert_eq!(table.value(0, Column::JulianDay), Some(CellValue::Int(3)));
    }

    #[test]
    fn test_missing_magnitude_builds_null_cell() {
        let table = create_test_table();
        assert_eq!(table.value(1, Column::Magnitude), Some(CellValue::Null));
    }

    #[test]
    fn test_value_out_of_range() {
        let table = create_test_table();
        assert_eq!(table.value(10, Column::EventId), None);
    }

    #[test]
    fn test_sort_ascending_and_descending() {
        let mut table = create_test_table();

        table.sort_by(Column::Timestamp, true);
        assert_eq!(ids_in_display_order(&table), vec!["B", "C", "A", "D"]);

        table.sort_by(Column::Timestamp, false);
        assert_eq!(ids_in_display_order(&table), vec!["D", "A", "C", "B"]);
    }

    #[test]
    fn test_sort_mapping_is_permutation() {
        let mut table = create_test_table();
        table.sort_by(Column::Latitude, true);
        table.sort_by(Column::Latitude, false);

        let mut mapping = table.row_index().to_vec();
        assert_eq!(mapping.len(), table.len());
        mapping.sort_unstable();
        assert_eq!(mapping, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut table = create_test_table();

        table.sort_by(Column::Depth, true);
        let first = table.row_index().to_vec();
        table.sort_by(Column::Depth, true);
        assert_eq!(table.row_index(), first.as_slice());
    }

    #[test]
    fn test_sort_ties_keep_current_order() {
        let mut table = create_test_table();

        // A and C share a depth of 10 km
        table.sort_by(Column::EventId, false);
        table.sort_by(Column::Depth, true);
        assert_eq!(ids_in_display_order(&table), vec!["C", "A", "D", "B"]);
    }

    #[test]
    fn test_sort_nulls_last() {
        let mut table = create_test_table();

        table.sort_by(Column::Magnitude, true);
        assert_eq!(ids_in_display_order(&table), vec!["D", "A", "C", "B"]);

        table.sort_by(Column::Magnitude, false);
        assert_eq!(ids_in_display_order(&table), vec!["C", "A", "D", "B"]);
    }

    #[test]
    fn test_sort_by_indicator_uses_raw_value() {
        let mut table = create_test_table();

        table.sort_by_indicator(Column::EventId, SortIndicator::Descending);
        assert_eq!(ids_in_display_order(&table), vec!["A", "B", "C", "D"]);
        assert_eq!(
            table.sort_state(),
            Some(SortState {
                column: Column::EventId,
                ascending: true
            })
        );

        table.sort_by_indicator(Column::EventId, SortIndicator::Ascending);
        assert_eq!(ids_in_display_order(&table), vec!["D", "C", "B", "A"]);
    }

    #[test]
    fn test_row_lookup_after_sort() {
        let mut table = create_test_table();
        table.sort_by(Column::EventId, false);

        let c = table.find_event("C").unwrap();
        assert_eq!(c, 2);
        assert_eq!(table.row_of_record(c), Some(1));
        assert_eq!(table.record_at_row(1), Some(c));
        assert_eq!(table.record_at_row(99), None);
        assert_eq!(table.find_event("Z"), None);
    }

    #[test]
    fn test_column_indexes() {
        for (i, column) in Column::ALL.iter().enumerate() {
            assert_eq!(column.index(), i);
            assert_eq!(Column::from_index(i), Some(*column));
        }
        assert_eq!(Column::from_index(8), None);
        assert_eq!(Column::Longitude.header(), "Lon  (dd)");
    }

    #[test]
    fn test_indicator_toggle() {
        assert_eq!(SortIndicator::default(), SortIndicator::Ascending);
        assert_eq!(SortIndicator::Descending.raw(), 1);
        assert_eq!(SortIndicator::Ascending.raw(), 0);
        assert_eq!(
            SortIndicator::Descending.toggled(),
            SortIndicator::Ascending
        );
    }
}
