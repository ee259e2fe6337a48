//! Earthquake Catalogue Data Module
//!
//! This module turns a QuakeML catalogue file into the flat, sortable table
//! that the table window and the map markers are built from.
//!
//! # Architecture
//!
//! - **[`EventRecord`]**: One immutable row per seismic event (id, origin time,
//!   location, depth and optional magnitude)
//! - **[`quakeml`]**: Streaming QuakeML reader producing [`EventRecord`]s
//! - **[`EventTable`]**: Records plus derived display fields and the row-index
//!   mapping that survives sorting
//! - **[`TableAdapter`]**: Snapshot of an [`EventTable`] exposed through the
//!   generic [`TableModel`] read interface
//!
//! # Usage Example
//!
//! ```rust
//! use quake_catalogue_viewer::data::{quakeml, EventTable, TableAdapter, TableModel};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let xml = r#"<q:quakeml xmlns:q="http://quakeml.org/xmlns/quakeml/1.2"
//!                         xmlns="http://quakeml.org/xmlns/bed/1.2">
//!   <eventParameters publicID="smi:local/catalog">
//!     <event publicID="smi:local/event?eventid=ev1">
//!       <origin publicID="smi:local/origin/1">
//!         <time><value>2011-03-11T05:46:23.200000Z</value></time>
//!         <latitude><value>38.297</value></latitude>
//!         <longitude><value>142.373</value></longitude>
//!         <depth><value>29000.0</value></depth>
//!       </origin>
//!     </event>
//!   </eventParameters>
//! </q:quakeml>"#;
//!
//! let records = quakeml::read(xml.as_bytes())?;
//! let table = EventTable::new(records);
//! let adapter = TableAdapter::new(&table);
//! assert_eq!(adapter.row_count(), 1);
//! assert_eq!(adapter.column_count(), 8);
//! # Ok(())
//! # }
//! ```

mod adapter;
mod event;
pub mod quakeml;
mod table;

// Public API exports
pub use adapter::{CellValue, TableAdapter, TableModel};
pub use event::EventRecord;
pub use table::{Column, EventTable, SortIndicator, SortState};

/// Error types for the data module
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("XML parsing error: {0}")]
    Xml(#[from] xml::reader::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event {event} has no origin")]
    NoOrigin { event: String },

    #[error("Event {event} is missing origin field '{field}'")]
    MissingField { event: String, field: &'static str },

    #[error("Invalid number '{value}' in field '{field}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid origin time '{0}'")]
    InvalidTime(String),
}

pub type Result<T> = std::result::Result<T, DataError>;
