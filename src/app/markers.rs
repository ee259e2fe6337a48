//! Event markers shown on the map

use crate::app::bridge::{MapCommand, MarkerColors};
use geo::BoundingRect;
use std::collections::HashMap;

/// Visual state of a marker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerStatus {
    Active,
    Passive,
}

/// One event marker
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub event_id: String,
    /// Table the event belongs to
    pub table_id: String,
    /// Record index of the event inside its table
    pub row_index: usize,
    pub lat: f64,
    pub lon: f64,
    pub colors: MarkerColors,
    pub status: MarkerStatus,
}

impl Marker {
    /// Stroke opacity for the current status
    pub fn opacity(&self) -> f32 {
        match self.status {
            MarkerStatus::Active => 0.8,
            MarkerStatus::Passive => 0.6,
        }
    }

    /// Fill opacity for the current status
    pub fn fill_opacity(&self) -> f32 {
        match self.status {
            MarkerStatus::Active => 0.5,
            MarkerStatus::Passive => 0.3,
        }
    }

    pub fn color(&self) -> crate::app::bridge::Rgb {
        match self.status {
            MarkerStatus::Active => self.colors.active,
            MarkerStatus::Passive => self.colors.passive,
        }
    }
}

/// All markers of the map, with an id lookup for highlighting
#[derive(Default, Debug)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    /// Event id -> latest marker added with that id
    by_id: HashMap<String, usize>,
    highlighted: Option<usize>,
}

impl MarkerLayer {
    /// Apply one bridge command
    pub fn apply(&mut self, command: MapCommand) {
        match command {
            MapCommand::AddMarker {
                id,
                table_id,
                row,
                lat,
                lon,
                colors,
            } => self.add(Marker {
                event_id: id,
                table_id,
                row_index: row,
                lat,
                lon,
                colors,
                status: MarkerStatus::Passive,
            }),
            MapCommand::Highlight { id } => {
                if !self.highlight(&id) {
                    tracing::warn!("No marker for event '{id}', nothing highlighted");
                }
            }
            MapCommand::Clear => self.clear(),
        }
    }

    /// Add a passive marker.
    ///
    /// Markers sharing an event id are all kept; the id then refers to the
    /// latest one.
    pub fn add(&mut self, marker: Marker) {
        self.by_id.insert(marker.event_id.clone(), self.markers.len());
        self.markers.push(marker);
    }

    /// Make every marker passive, then activate the one with `event_id`.
    ///
    /// Returns false when no marker has that id.
    pub fn highlight(&mut self, event_id: &str) -> bool {
        for marker in &mut self.markers {
            marker.status = MarkerStatus::Passive;
        }
        self.highlighted = self.by_id.get(event_id).copied();

        match self.highlighted {
            Some(index) => {
                self.markers[index].status = MarkerStatus::Active;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.markers.clear();
        self.by_id.clear();
        self.highlighted = None;
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Marker an event id refers to
    #[cfg(test)]
    pub fn get(&self, event_id: &str) -> Option<&Marker> {
        self.by_id.get(event_id).map(|&i| &self.markers[i])
    }

    pub fn highlighted(&self) -> Option<&Marker> {
        self.highlighted.map(|i| &self.markers[i])
    }

    /// Markers in paint order: passive ones first, the active one last
    pub fn paint_order(&self) -> impl Iterator<Item = &Marker> {
        self.markers
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != self.highlighted)
            .map(|(_, m)| m)
            .chain(self.highlighted())
    }

    /// Bounding box of all markers as (min_lat, min_lon, max_lat, max_lon)
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        let points: geo::MultiPoint<f64> = self
            .markers
            .iter()
            .map(|m| geo::Point::new(m.lon, m.lat))
            .collect();
        let rect = points.bounding_rect()?;
        Some((rect.min().y, rect.min().x, rect.max().y, rect.max().x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_marker(id: &str, lat: f64, lon: f64) -> Marker {
        Marker {
            event_id: id.to_string(),
            table_id: "cat".to_string(),
            row_index: 0,
            lat,
            lon,
            colors: MarkerColors::default(),
            status: MarkerStatus::Passive,
        }
    }

    fn create_test_layer() -> MarkerLayer {
        let mut layer = MarkerLayer::default();
        layer.add(create_test_marker("A", 10.0, 20.0));
        layer.add(create_test_marker("B", -5.0, 40.0));
        layer.add(create_test_marker("C", 30.0, -10.0));
        layer
    }

    #[test]
    fn test_add_markers() {
        let layer = create_test_layer();
        assert_eq!(layer.len(), 3);
        assert!(!layer.is_empty());
        assert!(layer.highlighted().is_none());
        assert_eq!(layer.get("B").map(|m| m.lat), Some(-5.0));
    }

    #[test]
    fn test_add_keeps_markers_with_same_id() {
        let mut layer = create_test_layer();
        let mut duplicate = create_test_marker("B", 1.0, 1.0);
        duplicate.row_index = 3;
        layer.add(duplicate);

        assert_eq!(layer.len(), 4);
        let rows: Vec<usize> = layer
            .paint_order()
            .filter(|m| m.event_id == "B")
            .map(|m| m.row_index)
            .collect();
        assert_eq!(rows, vec![0, 3]);
        assert_eq!(layer.get("B").map(|m| m.lat), Some(1.0));

        assert!(layer.highlight("B"));
        let active: Vec<usize> = layer
            .paint_order()
            .filter(|m| m.status == MarkerStatus::Active)
            .map(|m| m.row_index)
            .collect();
        assert_eq!(active, vec![3]);
    }

    #[test]
    fn test_highlight_single_marker() {
        let mut layer = create_test_layer();

        assert!(layer.highlight("A"));
        assert!(layer.highlight("C"));

        let active: Vec<&str> = layer
            .paint_order()
            .filter(|m| m.status == MarkerStatus::Active)
            .map(|m| m.event_id.as_str())
            .collect();
        assert_eq!(active, vec!["C"]);
        assert_eq!(layer.highlighted().map(|m| m.event_id.as_str()), Some("C"));
    }

    #[test]
    fn test_highlight_unknown_id_clears() {
        let mut layer = create_test_layer();
        layer.highlight("A");

        assert!(!layer.highlight("missing"));
        assert!(layer.highlighted().is_none());
        assert!(
            layer
                .paint_order()
                .all(|m| m.status == MarkerStatus::Passive)
        );
    }

    #[test]
    fn test_paint_order_puts_active_last() {
        let mut layer = create_test_layer();
        layer.highlight("A");

        let order: Vec<&str> = layer.paint_order().map(|m| m.event_id.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_marker_style() {
        let mut marker = create_test_marker("A", 0.0, 0.0);
        assert_eq!(marker.color(), MarkerColors::default().passive);
        assert_eq!(marker.opacity(), 0.6);

        marker.status = MarkerStatus::Active;
        assert_eq!(marker.color(), MarkerColors::default().active);
        assert_eq!(marker.fill_opacity(), 0.5);
    }

    #[test]
    fn test_apply_clear() {
        let mut layer = create_test_layer();
        layer.apply(MapCommand::Highlight { id: "B".into() });
        layer.apply(MapCommand::Clear);

        assert!(layer.is_empty());
        assert!(layer.highlighted().is_none());
        assert!(layer.get("A").is_none());
    }

    #[test]
    fn test_bounding_box() {
        let layer = create_test_layer();
        assert_eq!(layer.bounding_box(), Some((-5.0, -10.0, 30.0, 40.0)));
        assert_eq!(MarkerLayer::default().bounding_box(), None);
    }
}
