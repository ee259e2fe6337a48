//! Typed message bridge between the main window and the map view
//!
//! The main window drives the map with [`MapCommand`]s and the map reports
//! marker clicks back with [`MapCallback`]s. Both directions are unbounded
//! channels drained once per frame, so messages are handled in send order.

use crate::app::markers::MarkerLayer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};

/// An sRGB colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 128, 0);

    /// Colour with the given opacity (0.0 to 1.0)
    pub fn with_opacity(&self, opacity: f32) -> egui::Color32 {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        egui::Color32::from_rgba_unmultiplied(self.0, self.1, self.2, alpha)
    }
}

/// Marker colours for the highlighted and the normal state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerColors {
    pub active: Rgb,
    pub passive: Rgb,
}

impl Default for MarkerColors {
    fn default() -> Self {
        Self {
            active: Rgb::RED,
            passive: Rgb::GREEN,
        }
    }
}

/// Messages sent to the map view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MapCommand {
    /// Add the marker of one event
    AddMarker {
        id: String,
        table_id: String,
        row: usize,
        lat: f64,
        lon: f64,
        colors: MarkerColors,
    },
    /// Make one marker active and every other marker passive
    Highlight { id: String },
    /// Remove all markers
    Clear,
}

/// Messages sent back by the map view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MapCallback {
    /// A marker was clicked
    MarkerSelected {
        lat: f64,
        lon: f64,
        event_id: String,
        table_id: String,
        row_index: usize,
    },
}

/// Create a connected pair of map endpoints
pub fn channel() -> (MapHandle, MapSurface) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (callback_tx, callback_rx) = mpsc::unbounded_channel();

    (
        MapHandle {
            commands: command_tx,
            callbacks: callback_rx,
        },
        MapSurface {
            commands: command_rx,
            callbacks: callback_tx,
            layer: Arc::new(RwLock::new(MarkerLayer::default())),
        },
    )
}

/// Main window end of the bridge
pub struct MapHandle {
    commands: UnboundedSender<MapCommand>,
    callbacks: UnboundedReceiver<MapCallback>,
}

impl MapHandle {
    /// Queue a command for the map; fire-and-forget
    pub fn send(&self, command: MapCommand) {
        if tracing::enabled!(tracing::Level::TRACE)
            && let Ok(json) = serde_json::to_string(&command)
        {
            tracing::trace!("map <- {json}");
        }
        if self.commands.send(command).is_err() {
            tracing::warn!("Map view is gone, dropping command");
        }
    }

    /// Next pending callback from the map, if any
    pub fn try_recv(&mut self) -> Option<MapCallback> {
        match self.callbacks.try_recv() {
            Ok(callback) => Some(callback),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// Map view end of the bridge, owning the marker layer
pub struct MapSurface {
    commands: UnboundedReceiver<MapCommand>,
    callbacks: UnboundedSender<MapCallback>,
    layer: Arc<RwLock<MarkerLayer>>,
}

impl MapSurface {
    /// Apply every queued command to the marker layer.
    ///
    /// Returns the number of commands applied.
    pub fn pump(&mut self) -> usize {
        profiling::scope!("MapSurface::pump");

        // Use try_write for non-blocking UI polling; commands stay queued otherwise.
        let Ok(mut layer) = self.layer.try_write() else {
            return 0;
        };

        drain(&mut self.commands, |command| layer.apply(command))
    }

    /// Take every queued command without applying it
    #[cfg(test)]
    pub fn pump_with(&mut self, f: impl FnMut(MapCommand)) -> usize {
        drain(&mut self.commands, f)
    }

    /// Shared marker layer, for rendering
    pub fn layer(&self) -> Arc<RwLock<MarkerLayer>> {
        self.layer.clone()
    }

    /// Sender used by the map to report marker clicks
    pub fn callback_sender(&self) -> UnboundedSender<MapCallback> {
        self.callbacks.clone()
    }
}

fn drain(commands: &mut UnboundedReceiver<MapCommand>, mut f: impl FnMut(MapCommand)) -> usize {
    let mut count = 0;
    while let Ok(command) = commands.try_recv() {
        f(command);
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_marker(id: &str, row: usize) -> MapCommand {
        MapCommand::AddMarker {
            id: id.to_string(),
            table_id: "cat".to_string(),
            row,
            lat: 1.0,
            lon: 2.0,
            colors: MarkerColors::default(),
        }
    }

    #[test]
    fn test_commands_reach_layer_in_order() {
        let (handle, mut surface) = channel();

        handle.send(add_marker("A", 0));
        handle.send(add_marker("B", 1));
        handle.send(MapCommand::Highlight { id: "B".into() });
        assert_eq!(surface.pump(), 3);
        assert_eq!(surface.pump(), 0);

        let layer = surface.layer();
        let layer = layer.try_read().unwrap();
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.highlighted().map(|m| m.event_id.as_str()), Some("B"));
    }

    #[test]
    fn test_callbacks_reach_handle() {
        let (mut handle, surface) = channel();
        assert_eq!(handle.try_recv(), None);

        let callback = MapCallback::MarkerSelected {
            lat: 1.0,
            lon: 2.0,
            event_id: "A".into(),
            table_id: "cat".into(),
            row_index: 0,
        };
        surface.callback_sender().send(callback.clone()).unwrap();
        assert_eq!(handle.try_recv(), Some(callback));
        assert_eq!(handle.try_recv(), None);
    }

    #[test]
    fn test_send_after_surface_dropped() {
        let (handle, surface) = channel();
        drop(surface);
        // Must not panic
        handle.send(MapCommand::Clear);
    }

    #[test]
    fn test_command_json_is_tagged() {
        let json = serde_json::to_value(MapCommand::Highlight { id: "ev1".into() }).unwrap();
        assert_eq!(json["type"], "Highlight");
        assert_eq!(json["id"], "ev1");

        let json = serde_json::to_value(add_marker("ev2", 3)).unwrap();
        assert_eq!(json["type"], "AddMarker");
        assert_eq!(json["row"], 3);
        assert_eq!(json["colors"]["passive"], serde_json::json!([0, 128, 0]));
    }

    #[test]
    fn test_rgb_opacity() {
        let color = Rgb::RED.with_opacity(0.5);
        assert_eq!(color.a(), 128);
    }
}
