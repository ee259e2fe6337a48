//! Walkers plugin for drawing event markers and reporting marker clicks
//!
//! This module provides a custom walkers plugin that paints the marker layer
//! on top of the map tiles and turns clicks on a marker into a
//! [`MapCallback::MarkerSelected`] message for the main window.

use crate::app::bridge::MapCallback;
use crate::app::markers::{Marker, MarkerLayer};
use egui::{Color32, Stroke};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use walkers::{Plugin, Projector};

/// Marker radius in pixels
const MARKER_RADIUS: f32 = 10.0;

/// Marker stroke width in pixels
const MARKER_STROKE: f32 = 3.0;

/// Plugin for rendering event markers on the map
pub struct MarkerPlugin {
    /// Markers to draw
    layer: Arc<RwLock<MarkerLayer>>,
    /// Reverse channel for marker clicks
    callbacks: UnboundedSender<MapCallback>,
}

impl MarkerPlugin {
    /// Create a new marker plugin
    pub fn new(layer: Arc<RwLock<MarkerLayer>>, callbacks: UnboundedSender<MapCallback>) -> Self {
        Self { layer, callbacks }
    }

    fn screen_position(marker: &Marker, projector: &Projector) -> egui::Pos2 {
        let screen_vec = projector.project(walkers::lat_lon(marker.lat, marker.lon));
        egui::Pos2::new(screen_vec.x, screen_vec.y)
    }

    /// Render a single marker
    fn render_marker(marker: &Marker, position: egui::Pos2, painter: &egui::Painter) {
        let color = marker.color();
        painter.circle(
            position,
            MARKER_RADIUS,
            color.with_opacity(marker.fill_opacity()),
            Stroke::new(MARKER_STROKE, color.with_opacity(marker.opacity())),
        );
    }

    /// Draw the event id above the highlighted marker
    fn render_popup(marker: &Marker, position: egui::Pos2, painter: &egui::Painter) {
        let anchor = position - egui::vec2(0.0, MARKER_RADIUS + 6.0);
        let galley = painter.layout_no_wrap(
            marker.event_id.clone(),
            egui::FontId::proportional(12.0),
            Color32::BLACK,
        );
        let rect = egui::Align2::CENTER_BOTTOM
            .anchor_size(anchor, galley.size())
            .expand(4.0);

        painter.rect_filled(rect, 4.0, Color32::from_white_alpha(230));
        painter.galley(rect.min + egui::vec2(4.0, 4.0), galley, Color32::BLACK);
    }
}

impl Plugin for MarkerPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("MarkerPlugin::run");

        // Use try_read for non-blocking UI polling.
        let Ok(layer) = self.layer.try_read() else {
            return;
        };

        let painter = ui.painter();
        let viewport_rect = response.rect.expand(MARKER_RADIUS + MARKER_STROKE);

        let mut hovered: Option<&Marker> = None;
        let pointer = response.hover_pos();
        for marker in layer.paint_order() {
            let position = Self::screen_position(marker, projector);
            if !viewport_rect.contains(position) {
                continue;
            }
            Self::render_marker(marker, position, painter);

            // Later markers are painted on top, so the last hit wins
            if let Some(pointer) = pointer
                && pointer.distance(position) <= MARKER_RADIUS + MARKER_STROKE
            {
                hovered = Some(marker);
            }
        }

        if let Some(marker) = layer.highlighted() {
            let position = Self::screen_position(marker, projector);
            if viewport_rect.contains(position) {
                Self::render_popup(marker, position, painter);
            }
        }

        let Some(marker) = hovered else {
            return;
        };
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);

        if response.clicked() {
            tracing::debug!("Marker '{}' clicked", marker.event_id);
            let callback = MapCallback::MarkerSelected {
                lat: marker.lat,
                lon: marker.lon,
                event_id: marker.event_id.clone(),
                table_id: marker.table_id.clone(),
                row_index: marker.row_index,
            };
            if self.callbacks.send(callback).is_err() {
                tracing::warn!("Main window is gone, dropping marker click");
            }
        }
    }
}
