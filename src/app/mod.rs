//! Application module
//!
//! This module provides the main window:
//! - Full-screen map view with one marker per event
//! - Toggleable sidebar with tabs (Catalogue and Settings)
//! - Event table window, linked to the map in both directions
//! - Drag-and-drop support for QuakeML files

mod bridge;
mod markers;
mod plugin;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::bridge::{MapSurface, MarkerColors};
use crate::app::plugin::MarkerPlugin;
use crate::app::settings::Settings;
use crate::app::state::{AppState, SidebarTab, TilesProvider};
use eframe::egui;
use std::path::{Path, PathBuf};
use walkers::{
    HttpOptions, HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Storage key of the persisted settings
const PERSISTED_SETTINGS_KEY: &str = "persisted_settings";

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17
    }
}

/// Persisted settings (lightweight, no event data)
#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
struct PersistedSettings {
    tiles_provider: String,
    sidebar_open: bool,
    active_tab: String,
    show_table: bool,
    marker_colors: MarkerColors,
    show_profiling: bool,
    /// Catalogue open on exit, reopened on the next start
    last_catalogue: Option<String>,
}

impl PersistedSettings {
    fn from_state(state: &AppState) -> Self {
        let ui = &state.ui_settings;
        let last_catalogue = state
            .catalogue
            .as_ref()
            .map(|c| c.source.as_path())
            .or_else(|| state.file_loader.pending_files.last().map(PathBuf::as_path))
            .map(|p| p.to_string_lossy().to_string());

        Self {
            tiles_provider: format!("{:?}", ui.tiles_provider),
            sidebar_open: ui.sidebar_open,
            active_tab: format!("{:?}", ui.active_tab),
            show_table: ui.show_table,
            marker_colors: ui.marker_colors,
            show_profiling: ui.show_profiling,
            last_catalogue,
        }
    }

    /// Restore into a fresh state. A catalogue given on the command line wins
    /// over the persisted one.
    fn restore(self, state: &mut AppState) {
        let ui = &mut state.ui_settings;
        ui.tiles_provider = match self.tiles_provider.as_str() {
            "OpenTopoMap" => TilesProvider::OpenTopoMap,
            _ => TilesProvider::OpenStreetMap,
        };
        ui.sidebar_open = self.sidebar_open;
        ui.active_tab = match self.active_tab.as_str() {
            "Settings" => SidebarTab::Settings,
            _ => SidebarTab::Catalogue,
        };
        ui.show_table = self.show_table;
        ui.marker_colors = self.marker_colors;
        ui.show_profiling = self.show_profiling;

        if state.file_loader.pending_files.is_empty()
            && let Some(path) = self.last_catalogue.map(PathBuf::from)
            && path.exists()
        {
            tracing::info!("Reopening last catalogue {}", path.display());
            state.queue_file(path);
        }
    }
}

/// Main application structure
pub struct QuakeCatalogueApp {
    /// Application state (catalogue, selection, UI settings, etc.)
    state: AppState,

    /// Map end of the bridge, owning the markers
    map_surface: MapSurface,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Show help overlay
    show_help: bool,
}

impl QuakeCatalogueApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let (map_handle, map_surface) = bridge::channel();
        let mut state = AppState::new(&settings, map_handle);

        if settings.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
        } else if let Some(storage) = cc.storage {
            Self::load_persisted_settings(storage, &mut state);
        }

        let tiles_osm = Self::cached_tiles(OpenStreetMap, &settings.tile_cache.join("osm"), cc);
        let tiles_otm = Self::cached_tiles(OpenTopoMap, &settings.tile_cache.join("otm"), cc);

        tracing::info!(
            "Initialized with {} files to load, tile cache in {}",
            state.file_loader.pending_files.len(),
            settings.tile_cache.display()
        );

        Self {
            state,
            map_surface,
            tiles_osm,
            tiles_otm,
            map_memory: MapMemory::default(),
            show_help: false,
        }
    }

    fn cached_tiles(
        source: impl TileSource + Send + Sync + 'static,
        cache: &Path,
        cc: &eframe::CreationContext<'_>,
    ) -> HttpTiles {
        let options = HttpOptions {
            cache: Some(cache.to_path_buf()),
            ..Default::default()
        };
        HttpTiles::with_options(source, options, cc.egui_ctx.clone())
    }

    fn load_persisted_settings(storage: &dyn eframe::Storage, state: &mut AppState) {
        match storage
            .get_string(PERSISTED_SETTINGS_KEY)
            .filter(|json| !json.is_empty())
            .map(|json| serde_json::from_str::<PersistedSettings>(&json))
        {
            Some(Ok(persisted)) => {
                tracing::info!("Restored settings");
                persisted.restore(state);
            }
            Some(Err(e)) => tracing::warn!("Discarding unreadable persisted settings: {e}"),
            None => tracing::info!("No persisted settings found, starting fresh"),
        }
    }

    /// Fit the map view to the bounding box of all markers.
    ///
    /// Returns false if the marker layer was busy.
    fn fit_to_bounds(&mut self) -> bool {
        let layer = self.map_surface.layer();
        // Use try_read for non-blocking UI polling.
        let Ok(layer) = layer.try_read() else {
            return false;
        };

        if let Some((min_lat, min_lon, max_lat, max_lon)) = layer.bounding_box() {
            let center_lat = (min_lat + max_lat) / 2.0;
            let center_lon = (min_lon + max_lon) / 2.0;

            let lat_span = (max_lat - min_lat).abs();
            let lon_span = (max_lon - min_lon).abs();
            let max_span = lat_span.max(lon_span);

            let zoom = if max_span > 0.0 {
                let zoom_estimate = (4.0 * 360.0 / max_span).log2();
                (zoom_estimate - 0.5).clamp(1.0, 18.0)
            } else {
                8.0
            };

            self.map_memory
                .center_at(walkers::lat_lon(center_lat, center_lon));
            let _ = self.map_memory.set_zoom(zoom);

            tracing::trace!(
                "Auto-zoomed to bounds: ({min_lat:.4}, {min_lon:.4}) - ({max_lat:.4}, {max_lon:.4}), zoom: {zoom:.1}"
            );
        }
        true
    }
}

#[profiling::all_functions]
impl eframe::App for QuakeCatalogueApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        profiling::finish_frame!();

        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) || (i.key_pressed(egui::Key::H) && i.modifiers.ctrl) {
                self.show_help = !self.show_help;
            }
            if i.key_pressed(egui::Key::O) && i.modifiers.command {
                self.state.file_loader.show_picker = true;
            }
        });

        // One catalogue per frame, so the UI shows the loading state first
        if self.state.file_loader.is_busy() {
            self.state.process_pending_files();
            ctx.request_repaint();
        }

        ui_panels::handle_drag_and_drop(ctx, &mut self.state);
        ui_panels::show_file_picker(&mut self.state);

        if self.show_help {
            ui_panels::help_overlay(ctx, &mut self.show_help);
        }

        ui_panels::render_sidebar(ctx, &mut self.state);
        ui_panels::table_window(ctx, &mut self.state);

        // Apply the commands sent this frame before the map is drawn
        self.map_surface.pump();

        if self.state.pending_fit_bounds && self.fit_to_bounds() {
            self.state.pending_fit_bounds = false;
        }

        let tiles_provider = self.state.ui_settings.tiles_provider;
        let attribution_text = tiles_provider.attribution();
        let marker_plugin = MarkerPlugin::new(
            self.map_surface.layer(),
            self.map_surface.callback_sender(),
        );

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let map = Map::new(
                    Some(tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(0.0, 0.0),
                )
                .with_plugin(marker_plugin);

                ui.add(map);

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        // The table shows the selection from a marker click on the next repaint
        if self.state.process_map_callbacks() {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings::from_state(&self.state);
        match serde_json::to_string(&settings) {
            Ok(json) => {
                storage.set_string(PERSISTED_SETTINGS_KEY, json);
                tracing::debug!("Saved settings");
            }
            Err(e) => tracing::warn!("Failed to serialize settings: {e}"),
        }
    }
}
