//! UI panels for the application
//!
//! This module provides the sidebar with tabs, the event table window,
//! the file picker, and drag-and-drop support.

use crate::app::bridge::Rgb;
use crate::app::state::{AppState, SidebarTab, TilesProvider};
use crate::data::TableModel;
use egui::{Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());
    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    let screen_size = ctx.viewport_rect().size();
    if screen_size.y > screen_size.x {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(280.0)
            .min_height(180.0)
            .max_height(ctx.viewport_rect().height() * 0.6)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state));
    } else {
        egui::SidePanel::right("main_sidebar")
            .default_width(300.0)
            .min_width(260.0)
            .max_width(450.0)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state));
    }
}

fn render_sidebar_content(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.selectable_value(
            &mut state.ui_settings.active_tab,
            SidebarTab::Catalogue,
            "🌍 Catalogue",
        );
        ui.selectable_value(
            &mut state.ui_settings.active_tab,
            SidebarTab::Settings,
            "⚙ Settings",
        );
    });

    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| match state.ui_settings.active_tab {
            SidebarTab::Catalogue => render_catalogue_tab(ui, state),
            SidebarTab::Settings => render_settings_tab(ui, state),
        });
}

/// Render the Catalogue tab
fn render_catalogue_tab(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal_wrapped(|ui| {
        if ui.button("📂 Open Earthquake Catalogue").clicked() {
            state.file_loader.show_picker = true;
        }
        let has_catalogue = state.catalogue.is_some();
        if ui
            .add_enabled(has_catalogue, egui::Button::new("📋 Show Table"))
            .clicked()
        {
            state.ui_settings.show_table = true;
        }
        if ui
            .add_enabled(has_catalogue, egui::Button::new("🎯 Fit to Bounds"))
            .clicked()
        {
            state.pending_fit_bounds = true;
        }
        if ui
            .add_enabled(has_catalogue, egui::Button::new("🗑 Clear"))
            .clicked()
        {
            state.clear_catalogue();
        }
    });

    if state.file_loader.is_busy() {
        ui.add_space(4.0);
        ui.label(
            RichText::new("⏳ Loading catalogue...")
                .strong()
                .color(ui.visuals().warn_fg_color),
        );
    }

    ui.add_space(8.0);
    ui.separator();

    render_stats_section(ui, state);

    ui.add_space(8.0);
    ui.separator();

    if !state.file_loader.errors.is_empty() {
        ui.label(
            RichText::new(format!(
                "⚠ Errors ({} files)",
                state.file_loader.errors.len()
            ))
            .strong()
            .color(Color32::RED),
        );
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .id_salt("errors_scroll")
            .max_height(100.0)
            .show(ui, |ui| {
                for (file, error) in &state.file_loader.errors {
                    ui.label(
                        RichText::new(format!(
                            "• {}: {}",
                            file.file_name().unwrap_or_default().to_string_lossy(),
                            error
                        ))
                        .small()
                        .color(Color32::RED),
                    );
                }
            });

        ui.add_space(4.0);
        if ui.button("Clear Errors").clicked() {
            state.file_loader.errors.clear();
        }

        ui.add_space(8.0);
        ui.separator();
    }

    render_selected_event(ui, state);
}

fn render_stats_section(ui: &mut Ui, state: &AppState) {
    ui.label(RichText::new("📊 Statistics").strong());
    ui.add_space(4.0);

    egui::Grid::new("stats_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("File:");
            let source = state
                .catalogue
                .as_ref()
                .and_then(|c| c.source.file_name())
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "–".to_string());
            ui.label(RichText::new(source).strong());
            ui.end_row();

            ui.label("Events:");
            ui.label(RichText::new(state.stats.format_events()).strong());
            ui.end_row();

            ui.label("Magnitudes:");
            ui.label(RichText::new(state.stats.format_magnitudes()).strong());
            ui.end_row();

            if state.stats.missing_magnitudes > 0 {
                ui.label("No magnitude:");
                ui.label(RichText::new(state.stats.missing_magnitudes.to_string()).strong());
                ui.end_row();
            }

            ui.label("Time span:");
            ui.label(RichText::new(state.stats.format_time_span()).strong());
            ui.end_row();

            if state.stats.last_load_time_ms > 0.0 {
                ui.label("Load Time:");
                ui.label(format!("{:.1} ms", state.stats.last_load_time_ms));
                ui.end_row();
            }
        });
}

fn render_selected_event(ui: &mut Ui, state: &AppState) {
    let Some(record) = state.catalogue.as_ref().and_then(|c| c.selected_record()) else {
        ui.label(
            RichText::new("Click a marker or a table row to select an event")
                .small()
                .weak(),
        );
        return;
    };

    ui.label(RichText::new("📍 Selected Event").strong());
    ui.add_space(4.0);

    egui::Grid::new("selected_event_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("Event ID:");
            ui.label(RichText::new(&record.event_id).strong());
            ui.end_row();

            ui.label("Time (UTC):");
            ui.label(record.time_string());
            ui.end_row();

            ui.label("Location:");
            ui.label(format!("{:.4}, {:.4}", record.latitude, record.longitude));
            ui.end_row();

            ui.label("Depth:");
            ui.label(format!("{:.1} km", record.depth_km));
            ui.end_row();

            ui.label("Magnitude:");
            ui.label(
                record
                    .magnitude
                    .map(|m| format!("{m:.1}"))
                    .unwrap_or_else(|| "–".to_string()),
            );
            ui.end_row();
        });
}

/// Render the Settings tab
fn render_settings_tab(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("🎨 Marker Colours").strong());
    ui.add_space(6.0);

    egui::Grid::new("marker_colors_grid")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Selected:");
            rgb_edit(ui, &mut state.ui_settings.marker_colors.active);
            ui.end_row();

            ui.label("Other events:");
            rgb_edit(ui, &mut state.ui_settings.marker_colors.passive);
            ui.end_row();
        });

    ui.add_space(4.0);
    ui.label(
        RichText::new("Applies to catalogues opened afterwards")
            .small()
            .weak(),
    );

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("🗺 Map Tiles").strong());
    ui.add_space(6.0);

    for provider in TilesProvider::all() {
        let selected = state.ui_settings.tiles_provider == *provider;
        if ui.selectable_label(selected, provider.name()).clicked() {
            state.ui_settings.tiles_provider = *provider;
        }
    }

    ui.add_space(4.0);
    ui.label(
        RichText::new(state.ui_settings.tiles_provider.attribution())
            .small()
            .italics()
            .weak(),
    );

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("🔧 Debug").strong());
    ui.add_space(6.0);

    ui.checkbox(&mut state.ui_settings.show_profiling, "Show profiling data");
    if state.ui_settings.show_profiling {
        ui.add_space(4.0);
        crate::entrypoints::profiling_ui(ui);
    }

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("ℹ About").strong());
    ui.add_space(4.0);
    ui.label(RichText::new(crate::entrypoints::short_version_info()).small());
    ui.label(
        RichText::new("Browse QuakeML earthquake catalogues on a map")
            .small()
            .weak(),
    );
    ui.add_space(4.0);
    ui.label(RichText::new("Keyboard shortcuts:").small());
    ui.label(RichText::new("  F1 / Ctrl+H - Toggle help").small().weak());
    ui.label(RichText::new("  Ctrl+O - Open catalogue").small().weak());
}

fn rgb_edit(ui: &mut Ui, rgb: &mut Rgb) {
    let mut srgb = [rgb.0, rgb.1, rgb.2];
    if ui.color_edit_button_srgb(&mut srgb).changed() {
        *rgb = Rgb(srgb[0], srgb[1], srgb[2]);
    }
}

/// Render the event table window
pub fn table_window(ctx: &egui::Context, state: &mut AppState) {
    if state.catalogue.is_none() || !state.ui_settings.show_table {
        return;
    }

    let mut open = state.ui_settings.show_table;
    let mut header_clicked = None;
    let mut row_clicked = None;

    egui::Window::new("Tables")
        .open(&mut open)
        .default_size([720.0, 360.0])
        .resizable(true)
        .show(ctx, |ui| {
            let Some(catalogue) = state.catalogue.as_mut() else {
                return;
            };
            profiling::scope!("table_window");

            let adapter = &catalogue.adapter;
            let sort_state = catalogue.table.sort_state();
            let selected_row = catalogue.selected_row();
            let scroll_to = catalogue
                .scroll_to_selected
                .then_some(selected_row)
                .flatten();
            catalogue.scroll_to_selected = false;

            let text_height = egui::TextStyle::Body
                .resolve(ui.style())
                .size
                .max(ui.spacing().interact_size.y);

            let mut table = TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .sense(egui::Sense::click())
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(TableColumn::auto().at_least(40.0))
                .columns(
                    TableColumn::auto().at_least(70.0).clip(true),
                    adapter.column_count(),
                )
                .min_scrolled_height(0.0);
            if let Some(row) = scroll_to {
                table = table.scroll_to_row(row, Some(egui::Align::Center));
            }

            table
                .header(text_height + 4.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                    for column in 0..adapter.column_count() {
                        header.col(|ui| {
                            let title = adapter.header(column).unwrap_or_default();
                            let arrow = match sort_state {
                                Some(s) if s.column.index() == column => {
                                    if s.ascending {
                                        " ⬆"
                                    } else {
                                        " ⬇"
                                    }
                                }
                                _ => "",
                            };
                            let button = egui::Button::new(RichText::new(format!("{title}{arrow}")).strong())
                                .frame(false);
                            if ui.add(button).clicked() {
                                header_clicked = Some(column);
                            }
                        });
                    }
                })
                .body(|body| {
                    body.rows(text_height, adapter.row_count(), |mut row| {
                        let row_index = row.index();
                        row.set_selected(selected_row == Some(row_index));

                        row.col(|ui| {
                            ui.add(
                                egui::Label::new(
                                    RichText::new(adapter.row_label(row_index)).weak(),
                                )
                                .selectable(false),
                            );
                        });
                        for column in 0..adapter.column_count() {
                            row.col(|ui| {
                                let text = adapter
                                    .cell(row_index, column)
                                    .map(|v| v.to_string())
                                    .unwrap_or_default();
                                ui.add(egui::Label::new(text).selectable(false));
                            });
                        }

                        if row.response().clicked() {
                            row_clicked = Some(row_index);
                        }
                    });
                });
        });

    state.ui_settings.show_table = open;

    if let Some(column) = header_clicked {
        state.header_clicked(column);
    }
    if let Some(row) = row_clicked {
        state.table_row_clicked(row);
    }
}

/// Show file picker dialog
pub fn show_file_picker(state: &mut AppState) {
    if !state.file_loader.show_picker {
        return;
    }
    state.file_loader.show_picker = false;

    let mut dialog = rfd::FileDialog::new()
        .add_filter("XML Files", &["xml"])
        .set_title("Open Earthquake Catalogue");
    if let Some(home) = dirs::home_dir() {
        dialog = dialog.set_directory(home);
    }

    match dialog.pick_file() {
        Some(path) => state.queue_file(path),
        None => tracing::debug!("File picker cancelled"),
    }
}

/// Help overlay
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("Quake Catalogue Viewer");
            ui.add_space(8.0);

            ui.label("Browse a QuakeML earthquake catalogue on a map and in a table.");
            ui.add_space(12.0);

            ui.label(RichText::new("Opening Catalogues").strong());
            ui.label("• Click 'Open Earthquake Catalogue' in the sidebar");
            ui.label("• Or drag and drop an .xml file onto the window");
            ui.add_space(8.0);

            ui.label(RichText::new("Selecting Events").strong());
            ui.label("• Click a marker to select its row in the table");
            ui.label("• Click a table row to highlight its marker");
            ui.label("• Click a column header to sort, again to reverse");
            ui.add_space(8.0);

            ui.label(RichText::new("Keyboard Shortcuts").strong());
            ui.label("• F1 or Ctrl+H - Toggle this help");
            ui.label("• Ctrl+O - Open catalogue");
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}

/// Handle drag and drop of catalogue files
pub fn handle_drag_and_drop(ctx: &egui::Context, state: &mut AppState) {
    let hovered_files = ctx.input(|i| !i.raw.hovered_files.is_empty());
    let dropped_files: Vec<_> = ctx.input(|i| i.raw.dropped_files.clone());

    if hovered_files {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("drop_preview"),
        ));
        let screen_rect = ctx.content_rect();
        let bg_rect = egui::Rect::from_center_size(screen_rect.center(), egui::vec2(380.0, 80.0));
        painter.rect_filled(bg_rect, 16.0, Color32::from_black_alpha(180));
        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            "📂 Drop catalogue here",
            egui::FontId::proportional(32.0),
            Color32::WHITE,
        );
    }

    for path in dropped_files.into_iter().filter_map(|f| f.path) {
        if path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
        {
            state.queue_file(path);
        } else {
            tracing::warn!("Ignoring dropped file {}: not an .xml file", path.display());
        }
    }
}
