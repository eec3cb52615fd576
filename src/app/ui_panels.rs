//! UI panels for the application
//!
//! This module provides reusable UI components for the sidebar design
//! with tabs, dataset controls, and statistics.

use crate::app::state::{AppState, SidebarTab, TilesProvider};
use crate::data::DatasetVariant;
use egui::{RichText, Ui};

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    // Position button in top-right corner
    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());

    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    // Draw button background
    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };

    ui.painter().rect_filled(
        button_rect,
        5.0, // rounding
        bg_color,
    );

    // Draw icon (hamburger menu or X based on state)
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
    let is_portrait = screen_size.y > screen_size.x;

    if is_portrait {
        render_sidebar_bottom(ctx, state);
    } else {
        render_sidebar_side(ctx, state);
    }
}

/// Render sidebar from the side (landscape mode)
fn render_sidebar_side(ctx: &egui::Context, state: &mut AppState) {
    egui::SidePanel::right("main_sidebar")
        .default_width(300.0)
        .min_width(260.0)
        .max_width(450.0)
        .resizable(true)
        .show(ctx, |ui| {
            render_sidebar_content(ui, state, false);
        });
}

/// Render sidebar from the bottom (portrait mode)
fn render_sidebar_bottom(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::bottom("main_sidebar")
        .default_height(280.0)
        .min_height(180.0)
        .max_height(ctx.viewport_rect().height() * 0.6)
        .resizable(true)
        .show(ctx, |ui| {
            render_sidebar_content(ui, state, true);
        });
}

/// Render the sidebar content (shared between portrait and landscape)
fn render_sidebar_content(ui: &mut Ui, state: &mut AppState, is_portrait: bool) {
    // Tab selection
    ui.horizontal(|ui| {
        ui.selectable_value(
            &mut state.ui_settings.active_tab,
            SidebarTab::Dataset,
            "🔥 Dataset",
        );
        ui.selectable_value(
            &mut state.ui_settings.active_tab,
            SidebarTab::Settings,
            "⚙ Settings",
        );
    });

    ui.separator();

    // Tab content
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| match state.ui_settings.active_tab {
            SidebarTab::Dataset => render_dataset_tab(ui, state, is_portrait),
            SidebarTab::Settings => render_settings_tab(ui, state),
        });
}

/// Render the Dataset tab
fn render_dataset_tab(ui: &mut Ui, state: &mut AppState, is_portrait: bool) {
    // Variant selection at top
    ui.label(RichText::new("🕒 Time of Day").strong());
    ui.add_space(4.0);

    let mut switch_to = None;
    ui.horizontal(|ui| {
        for variant in DatasetVariant::all() {
            let selected = state.ui_settings.variant == *variant;
            if ui.selectable_label(selected, variant.name()).clicked() && !selected {
                switch_to = Some(*variant);
            }
        }
    });
    if let Some(variant) = switch_to {
        state.request_variant(variant);
    }

    ui.add_space(8.0);

    // Action buttons
    if is_portrait {
        ui.vertical(|ui| {
            if ui.button("🎲 Resample").clicked() {
                state.resample();
            }
            if ui.button("🎯 Fit to Data").clicked() {
                state.pending_fit_bounds = true;
            }
        });
    } else {
        ui.horizontal(|ui| {
            if ui.button("🎲 Resample").clicked() {
                state.resample();
            }
            if ui.button("🎯 Fit to Data").clicked() {
                state.pending_fit_bounds = true;
            }
        });
    }

    ui.add_space(8.0);

    // Fetch progress
    if state.is_fetching() {
        ui.separator();
        ui.horizontal(|ui| {
            ui.spinner();
            let name = state
                .fetching_variant()
                .map(|variant| variant.name())
                .unwrap_or("?");
            ui.label(
                RichText::new(format!("Fetching {name} dataset..."))
                    .strong()
                    .color(ui.visuals().warn_fg_color),
            );
        });
        ui.add_space(8.0);
    }

    ui.separator();

    // Statistics - always visible and prominent
    render_stats_section(ui, state);
}

/// Render statistics section (used in Dataset tab)
fn render_stats_section(ui: &mut Ui, state: &AppState) {
    ui.label(RichText::new("📊 Statistics").strong());
    ui.add_space(4.0);

    egui::Grid::new("stats_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            // Data stats
            ui.label("Trips:");
            ui.label(RichText::new(format!("{}", state.stats.trip_count)).strong());
            ui.end_row();

            ui.label("Records:");
            ui.label(RichText::new(state.stats.format_records()).strong());
            ui.end_row();

            ui.label("Valid Points:");
            ui.label(RichText::new(state.stats.format_points()).strong());
            ui.end_row();

            ui.label("Points Rendered:");
            let rendered_text = if state.stats.point_count > 0 {
                let pct =
                    100.0 * state.stats.sampled_points as f64 / state.stats.point_count as f64;
                format!("{} ({:.0}%)", state.stats.format_sampled(), pct)
            } else {
                state.stats.format_sampled()
            };
            ui.label(RichText::new(rendered_text).strong());
            ui.end_row();

            if state.stats.skipped_records > 0 {
                ui.label("Skipped Records:");
                ui.label(
                    RichText::new(format!("{}", state.stats.skipped_records))
                        .color(ui.visuals().warn_fg_color),
                );
                ui.end_row();
            }

            if state.stats.last_fetch_ms > 0.0 {
                ui.label("Last Fetch:");
                ui.label(RichText::new(state.stats.format_fetch_time()).strong());
                ui.end_row();
            }

            // Heat layer stats (if we have render data)
            if state.stats.heat_peak_density > 0 {
                ui.separator();
                ui.separator();
                ui.end_row();

                ui.label("In View:");
                ui.label(RichText::new(state.stats.format_in_view()).strong());
                ui.end_row();

                ui.label("Heat Cells:");
                ui.label(RichText::new(format!("{}", state.stats.heat_drawn_cells)).strong());
                ui.end_row();

                ui.label("Peak Density:");
                ui.label(RichText::new(format!("{}", state.stats.heat_peak_density)).strong());
                ui.end_row();
            }
        });
}

/// Render the Settings tab
fn render_settings_tab(ui: &mut Ui, state: &mut AppState) {
    // Sampling section
    ui.label(RichText::new("🎲 Sampling").strong());
    ui.add_space(6.0);

    egui::Grid::new("sampling_grid")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Sample Size:");
            let mut sample_size = state.ui_settings.sample_size;
            let changed = ui
                .add(egui::Slider::new(&mut sample_size, 1_000..=1_000_000).logarithmic(true))
                .changed();
            if changed {
                state.set_sample_size(sample_size);
            }
            ui.end_row();

            ui.label("Heat Radius:");
            ui.add(
                egui::Slider::new(&mut state.ui_settings.radius, 1.0..=32.0)
                    .suffix(" px")
                    .step_by(1.0),
            );
            ui.end_row();
        });

    ui.add_space(4.0);
    ui.label(
        RichText::new("Sampling caps how many points the heat layer draws")
            .small()
            .weak(),
    );

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    // Map Tiles section
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

    // Debug section
    ui.label(RichText::new("🔧 Debug").strong());
    ui.add_space(6.0);

    ui.checkbox(&mut state.ui_settings.show_profiling, "Show profiling data");
    if state.ui_settings.show_profiling {
        ui.add_space(4.0);
        crate::entrypoints::profiling::profiling_ui(ui);
    }

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    // About section
    ui.label(RichText::new("ℹ About").strong());
    ui.add_space(4.0);
    ui.label(RichText::new("Trip Heatmap Viewer").small());
    ui.label(
        RichText::new("Renders trip GPS datasets as a density heatmap")
            .small()
            .weak(),
    );
    ui.add_space(4.0);
    ui.label(RichText::new("Keyboard shortcuts:").small());
    ui.label(RichText::new("  F1 / Ctrl+H - Toggle help").small().weak());
    ui.label(RichText::new("  Ctrl + Scroll - Zoom map").small().weak());
}

/// Help overlay
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("Trip Heatmap Viewer");
            ui.add_space(8.0);

            ui.label("Visualizes trip GPS datasets as a density heatmap on a map.");
            ui.add_space(12.0);

            ui.label(RichText::new("Dataset").strong());
            ui.label("• Pick the day or night dataset in the sidebar");
            ui.label("• 'Resample' draws a fresh random subset");
            ui.add_space(8.0);

            ui.label(RichText::new("Navigation").strong());
            ui.label("• Ctrl + Scroll wheel to zoom");
            ui.label("• Click and drag to pan");
            ui.label("• 'Fit to Data' to frame the whole dataset");
            ui.add_space(8.0);

            ui.label(RichText::new("Keyboard Shortcuts").strong());
            ui.label("• F1 or Ctrl+H - Toggle this help");
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}

/// Show mouse wheel zoom warning
pub fn show_wheel_zoom_warning(ui: &mut Ui, state: &mut AppState) {
    let alpha = state.get_wheel_warning_alpha();
    if alpha <= 0.0 {
        return;
    }

    let rect = ui.max_rect();
    let warning_size = egui::vec2(280.0, 50.0);
    let warning_pos = rect.center() - warning_size / 2.0;
    let warning_rect = egui::Rect::from_min_size(warning_pos, warning_size);

    // Background with fade
    let bg_alpha = (180.0 * alpha) as u8;
    ui.painter().rect_filled(
        warning_rect,
        10.0,
        egui::Color32::from_black_alpha(bg_alpha),
    );

    // Text with fade
    let text_alpha = (255.0 * alpha) as u8;
    ui.painter().text(
        warning_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Hold Ctrl + Scroll to zoom",
        egui::FontId::proportional(16.0),
        egui::Color32::from_white_alpha(text_alpha),
    );
}
