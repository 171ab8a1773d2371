/*
 * UI Module
 *
 * This module builds the control panel with nannou_egui and draws the debug
 * overlay. The panel only reports what was clicked; the app applies it.
 */

use nannou_egui::{egui, Egui};

use crate::controller::WebStats;
use crate::debug::DebugInfo;
use crate::theme::Theme;

// Requests raised by the panel this frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiActions {
    pub toggle_theme: bool,
}

pub fn update_ui(
    egui: &mut Egui,
    paused: &mut bool,
    show_debug: &mut bool,
    theme: Theme,
    stats: &WebStats,
    debug_info: &DebugInfo,
) -> UiActions {
    let mut actions = UiActions::default();

    let ctx = egui.begin_frame();

    egui::Window::new("Cobweb")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            let label = if theme.is_dark() { "Light theme" } else { "Dark theme" };
            if ui.button(label).clicked() {
                actions.toggle_theme = true;
            }

            ui.checkbox(paused, "Pause Simulation");
            ui.checkbox(show_debug, "Show Debug Info");

            ui.collapsing("Web", |ui| {
                ui.label(format!("Threads: {}", stats.threads));
                ui.label(format!("Bodies: {}", stats.bodies));
                ui.label(format!("Web connections: {}", stats.web_connections));
                ui.label(format!("Constraints: {}", stats.constraints));
                ui.label(format!("Pending spawns: {}", debug_info.pending_spawns));
            });

            ui.collapsing("Performance", |ui| {
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Physics steps: {}", debug_info.physics_steps_per_frame));
            });
        });

    actions
}

// Draw debug information in the top-left corner
pub fn draw_debug_info(
    draw: &nannou::Draw,
    debug_info: &DebugInfo,
    window_rect: nannou::geom::Rect,
    stats: &WebStats,
    theme: Theme,
) {
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 220.0;

    let debug_texts = [
        format!("FPS: {:.1}", debug_info.fps),
        format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0),
        format!("Physics steps: {}", debug_info.physics_steps_per_frame),
        format!("Clock: {:.2} s", debug_info.simulation_clock.as_secs_f32()),
        format!("Threads: {}", stats.threads),
        format!("Bodies: {}", stats.bodies),
        format!("Web connections: {}", stats.web_connections),
    ];

    let panel_height = line_height * debug_texts.len() as f32 + margin;
    let panel_x = window_rect.left() + panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    // Panel contrasts with the page background
    let (panel, text) = if theme.is_dark() {
        (nannou::color::rgba(0.0, 0.0, 0.0, 0.7), nannou::color::WHITE)
    } else {
        (nannou::color::rgba(1.0, 1.0, 1.0, 0.8), nannou::color::BLACK)
    };

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(panel);

    let text_x = window_rect.left() + margin;
    let text_y = window_rect.top() - margin;

    for (i, line) in debug_texts.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);

        draw.text(line)
            .x_y(text_x + 80.0, y)
            .color(text)
            .font_size(14);
    }
}
