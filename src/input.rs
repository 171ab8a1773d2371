/*
 * Input Module
 *
 * This module handles window events for the cobweb.
 *
 * Features:
 * - Dragging thread bodies with the left mouse button
 * - Keyboard shortcuts: T toggles the theme, P pauses, D shows debug info
 * - Keeping the viewport in step with the window size
 * - Forwarding raw events to egui
 */

use log::{debug, info};
use nannou::prelude::*;
use nannou::winit::event::MouseButton;

use crate::app::Model;

// Mouse positions arrive in draw space and are fed to the world in viewport space
pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    let position = model.cobweb.viewport.draw_to_viewport(pos);
    model.cobweb.world.mouse_moved(position);
}

pub fn mouse_pressed(_app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left {
        return;
    }

    // Clicks on the panel never grab a thread
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }

    if let Some(body) = model.cobweb.world.mouse_pressed() {
        debug!("grabbed body {}", body.index());
    }
}

pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.cobweb.world.mouse_released();
    }
}

pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    // Typing into the panel is not a shortcut
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }

    match key {
        Key::T => toggle_theme(model),
        Key::P => {
            model.paused = !model.paused;
            info!("simulation {}", if model.paused { "paused" } else { "resumed" });
        }
        Key::D => model.show_debug = !model.show_debug,
        _ => {}
    }
}

// Anchors already placed stay where they are; only new threads see the new size
pub fn resized(_app: &App, model: &mut Model, size: Vec2) {
    model.cobweb.viewport.resize(size.x, size.y);
    debug!("viewport resized to {:.0}x{:.0}", size.x, size.y);
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}

/// Flips the theme and restarts the render loop, which recolours every
/// stored constraint before the next frame.
pub fn toggle_theme(model: &mut Model) {
    model.cobweb.theme = model.cobweb.theme.toggled();
    model.render_loop.start(&mut model.cobweb);
    info!("switched to {:?} theme", model.cobweb.theme);
}
