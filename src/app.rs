/*
 * Application Module
 *
 * This module defines the application model and the nannou update and view
 * functions for the cobweb.
 *
 * Each update:
 * - Runs the control panel and applies what was clicked
 * - Advances the spawn schedule and dispatches due spawns (unless paused)
 * - Steps the physics world with a fixed-step runner
 * - Rebuilds the scene for the pending frame
 */

use log::{error, info, warn};
use nannou::prelude::*;
use nannou_egui::Egui;
use std::env;
use std::time::Instant;

use crate::controller::Cobweb;
use crate::debug::DebugInfo;
use crate::input::{
    key_pressed, mouse_moved, mouse_pressed, mouse_released, raw_window_event, resized, toggle_theme,
};
use crate::params::WebParams;
use crate::physics::Runner;
use crate::renderer::RenderLoop;
use crate::scheduler::SpawnScheduler;
use crate::theme::Theme;
use crate::ui;
use crate::viewport::Viewport;

const CONFIG_ENV: &str = "COBWEB_CONFIG";
const SEED_ENV: &str = "COBWEB_SEED";
const THEME_ENV: &str = "COBWEB_THEME";

// Used when the monitor size is unknown
const FALLBACK_WINDOW_SIZE: (u32, u32) = (1280, 800);

// Main model for the application
pub struct Model {
    pub cobweb: Cobweb,
    pub runner: Runner,
    pub scheduler: SpawnScheduler,
    pub render_loop: RenderLoop,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub started: Instant,
    pub paused: bool,
    pub show_debug: bool,
    growth_complete: bool,
}

// Initialize the model
pub fn model(app: &App) -> Model {
    // 80% of the primary monitor, as the window the web grows in
    let (window_width, window_height) = app
        .primary_monitor()
        .map(|monitor| {
            let size = monitor.size();
            ((size.width as f32 * 0.8) as u32, (size.height as f32 * 0.8) as u32)
        })
        .unwrap_or(FALLBACK_WINDOW_SIZE);

    let window_id = app
        .new_window()
        .title("Cobweb")
        .size(window_width, window_height)
        .view(view)
        .mouse_moved(mouse_moved)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .key_pressed(key_pressed)
        .resized(resized)
        .raw_event(raw_window_event)
        .build()
        .expect("failed to build the main window");

    let window = app.window(window_id).expect("main window closed during startup");
    let egui = Egui::from_window(&window);
    let (width, height) = window.inner_size_points();

    let params = load_params();
    let max_threads = params.max_threads;
    let mut cobweb = Cobweb::new(params, Viewport::new(width, height), load_theme(), load_seed());

    let scheduler = SpawnScheduler::with_growth_plan(cobweb.rng(), max_threads);
    info!(
        "growing up to {} threads in a {:.0}x{:.0} viewport, {} spawn events queued",
        max_threads,
        width,
        height,
        scheduler.pending()
    );

    let mut render_loop = RenderLoop::new();
    render_loop.start(&mut cobweb);

    Model {
        cobweb,
        runner: Runner::default(),
        scheduler,
        render_loop,
        egui,
        debug_info: DebugInfo::default(),
        started: Instant::now(),
        paused: false,
        show_debug: false,
        growth_complete: false,
    }
}

// Parameters from the JSON file named by COBWEB_CONFIG, defaults otherwise
fn load_params() -> WebParams {
    let Ok(path) = env::var(CONFIG_ENV) else {
        return WebParams::default();
    };

    match WebParams::from_json_file(&path) {
        Ok(params) => {
            info!("loaded web parameters from {path}");
            params
        }
        Err(err) => {
            warn!("{err}; using default web parameters");
            WebParams::default()
        }
    }
}

fn load_seed() -> Option<u64> {
    let raw = env::var(SEED_ENV).ok()?;
    match raw.trim().parse() {
        Ok(seed) => {
            info!("using fixed seed {seed}");
            Some(seed)
        }
        Err(err) => {
            warn!("ignoring {SEED_ENV}={raw:?}: {err}");
            None
        }
    }
}

fn load_theme() -> Theme {
    let Ok(raw) = env::var(THEME_ENV) else {
        return Theme::default();
    };

    raw.parse().unwrap_or_else(|err| {
        warn!("{err}; starting with the dark theme");
        Theme::default()
    })
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let stats = model.cobweb.stats();
    let actions = ui::update_ui(
        &mut model.egui,
        &mut model.paused,
        &mut model.show_debug,
        model.cobweb.theme,
        &stats,
        &model.debug_info,
    );
    if actions.toggle_theme {
        toggle_theme(model);
    }

    if model.paused {
        model.debug_info.physics_steps_per_frame = 0;
    } else {
        for action in model.scheduler.advance(update.since_last) {
            model.cobweb.handle(action);
        }
        model.debug_info.physics_steps_per_frame = model.runner.tick(&mut model.cobweb.world, update.since_last);
    }

    if model.scheduler.is_exhausted() && !model.growth_complete {
        model.growth_complete = true;
        let stats = model.cobweb.stats();
        info!(
            "web finished growing after {:.1}s: {} threads, {} bodies, {} web connections",
            model.started.elapsed().as_secs_f32(),
            stats.threads,
            stats.bodies,
            stats.web_connections
        );
    }

    model.debug_info.pending_spawns = model.scheduler.pending();
    model.debug_info.simulation_clock = model.scheduler.clock();

    model.render_loop.frame(&model.cobweb);
}

// Draw the web, the optional overlay and the panel
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();

    model.render_loop.draw(&draw, &model.cobweb.viewport);

    if model.show_debug {
        ui::draw_debug_info(
            &draw,
            &model.debug_info,
            app.window_rect(),
            &model.cobweb.stats(),
            model.cobweb.theme,
        );
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        error!("failed to draw frame: {err:?}");
    }

    if let Err(err) = model.egui.draw_to_frame(&frame) {
        error!("failed to draw control panel: {err:?}");
    }
}
