/*
 * Cobweb - Module Definitions
 *
 * This file defines the module structure of the cobweb animation: the physics
 * world and its runner, the web-growing controller with its thread and web
 * connection builders, the spawn scheduler, and the nannou shell around them.
 */

// Re-export key components for easier access
pub use app::Model;
pub use connections::WebPassStats;
pub use controller::{Cobweb, SpawnOutcome, WebStats};
pub use debug::DebugInfo;
pub use error::ConfigError;
pub use params::WebParams;
pub use physics::{BodyHandle, ConstraintHandle, PositionQuery, Runner, World};
pub use renderer::{collect_segments, RenderLoop, Segment};
pub use scheduler::{SpawnAction, SpawnScheduler};
pub use theme::{StrokeColor, Theme};
pub use thread::{DecoratedConstraint, Thread};
pub use viewport::Viewport;

// Define modules
pub mod app;
pub mod connections;
pub mod controller;
pub mod debug;
pub mod error;
pub mod input;
pub mod params;
pub mod physics;
pub mod renderer;
pub mod sampler;
pub mod scheduler;
pub mod theme;
pub mod thread;
pub mod ui;
pub mod viewport;
