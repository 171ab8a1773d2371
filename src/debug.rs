/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct holding the per-frame metrics
 * shown in the control panel and the on-screen overlay.
 *
 * Includes metrics for:
 * - FPS and frame time
 * - Physics steps taken this frame
 * - Spawn actions still waiting in the scheduler
 */

use std::time::Duration;

// Debug information to display
#[derive(Clone, Debug, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub physics_steps_per_frame: usize,
    pub pending_spawns: usize,
    pub simulation_clock: Duration,
}
