/*
 * Renderer Module
 *
 * This module turns the web into line segments once per frame and draws them.
 *
 * Segments are collected in update and drawn in view. The loop keeps exactly
 * one pending frame request: each frame consumes it and issues the next, and
 * restarting the loop cancels the old request first, so two chains never run
 * side by side.
 *
 * A restart also recolours every stored constraint for the current theme.
 */

use nannou::color::{Rgb8, Rgba};
use nannou::Draw;
use nannou::prelude::*;

use crate::controller::Cobweb;
use crate::physics::PositionQuery;
use crate::thread::{DecoratedConstraint, Thread};
use crate::viewport::Viewport;

// Used when a stored colour string cannot be read back
const THREAD_FALLBACK_OPACITY: f32 = 0.3;
const WEB_FALLBACK_OPACITY: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Vec2,
    pub to: Vec2,
    pub thickness: f32,
    pub color: Rgba,
}

// Handle of the one frame the loop is waiting to draw
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRequest(u64);

/// Straight segments between the current positions of every drawable
/// constraint. Zero-thickness thread constraints and anything pinned to a
/// fixed point are left out.
pub fn collect_segments<Q: PositionQuery + ?Sized>(
    positions: &Q,
    threads: &[Thread],
    web_connections: &[DecoratedConstraint],
) -> Vec<Segment> {
    let thread_constraints = threads
        .iter()
        .flat_map(|thread| thread.constraints.iter())
        .filter(|decorated| decorated.thickness != 0.0);

    thread_constraints
        .chain(web_connections.iter())
        .filter_map(|decorated| {
            let (from, to) = positions.body_pair(decorated.constraint)?;
            let color = decorated.color.to_rgba()?;
            Some(Segment {
                from,
                to,
                thickness: decorated.thickness,
                color,
            })
        })
        .collect()
}

pub struct RenderLoop {
    pending: Option<FrameRequest>,
    next_request: u64,
    background: Rgb8,
    scene: Vec<Segment>,
    frames_drawn: u64,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            pending: None,
            next_request: 0,
            background: Rgb8::new(0, 0, 0),
            scene: Vec::new(),
            frames_drawn: 0,
        }
    }

    // Recolour for the current theme and begin a fresh chain of frames
    pub fn start(&mut self, cobweb: &mut Cobweb) -> FrameRequest {
        self.cancel();
        cobweb.recolor();
        self.background = cobweb.theme.background();
        self.request_frame()
    }

    pub fn cancel(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn scene(&self) -> &[Segment] {
        &self.scene
    }

    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_request);
        self.next_request += 1;
        self.pending = Some(request);
        request
    }

    /// Consumes the pending request, rebuilds the scene from current body
    /// positions and requests the next frame. Does nothing when stopped.
    pub fn frame(&mut self, cobweb: &Cobweb) -> bool {
        if self.pending.take().is_none() {
            return false;
        }

        self.background = cobweb.theme.background();
        self.scene = collect_segments(&cobweb.world, cobweb.threads(), cobweb.web_connections());
        self.frames_drawn += 1;
        self.request_frame();
        true
    }

    pub fn draw(&self, draw: &Draw, viewport: &Viewport) {
        draw.background().color(self.background);

        for segment in &self.scene {
            draw.line()
                .start(viewport.viewport_to_draw(segment.from))
                .end(viewport.viewport_to_draw(segment.to))
                .weight(segment.thickness)
                .color(segment.color);
        }
    }
}

impl Cobweb {
    /// Swaps the colour base of every stored constraint to the current theme
    /// while keeping each one's opacity.
    pub fn recolor(&mut self) {
        let theme = self.theme;

        for thread in &mut self.threads {
            if !thread.color.is_transparent() {
                thread.color = thread.color.recolored(theme, THREAD_FALLBACK_OPACITY);
            }
            for decorated in &mut thread.constraints {
                if !decorated.color.is_transparent() {
                    decorated.color = decorated.color.recolored(theme, THREAD_FALLBACK_OPACITY);
                }
            }
        }

        for connection in &mut self.web_connections {
            connection.color = connection.color.recolored(theme, WEB_FALLBACK_OPACITY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::WebParams;
    use crate::theme::{StrokeColor, Theme};

    fn cobweb(theme: Theme) -> Cobweb {
        Cobweb::new(WebParams::default(), Viewport::new(1000.0, 800.0), theme, Some(21))
    }

    #[test]
    fn wall_thread_draws_links_but_not_pins() {
        let mut cobweb = cobweb(Theme::Dark);
        let index = cobweb.create_wall_thread(vec2(0.0, 0.0), vec2(600.0, 0.0), 0.3, 0.2);

        let segments = collect_segments(&cobweb.world, cobweb.threads(), cobweb.web_connections());
        assert_eq!(segments.len(), cobweb.threads()[index].segments());
        assert!(segments.iter().all(|segment| segment.thickness == 0.3));
        assert!(segments.iter().all(|segment| segment.color.alpha == 0.2));
    }

    #[test]
    fn linked_anchors_and_web_connections_are_drawn() {
        let mut cobweb = cobweb(Theme::Dark);
        for i in 0..12 {
            cobweb.seed_body(vec2(i as f32 * 40.0, 0.0));
        }
        assert!(cobweb.create_thread_to_thread(0.5, 0.3));
        let stats = cobweb.create_web_connections();

        let thread = &cobweb.threads()[0];
        let segments = collect_segments(&cobweb.world, cobweb.threads(), cobweb.web_connections());
        assert_eq!(segments.len(), thread.constraints.len() + stats.added);
    }

    #[test]
    fn segments_follow_bodies_after_a_step() {
        let mut cobweb = cobweb(Theme::Dark);
        let index = cobweb.create_wall_thread(vec2(0.0, 0.0), vec2(600.0, 0.0), 0.3, 0.2);
        for _ in 0..60 {
            cobweb.world.step(crate::physics::BASE_DELTA_MS);
        }

        let segments = collect_segments(&cobweb.world, cobweb.threads(), cobweb.web_connections());
        let middle = cobweb.threads()[index].bodies[10];
        let sagging = cobweb.world.body_position(middle).unwrap();
        assert!(sagging.y > 0.0);
        assert!(segments.iter().any(|segment| segment.from == sagging || segment.to == sagging));
    }

    #[test]
    fn frame_requires_a_pending_request() {
        let mut cobweb = cobweb(Theme::Dark);
        let mut render_loop = RenderLoop::new();
        assert!(!render_loop.frame(&cobweb));

        render_loop.start(&mut cobweb);
        assert!(render_loop.frame(&cobweb));
        assert!(render_loop.frame(&cobweb));
        assert_eq!(render_loop.frames_drawn(), 2);

        render_loop.cancel();
        assert!(!render_loop.frame(&cobweb));
        assert!(!render_loop.is_running());
    }

    #[test]
    fn restart_replaces_the_pending_request() {
        let mut cobweb = cobweb(Theme::Dark);
        let mut render_loop = RenderLoop::new();

        let first = render_loop.start(&mut cobweb);
        let second = render_loop.start(&mut cobweb);
        assert_ne!(first, second);
        assert_eq!(render_loop.pending(), Some(second));
    }

    #[test]
    fn recolor_swaps_base_and_keeps_opacity() {
        let mut cobweb = cobweb(Theme::Dark);
        cobweb.create_wall_thread(vec2(0.0, 0.0), vec2(300.0, 50.0), 0.3, 0.27);
        for i in 0..40 {
            cobweb.seed_body(vec2(500.0 + i as f32, 500.0));
        }
        cobweb.create_web_connections();
        let before: Vec<_> = cobweb.web_connections().iter().map(|c| c.color.opacity()).collect();

        cobweb.theme = Theme::Light;
        cobweb.recolor();

        let thread = &cobweb.threads()[0];
        for link in thread.links() {
            assert_eq!(link.color.as_str(), "rgba(0, 0, 0, 0.27)");
        }
        for anchor in thread.anchors() {
            assert!(anchor.color.is_transparent());
        }
        let after: Vec<_> = cobweb.web_connections().iter().map(|c| c.color.opacity()).collect();
        assert_eq!(before, after);
        assert!(cobweb
            .web_connections()
            .iter()
            .all(|c| c.color.as_str().starts_with("rgba(0, 0, 0,")));
    }

    #[test]
    fn recolor_substitutes_default_opacity_for_garbage() {
        let mut cobweb = cobweb(Theme::Dark);
        cobweb.create_wall_thread(vec2(0.0, 0.0), vec2(100.0, 0.0), 0.3, 0.2);
        cobweb.threads[0].constraints[0].color = StrokeColor::from_css("not a colour");

        cobweb.recolor();
        assert_eq!(cobweb.threads()[0].constraints[0].color.as_str(), "rgba(255, 255, 255, 0.3)");
    }

    #[test]
    fn start_sets_theme_background() {
        let mut cobweb = cobweb(Theme::Light);
        let mut render_loop = RenderLoop::new();
        render_loop.start(&mut cobweb);
        assert_eq!(render_loop.background, Theme::Light.background());
    }
}
