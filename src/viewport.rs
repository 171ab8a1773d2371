/*
 * Viewport Module
 *
 * The web is laid out in viewport space: origin at the top-left corner, y
 * pointing down. nannou draws with the origin at the window centre and y
 * pointing up. This module converts between the two.
 */

use nannou::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    // Convert a point from viewport space to draw space
    pub fn viewport_to_draw(&self, point: Vec2) -> Vec2 {
        vec2(point.x - self.width / 2.0, self.height / 2.0 - point.y)
    }

    // Convert a point from draw space to viewport space
    pub fn draw_to_viewport(&self, point: Vec2) -> Vec2 {
        vec2(point.x + self.width / 2.0, self.height / 2.0 - point.y)
    }
}
