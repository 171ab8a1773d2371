/*
 * Wall Sampler Module
 *
 * Picks anchor pairs for wall threads. Each pair sits just outside two
 * adjacent edges of the viewport, near one corner, so threads cut across that
 * corner. Coordinates are in viewport space: origin top-left, y down.
 */

use nannou::prelude::*;
use rand::Rng;

// How far outside the viewport edge an anchor sits
const WALL_OFFSET: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallAnchors {
    pub start: Vec2,
    pub end: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight];
}

pub fn sample_wall_anchors<R: Rng + ?Sized>(rng: &mut R, width: f32, height: f32) -> WallAnchors {
    let corner = Corner::ALL[rng.gen_range(0..Corner::ALL.len())];
    sample_corner_anchors(rng, corner, width, height)
}

// Offsets along each edge reach up to half of that viewport dimension
pub fn sample_corner_anchors<R: Rng + ?Sized>(rng: &mut R, corner: Corner, width: f32, height: f32) -> WallAnchors {
    let corner_width = width * 0.5;
    let corner_height = height * 0.5;

    match corner {
        Corner::TopLeft => WallAnchors {
            start: vec2(rng.gen::<f32>() * corner_width, -WALL_OFFSET),
            end: vec2(-WALL_OFFSET, rng.gen::<f32>() * corner_height),
        },
        Corner::TopRight => WallAnchors {
            start: vec2(width - rng.gen::<f32>() * corner_width, -WALL_OFFSET),
            end: vec2(width + WALL_OFFSET, rng.gen::<f32>() * corner_height),
        },
        Corner::BottomLeft => WallAnchors {
            start: vec2(-WALL_OFFSET, height - rng.gen::<f32>() * corner_height),
            end: vec2(rng.gen::<f32>() * corner_width, height + WALL_OFFSET),
        },
        Corner::BottomRight => WallAnchors {
            start: vec2(width + WALL_OFFSET, height - rng.gen::<f32>() * corner_height),
            end: vec2(width - rng.gen::<f32>() * corner_width, height + WALL_OFFSET),
        },
    }
}
