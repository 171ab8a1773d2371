/*
 * Thread Module
 *
 * A thread is a chain of small bodies linked by slack springs, plus two anchor
 * constraints holding its ends. Wall threads are pinned to fixed points just
 * outside the viewport; linked threads hang between two bodies that already
 * belong to other threads.
 *
 * The physics world knows nothing about line thickness or colour, so every
 * constraint a thread draws is paired with that metadata here.
 */

use nannou::prelude::*;
use rand::Rng;
use std::ops::Range;

use crate::controller::Cobweb;
use crate::physics::{BodyHandle, BodyOptions, CollisionFilter, ConstraintHandle, ConstraintOptions, Endpoint, PositionQuery};
use crate::theme::StrokeColor;

const BODY_RADIUS: f32 = 5.0;
const LINK_DAMPING: f32 = 0.15;

// Linked threads only pick pairs inside this distance window
const LINK_MIN_DISTANCE: f32 = 50.0;
const LINK_MAX_DISTANCE: f32 = 300.0;

const LINK_ANCHOR_STIFFNESS: f32 = 0.8;
const LINK_ANCHOR_THICKNESS: f32 = 0.8;

/// A physics constraint together with how it is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct DecoratedConstraint {
    pub constraint: ConstraintHandle,
    pub thickness: f32,
    pub color: StrokeColor,
}

/// Bodies in chain order, followed in `constraints` by one link per segment
/// and then the two anchors.
#[derive(Clone, Debug)]
pub struct Thread {
    pub bodies: Vec<BodyHandle>,
    pub constraints: Vec<DecoratedConstraint>,
    pub thickness: f32,
    pub color: StrokeColor,
}

impl Thread {
    pub fn segments(&self) -> usize {
        self.bodies.len().saturating_sub(1)
    }

    pub fn links(&self) -> &[DecoratedConstraint] {
        &self.constraints[..self.segments()]
    }

    pub fn anchors(&self) -> &[DecoratedConstraint] {
        &self.constraints[self.segments()..]
    }
}

// How a chain is cut into segments and how loose its links are
struct ChainShape {
    segment_length: f32,
    min_segments: usize,
    slack: f32,
    stiffness: Range<f32>,
}

pub fn thread_body_options() -> BodyOptions {
    BodyOptions {
        radius: BODY_RADIUS,
        friction: 0.5,
        friction_air: 0.02,
        restitution: 0.05,
        // Threads pass through each other but the mouse can still grab them
        collision_filter: CollisionFilter {
            group: -1,
            category: 0x0002,
            mask: 0x0001,
        },
    }
}

// Keeps segments near the target length, never fewer than `min_segments`
pub fn segment_count(distance: f32, segment_length: f32, min_segments: usize) -> usize {
    (distance / segment_length).floor() as usize + min_segments
}

impl Cobweb {
    /// Builds a thread pinned to two fixed points and returns its index.
    pub fn create_wall_thread(&mut self, start: Vec2, end: Vec2, thickness: f32, opacity: f32) -> usize {
        let color = self.theme.stroke(opacity);
        let shape = ChainShape {
            segment_length: self.params.wall_segment_length,
            min_segments: 3,
            slack: 0.95,
            stiffness: 0.63..0.85,
        };
        let (bodies, mut constraints) = self.build_chain(start, end, &shape, thickness, &color);

        let ends = [(start, bodies[0]), (end, bodies[bodies.len() - 1])];
        for (point, body) in ends {
            let anchor = self.world.add_constraint(
                ConstraintOptions::new(Endpoint::Point(point), Endpoint::Body(body))
                    .length(0.0)
                    .stiffness(1.0),
            );
            constraints.push(DecoratedConstraint {
                constraint: anchor,
                thickness: 0.0,
                color: StrokeColor::transparent(),
            });
        }

        self.threads.push(Thread {
            bodies,
            constraints,
            thickness,
            color,
        });
        self.threads.len() - 1
    }

    /// Strings a thread between two existing bodies.
    ///
    /// Returns false without touching anything when there are too few bodies
    /// to choose from, or when every sample landed on the first body.
    pub fn create_thread_to_thread(&mut self, thickness: f32, opacity: f32) -> bool {
        if self.all_bodies.len() < self.params.min_bodies_for_link {
            return false;
        }

        let Some((body_a, body_b)) = self.pick_link_pair() else {
            return false;
        };
        let (Some(start), Some(end)) = (self.world.body_position(body_a), self.world.body_position(body_b)) else {
            return false;
        };

        let color = self.theme.stroke(opacity);
        let shape = ChainShape {
            segment_length: self.params.link_segment_length,
            min_segments: 2,
            slack: 0.9,
            stiffness: 0.5..0.7,
        };
        let (bodies, mut constraints) = self.build_chain(start, end, &shape, thickness, &color);

        let ends = [(body_a, bodies[0]), (body_b, bodies[bodies.len() - 1])];
        for (host, body) in ends {
            let anchor = self.world.add_constraint(
                ConstraintOptions::new(Endpoint::Body(host), Endpoint::Body(body))
                    .length(0.0)
                    .stiffness(LINK_ANCHOR_STIFFNESS),
            );
            constraints.push(DecoratedConstraint {
                constraint: anchor,
                thickness: thickness * LINK_ANCHOR_THICKNESS,
                color: color.clone(),
            });
        }

        self.threads.push(Thread {
            bodies,
            constraints,
            thickness,
            color,
        });
        true
    }

    // The last sample is kept even if it never fell inside the distance window
    fn pick_link_pair(&mut self) -> Option<(BodyHandle, BodyHandle)> {
        if self.all_bodies.len() < 2 {
            return None;
        }

        let body_a = self.random_body();
        let mut body_b = self.random_body();

        for _ in 0..self.params.link_attempts {
            body_b = self.random_body();
            let distance = match (self.world.body_position(body_a), self.world.body_position(body_b)) {
                (Some(a), Some(b)) => a.distance(b),
                _ => continue,
            };
            if body_a != body_b && distance > LINK_MIN_DISTANCE && distance < LINK_MAX_DISTANCE {
                break;
            }
        }

        (body_a != body_b).then_some((body_a, body_b))
    }

    // Lay bodies evenly along the line and link neighbours
    fn build_chain(
        &mut self,
        start: Vec2,
        end: Vec2,
        shape: &ChainShape,
        thickness: f32,
        color: &StrokeColor,
    ) -> (Vec<BodyHandle>, Vec<DecoratedConstraint>) {
        let segments = segment_count(start.distance(end), shape.segment_length, shape.min_segments);
        let step = (end - start) / segments as f32;
        let rest_length = step.length() * shape.slack;
        let options = thread_body_options();

        let mut bodies = Vec::with_capacity(segments + 1);
        let mut constraints = Vec::with_capacity(segments + 2);

        for i in 0..=segments {
            let body = self.world.add_body(start + step * i as f32, &options);
            self.all_bodies.push(body);

            if let Some(&previous) = bodies.last() {
                let stiffness = self.rng.gen_range(shape.stiffness.clone());
                let link = self.world.add_constraint(
                    ConstraintOptions::new(Endpoint::Body(previous), Endpoint::Body(body))
                        .length(rest_length)
                        .stiffness(stiffness)
                        .damping(LINK_DAMPING),
                );
                constraints.push(DecoratedConstraint {
                    constraint: link,
                    thickness,
                    color: color.clone(),
                });
            }

            bodies.push(body);
        }

        (bodies, constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::WebParams;
    use crate::theme::Theme;
    use crate::viewport::Viewport;

    fn cobweb(theme: Theme, seed: u64) -> Cobweb {
        Cobweb::new(WebParams::default(), Viewport::new(1000.0, 800.0), theme, Some(seed))
    }

    #[test]
    fn segment_count_has_a_floor() {
        assert_eq!(segment_count(0.0, 35.0, 3), 3);
        assert_eq!(segment_count(34.9, 35.0, 3), 3);
        assert_eq!(segment_count(35.0, 35.0, 3), 4);
        assert_eq!(segment_count(600.0, 35.0, 3), 20);
        assert_eq!(segment_count(299.0, 30.0, 2), 11);
    }

    #[test]
    fn wall_thread_segment_count_ignores_seed_and_theme() {
        for (theme, seed) in [(Theme::Dark, 1), (Theme::Light, 2), (Theme::Dark, 99)] {
            let mut cobweb = cobweb(theme, seed);
            let index = cobweb.create_wall_thread(vec2(-5.0, 100.0), vec2(300.0, -5.0), 0.3, 0.2);
            let distance = vec2(-5.0, 100.0).distance(vec2(300.0, -5.0));
            assert_eq!(cobweb.threads()[index].segments(), (distance / 35.0).floor() as usize + 3);
        }
    }

    #[test]
    fn wall_thread_has_one_more_constraint_than_bodies() {
        let mut cobweb = cobweb(Theme::Dark, 7);
        let index = cobweb.create_wall_thread(vec2(0.0, 0.0), vec2(250.0, 120.0), 0.4, 0.3);
        let thread = &cobweb.threads()[index];

        assert_eq!(thread.constraints.len(), thread.bodies.len() + 1);
        assert_eq!(thread.links().len(), thread.segments());
        assert_eq!(thread.anchors().len(), 2);
    }

    #[test]
    fn wall_links_are_slack_and_varied() {
        let mut cobweb = cobweb(Theme::Dark, 8);
        let index = cobweb.create_wall_thread(vec2(0.0, 0.0), vec2(400.0, 0.0), 0.4, 0.3);
        let thread = &cobweb.threads()[index];
        let step = 400.0 / thread.segments() as f32;

        for link in thread.links() {
            let constraint = cobweb.world.constraint(link.constraint).unwrap();
            assert!((constraint.length - step * 0.95).abs() < 1e-3);
            assert!((0.63..0.85).contains(&constraint.stiffness));
            assert_eq!(constraint.damping, LINK_DAMPING);
        }
    }

    #[test]
    fn wall_anchors_are_rigid_invisible_pins() {
        let mut cobweb = cobweb(Theme::Light, 9);
        let start = vec2(-5.0, 40.0);
        let end = vec2(200.0, -5.0);
        let index = cobweb.create_wall_thread(start, end, 0.4, 0.3);
        let thread = &cobweb.threads()[index];

        let anchors = thread.anchors();
        for anchor in anchors {
            assert_eq!(anchor.thickness, 0.0);
            assert!(anchor.color.is_transparent());
        }

        let first = cobweb.world.constraint(anchors[0].constraint).unwrap();
        assert_eq!(first.a, Endpoint::Point(start));
        assert_eq!(first.b, Endpoint::Body(thread.bodies[0]));
        assert_eq!((first.length, first.stiffness), (0.0, 1.0));

        let last = cobweb.world.constraint(anchors[1].constraint).unwrap();
        assert_eq!(last.a, Endpoint::Point(end));
        assert_eq!(last.b, Endpoint::Body(*thread.bodies.last().unwrap()));
    }

    #[test]
    fn wall_bodies_are_evenly_spaced_on_the_line() {
        let mut cobweb = cobweb(Theme::Dark, 10);
        let index = cobweb.create_wall_thread(vec2(0.0, 0.0), vec2(0.0, 140.0), 0.4, 0.3);
        let thread = &cobweb.threads()[index];

        // 140 / 35 + 3 segments of 20 units
        assert_eq!(thread.segments(), 7);
        for (i, body) in thread.bodies.iter().enumerate() {
            let position = cobweb.world.body_position(*body).unwrap();
            assert!(position.distance(vec2(0.0, 20.0 * i as f32)) < 1e-3);
        }
    }

    #[test]
    fn thread_colour_follows_theme() {
        let mut dark = cobweb(Theme::Dark, 11);
        let index = dark.create_wall_thread(vec2(0.0, 0.0), vec2(100.0, 0.0), 0.4, 0.25);
        assert_eq!(dark.threads()[index].color.as_str(), "rgba(255, 255, 255, 0.25)");

        let mut light = cobweb(Theme::Light, 11);
        let index = light.create_wall_thread(vec2(0.0, 0.0), vec2(100.0, 0.0), 0.4, 0.25);
        for link in light.threads()[index].links() {
            assert_eq!(link.color.as_str(), "rgba(0, 0, 0, 0.25)");
        }
    }

    #[test]
    fn linking_needs_ten_bodies() {
        let mut cobweb = cobweb(Theme::Dark, 12);
        for i in 0..9 {
            cobweb.seed_body(vec2(i as f32 * 100.0, 0.0));
        }

        assert!(!cobweb.create_thread_to_thread(0.3, 0.2));
        assert!(cobweb.threads().is_empty());
        assert_eq!(cobweb.all_bodies().len(), 9);
    }

    #[test]
    fn linking_without_bodies_fails_even_when_unchecked() {
        let params = WebParams {
            min_bodies_for_link: 0,
            ..WebParams::default()
        };
        let mut cobweb = Cobweb::new(params, Viewport::new(1000.0, 800.0), Theme::Dark, Some(16));
        assert!(!cobweb.create_thread_to_thread(0.3, 0.2));

        cobweb.seed_body(vec2(10.0, 10.0));
        assert!(!cobweb.create_thread_to_thread(0.3, 0.2));
        assert!(cobweb.threads().is_empty());
        assert_eq!(cobweb.all_bodies().len(), 1);
    }

    #[test]
    fn linked_thread_hangs_between_existing_bodies() {
        let mut cobweb = cobweb(Theme::Dark, 13);
        let seeds: Vec<_> = (0..12).map(|i| cobweb.seed_body(vec2(i as f32 * 40.0, 0.0))).collect();

        assert!(cobweb.create_thread_to_thread(0.5, 0.3));
        let thread = &cobweb.threads()[0];
        assert_eq!(thread.constraints.len(), thread.bodies.len() + 1);

        let anchors = thread.anchors();
        let first = cobweb.world.constraint(anchors[0].constraint).unwrap();
        let last = cobweb.world.constraint(anchors[1].constraint).unwrap();
        let host_a = first.a.body().unwrap();
        let host_b = last.a.body().unwrap();
        assert!(seeds.contains(&host_a) && seeds.contains(&host_b));
        assert_ne!(host_a, host_b);
        assert_eq!(first.b, Endpoint::Body(thread.bodies[0]));
        assert_eq!((first.length, first.stiffness), (0.0, LINK_ANCHOR_STIFFNESS));

        for anchor in anchors {
            assert!((anchor.thickness - 0.4).abs() < 1e-6);
            assert_eq!(anchor.color, thread.color);
        }
    }

    #[test]
    fn linked_links_use_their_own_shape() {
        let mut cobweb = cobweb(Theme::Dark, 14);
        for i in 0..12 {
            cobweb.seed_body(vec2(i as f32 * 40.0, 0.0));
        }

        assert!(cobweb.create_thread_to_thread(0.5, 0.3));
        let thread = &cobweb.threads()[0];
        let start = cobweb.world.body_position(thread.bodies[0]).unwrap();
        let end = cobweb.world.body_position(*thread.bodies.last().unwrap()).unwrap();
        let distance = start.distance(end);
        assert_eq!(thread.segments(), segment_count(distance, 30.0, 2));

        let step = distance / thread.segments() as f32;
        for link in thread.links() {
            let constraint = cobweb.world.constraint(link.constraint).unwrap();
            assert!((constraint.length - step * 0.9).abs() < 1e-3);
            assert!((0.5..0.7).contains(&constraint.stiffness));
        }
    }

    #[test]
    fn linked_pair_prefers_the_distance_window() {
        let mut cobweb = cobweb(Theme::Dark, 15);
        for i in 0..20 {
            cobweb.seed_body(vec2(i as f32 * 20.0, 0.0));
        }

        for _ in 0..10 {
            assert!(cobweb.create_thread_to_thread(0.3, 0.2));
        }
        let in_window = cobweb
            .threads()
            .iter()
            .filter(|thread| {
                let start = cobweb.world.body_position(thread.bodies[0]).unwrap();
                let end = cobweb.world.body_position(*thread.bodies.last().unwrap()).unwrap();
                let distance = start.distance(end);
                distance > LINK_MIN_DISTANCE && distance < LINK_MAX_DISTANCE
            })
            .count();
        assert!(in_window >= 8);
    }
}
