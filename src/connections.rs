/*
 * Web Connections Module
 *
 * Adds faint cross strands between bodies that happen to be close, whichever
 * threads they belong to. Connections add no bodies.
 *
 * The scan only visits every third body on both sides of the pair, and a pass
 * stops as soon as it has added its quota, so later bodies may go unexamined.
 */

use rand::Rng;

use crate::controller::Cobweb;
use crate::physics::{ConstraintOptions, Endpoint, PositionQuery};
use crate::thread::DecoratedConstraint;

const SCAN_STRIDE: usize = 3;
const CONNECTION_STIFFNESS: f32 = 0.36;
const CONNECTION_DAMPING: f32 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WebPassStats {
    pub added: usize,
    // Pairs whose distance was measured
    pub examined: usize,
}

impl Cobweb {
    pub fn create_web_connections(&mut self) -> WebPassStats {
        let max_new = self.params.max_new_connections;
        let radius = self.params.connection_distance;
        let probability = self.params.connection_probability;
        let count = self.all_bodies.len();

        let mut stats = WebPassStats::default();

        for i in (0..count).step_by(SCAN_STRIDE) {
            if stats.added >= max_new {
                break;
            }
            for j in (i + 1..count).step_by(SCAN_STRIDE) {
                if stats.added >= max_new {
                    break;
                }

                let body_a = self.all_bodies[i];
                let body_b = self.all_bodies[j];
                let (Some(a), Some(b)) = (self.world.body_position(body_a), self.world.body_position(body_b)) else {
                    continue;
                };
                stats.examined += 1;

                let distance = a.distance(b);
                if distance < radius && self.rng.gen_bool(probability) {
                    self.add_web_connection(Endpoint::Body(body_a), Endpoint::Body(body_b), distance);
                    stats.added += 1;
                }
            }
        }

        stats
    }

    // Rest length is the current distance, so the strand starts unstressed
    fn add_web_connection(&mut self, a: Endpoint, b: Endpoint, distance: f32) {
        let opacity = self.rng.gen_range(0.06..0.18);
        let thickness = self.rng.gen_range(0.15..0.35);
        let color = self.theme.stroke(opacity);

        let constraint = self.world.add_constraint(
            ConstraintOptions::new(a, b)
                .length(distance)
                .stiffness(CONNECTION_STIFFNESS)
                .damping(CONNECTION_DAMPING),
        );

        self.web_connections.push(DecoratedConstraint {
            constraint,
            thickness,
            color,
        });
    }
}
