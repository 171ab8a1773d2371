/*
 * Controller Module
 *
 * This module defines Cobweb, the single owner of everything the web grows:
 * the physics world, the list of every thread body, the threads themselves and
 * the standalone web connections. Scheduled spawn actions are dispatched here,
 * and every mutation of those collections goes through this type.
 *
 * All collections are append-only. Nothing is removed until the Cobweb is
 * dropped.
 */

use log::debug;
use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::WebParams;
use crate::physics::{BodyHandle, World};
use crate::sampler::sample_wall_anchors;
use crate::scheduler::SpawnAction;
use crate::theme::Theme;
use crate::thread::{thread_body_options, DecoratedConstraint, Thread};
use crate::viewport::Viewport;

/// What a single scheduled spawn ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnOutcome {
    // The thread budget was already spent
    Skipped,
    Wall,
    Linked,
    // A body-to-body thread was attempted but a wall thread was built instead
    WallFallback,
}

// Counts shown in the control panel and debug overlay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WebStats {
    pub threads: usize,
    pub bodies: usize,
    pub web_connections: usize,
    pub constraints: usize,
}

pub struct Cobweb {
    pub params: WebParams,
    pub world: World,
    pub theme: Theme,
    pub viewport: Viewport,
    pub(crate) all_bodies: Vec<BodyHandle>,
    pub(crate) threads: Vec<Thread>,
    pub(crate) web_connections: Vec<DecoratedConstraint>,
    pub(crate) thread_count: usize,
    pub(crate) rng: StdRng,
}

impl Cobweb {
    // A fixed seed makes the whole web reproducible
    pub fn new(params: WebParams, viewport: Viewport, theme: Theme, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = World::new(vec2(0.0, params.gravity_y));

        Self {
            params,
            world,
            theme,
            viewport,
            all_bodies: Vec::new(),
            threads: Vec::new(),
            web_connections: Vec::new(),
            thread_count: 0,
            rng,
        }
    }

    pub fn all_bodies(&self) -> &[BodyHandle] {
        &self.all_bodies
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn web_connections(&self) -> &[DecoratedConstraint] {
        &self.web_connections
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn stats(&self) -> WebStats {
        WebStats {
            threads: self.threads.len(),
            bodies: self.all_bodies.len(),
            web_connections: self.web_connections.len(),
            constraints: self.world.constraint_count(),
        }
    }

    /// Registers a loose thread body that belongs to no thread, so later
    /// threads and web passes can attach to it.
    pub fn seed_body(&mut self, position: Vec2) -> BodyHandle {
        let body = self.world.add_body(position, &thread_body_options());
        self.all_bodies.push(body);
        body
    }

    pub fn handle(&mut self, action: SpawnAction) {
        match action {
            SpawnAction::Spawn => {
                self.spawn_thread();
            }
            SpawnAction::WebPass => {
                let stats = self.create_web_connections();
                debug!("final web pass added {} connections", stats.added);
            }
        }
    }

    pub fn spawn_thread(&mut self) -> SpawnOutcome {
        if self.thread_count >= self.params.max_threads {
            return SpawnOutcome::Skipped;
        }

        let thickness = self.rng.gen_range(0.2..0.6);
        let opacity = self.rng.gen_range(0.15..0.4);

        let outcome = if self.thread_count > self.params.link_after_threads
            && self.rng.gen_bool(self.params.link_probability)
        {
            if self.create_thread_to_thread(thickness, opacity) {
                SpawnOutcome::Linked
            } else {
                debug!("no body pair to link, building a wall thread instead");
                self.create_sampled_wall_thread(thickness, opacity);
                SpawnOutcome::WallFallback
            }
        } else {
            self.create_sampled_wall_thread(thickness, opacity);
            SpawnOutcome::Wall
        };

        self.thread_count += 1;
        if self.thread_count % self.params.web_pass_interval == 0 {
            let stats = self.create_web_connections();
            debug!(
                "web pass after {} threads added {} connections ({} pairs examined)",
                self.thread_count, stats.added, stats.examined
            );
        }

        outcome
    }

    // Wall thread between anchors sampled for the current viewport
    pub fn create_sampled_wall_thread(&mut self, thickness: f32, opacity: f32) {
        let anchors = sample_wall_anchors(&mut self.rng, self.viewport.width, self.viewport.height);
        self.create_wall_thread(anchors.start, anchors.end, thickness, opacity);
    }

    pub(crate) fn random_body(&mut self) -> BodyHandle {
        self.all_bodies[self.rng.gen_range(0..self.all_bodies.len())]
    }
}
