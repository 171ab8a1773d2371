/*
 * Web Parameters Module
 *
 * This module defines the WebParams struct holding every tunable constant of
 * the cobweb: thread budget, segment lengths, web connection density and the
 * physics gravity. The defaults reproduce the intended look; a JSON file can
 * override any subset of fields.
 */

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WebParams {
    pub max_threads: usize,
    // Target segment length of wall-anchored threads
    pub wall_segment_length: f32,
    // Target segment length of threads strung between two bodies
    pub link_segment_length: f32,
    pub min_bodies_for_link: usize,
    pub link_attempts: usize,
    pub link_probability: f64,
    // Only threads beyond this count may be strung between bodies
    pub link_after_threads: usize,
    pub connection_distance: f32,
    pub max_new_connections: usize,
    pub connection_probability: f64,
    pub web_pass_interval: usize,
    pub gravity_y: f32,
}

impl Default for WebParams {
    fn default() -> Self {
        Self {
            max_threads: 150,
            wall_segment_length: 35.0,
            link_segment_length: 30.0,
            min_bodies_for_link: 10,
            link_attempts: 20,
            link_probability: 0.2,
            link_after_threads: 15,
            connection_distance: 80.0,
            max_new_connections: 25,
            connection_probability: 0.15,
            web_pass_interval: 15,
            gravity_y: 0.05,
        }
    }
}

impl WebParams {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: WebParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    // Reject values that would divide by zero or stall the scheduler
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wall_segment_length <= 0.0 || self.link_segment_length <= 0.0 {
            return Err(ConfigError::Invalid("segment lengths must be positive".into()));
        }
        if self.min_bodies_for_link < 2 {
            return Err(ConfigError::Invalid("min_bodies_for_link must be at least 2".into()));
        }
        if self.web_pass_interval == 0 {
            return Err(ConfigError::Invalid("web_pass_interval must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.link_probability) || !(0.0..=1.0).contains(&self.connection_probability) {
            return Err(ConfigError::Invalid("probabilities must lie in [0, 1]".into()));
        }
        Ok(())
    }
}
