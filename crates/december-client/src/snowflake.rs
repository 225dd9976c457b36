use rand::Rng;
use thiserror::Error;

use december_types::models::{Confession, ConfessionId};

/// Sampling bounds for snowflake motion, in seconds and pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnowflakeConfig {
    pub min_size: f64,
    pub max_size: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub max_delay: f64,
}

impl Default for SnowflakeConfig {
    fn default() -> Self {
        Self {
            min_size: 8.0,
            max_size: 12.0,
            min_duration: 8.0,
            max_duration: 15.0,
            max_delay: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("snowflake {field} range {min}..{max} is inverted or negative")]
pub struct InvalidRange {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
}

impl SnowflakeConfig {
    /// Every range must be non-negative with `min <= max`.
    pub fn validate(&self) -> Result<(), InvalidRange> {
        let ranges = [
            ("size", self.min_size, self.max_size),
            ("duration", self.min_duration, self.max_duration),
            ("delay", 0.0, self.max_delay),
        ];
        for (field, min, max) in ranges {
            // Written so NaN fails too.
            if !(min >= 0.0 && min <= max) {
                return Err(InvalidRange { field, min, max });
            }
        }
        Ok(())
    }
}

/// One falling confession. Timing and size are fixed at creation; only
/// `left` moves between fall iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct Snowflake {
    pub id: ConfessionId,
    pub left: f64,
    pub duration: f64,
    pub delay: f64,
    pub size: f64,
}

impl Snowflake {
    /// CSS `animation` shorthand for an endless linear fall.
    pub fn animation(&self) -> String {
        format!("fall {}s linear {}s infinite", self.duration, self.delay)
    }
}

/// Uniform over `[min, min + span)`.
fn sample<R: Rng + ?Sized>(rng: &mut R, min: f64, span: f64) -> f64 {
    min + rng.random::<f64>() * span
}

/// The set of snowflakes for one rendered listing.
#[derive(Debug, Clone)]
pub struct Snowfall {
    config: SnowflakeConfig,
    viewport_width: f64,
    flakes: Vec<Snowflake>,
}

impl Snowfall {
    /// One snowflake per confession, in listing order.
    pub fn new<R: Rng + ?Sized>(
        confessions: &[Confession],
        viewport_width: f64,
        config: SnowflakeConfig,
        rng: &mut R,
    ) -> Self {
        debug_assert!(config.validate().is_ok(), "{:?}", config);
        let viewport_width = viewport_width.max(0.0);
        let flakes = confessions
            .iter()
            .map(|c| Snowflake {
                id: c.id.clone(),
                left: sample(rng, 0.0, viewport_width),
                duration: sample(rng, config.min_duration, config.max_duration - config.min_duration),
                delay: sample(rng, 0.0, config.max_delay),
                size: sample(rng, config.min_size, config.max_size - config.min_size),
            })
            .collect();

        Self {
            config,
            viewport_width,
            flakes,
        }
    }

    pub fn flakes(&self) -> &[Snowflake] {
        &self.flakes
    }

    pub fn len(&self) -> usize {
        self.flakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flakes.is_empty()
    }

    pub fn config(&self) -> &SnowflakeConfig {
        &self.config
    }

    pub fn get(&self, id: &ConfessionId) -> Option<&Snowflake> {
        self.flakes.iter().find(|f| &f.id == id)
    }

    /// A fall finished and restarted: move the flake sideways, nothing else.
    /// Returns the new position, or `None` for an unknown id.
    pub fn on_iteration<R: Rng + ?Sized>(&mut self, id: &ConfessionId, rng: &mut R) -> Option<f64> {
        let width = self.viewport_width;
        let flake = self.flakes.iter_mut().find(|f| &f.id == id)?;
        flake.left = sample(rng, 0.0, width);
        Some(flake.left)
    }

    /// New positions are drawn against the new width from the next
    /// iteration on.
    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width.max(0.0);
    }
}
