//! Spin animation: per-layer state machine and the frame step function.

use crate::layer::Layer;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpinTuning {
    /// Fewest whole turns added to a spin.
    pub min_turns: u32,
    /// Most whole turns added to a spin.
    pub max_turns: u32,
    /// Random offset, in degrees, applied either way around the target.
    pub jitter_deg: f64,
    pub base_duration_ms: u64,
    /// Extra duration per layer index so outer rings stop first.
    pub stagger_ms: u64,
    pub duration_jitter_ms: u64,
}

impl Default for SpinTuning {
    fn default() -> Self {
        Self {
            min_turns: 3,
            max_turns: 5,
            jitter_deg: 15.0,
            base_duration_ms: 2200,
            stagger_ms: 350,
            duration_jitter_ms: 700,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SpinState {
    #[default]
    Idle,
    Spinning {
        start_deg: f64,
        target_deg: f64,
        started_at: Duration,
        duration: Duration,
    },
}

impl SpinState {
    pub fn is_spinning(&self) -> bool {
        matches!(self, Self::Spinning { .. })
    }

    /// Picks a random target a few turns ahead of `start_deg`.
    pub fn plan<R: Rng>(
        rng: &mut R,
        tuning: &SpinTuning,
        layer_index: usize,
        start_deg: f64,
        now: Duration,
    ) -> Self {
        let max_turns = tuning.max_turns.max(tuning.min_turns);
        let turns = rng.random_range(tuning.min_turns..=max_turns);
        let extra = rng.random_range(0.0..360.0);
        let jitter = if tuning.jitter_deg > 0.0 {
            rng.random_range(-tuning.jitter_deg..tuning.jitter_deg)
        } else {
            0.0
        };
        let jitter_ms = if tuning.duration_jitter_ms > 0 {
            rng.random_range(0..tuning.duration_jitter_ms)
        } else {
            0
        };
        let duration_ms =
            tuning.base_duration_ms + layer_index as u64 * tuning.stagger_ms + jitter_ms;

        Self::Spinning {
            start_deg,
            target_deg: start_deg + 360.0 * f64::from(turns) + extra + jitter,
            started_at: now,
            duration: Duration::from_millis(duration_ms.max(1)),
        }
    }
}

pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Moves every spinning layer to its position at `now`. Layers whose time is
/// up are snapped to a sector and go idle. Returns whether any layer is still
/// spinning.
pub fn advance(layers: &mut [Layer], now: Duration) -> bool {
    let mut running = false;
    for layer in layers.iter_mut() {
        let SpinState::Spinning {
            start_deg,
            target_deg,
            started_at,
            duration,
        } = layer.spin
        else {
            continue;
        };

        let elapsed = now.saturating_sub(started_at);
        let t = (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0);
        layer.rotation_deg = start_deg + (target_deg - start_deg) * ease_out_cubic(t);

        if t >= 1.0 {
            layer.settle();
        } else {
            running = true;
        }
    }
    running
}
