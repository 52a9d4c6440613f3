// extensions/rotation.rs
//
// Continuous spin per body, keyed by BodyId.
// Decoupled from World: the sandbox advances it in lockstep with the world tick
// and queries it for render-time angles.
//
// Usage:
//   let mut spins = RotationController::new(seed);
//   spins.start(body_id, 3.0, None)?;   // one revolution every 3s, random direction
//   spins.advance(dt);
//   let angle = spins.angle(body_id);

use std::collections::HashMap;
use std::f64::consts::TAU;

use log::debug;

use crate::api::error::{DynamicsError, Result};
use crate::api::types::BodyId;
use crate::core::rng::Rng;

/// Seconds per revolution used by the demo.
pub const DEFAULT_REVOLUTION_SECS: f64 = 3.0;

/// Spin direction, fixed for the lifetime of one spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinDirection {
    Clockwise,
    CounterClockwise,
}

impl SpinDirection {
    /// `-1.0` for clockwise, `1.0` for counter-clockwise.
    pub fn sign(self) -> f64 {
        match self {
            SpinDirection::Clockwise => -1.0,
            SpinDirection::CounterClockwise => 1.0,
        }
    }
}

/// Spin state of one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub body: BodyId,
    /// Current angle in radians, always in `[0, 2π)`.
    pub angle: f64,
    /// Signed radians per second.
    pub angular_velocity: f64,
}

impl RotationState {
    pub fn direction(&self) -> SpinDirection {
        if self.angular_velocity < 0.0 {
            SpinDirection::Clockwise
        } else {
            SpinDirection::CounterClockwise
        }
    }
}

/// Manages every spinning body. A body is `Spinning` while it has an entry, `Idle` otherwise.
#[derive(Debug)]
pub struct RotationController {
    spins: HashMap<BodyId, RotationState>,
    rng: Rng,
}

impl RotationController {
    pub fn new(seed: u64) -> Self {
        Self {
            spins: HashMap::new(),
            rng: Rng::new(seed),
        }
    }

    /// Start spinning `body` at one revolution per `duration` seconds.
    /// A random direction is rolled when `direction` is `None`.
    /// Already spinning bodies keep their current spin.
    pub fn start(
        &mut self,
        body: BodyId,
        duration: f64,
        direction: Option<SpinDirection>,
    ) -> Result<()> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DynamicsError::invalid(format!(
                "revolution duration must be positive, got {duration}"
            )));
        }
        if self.spins.contains_key(&body) {
            return Ok(());
        }
        let direction = direction.unwrap_or_else(|| {
            if self.rng.next_bool() {
                SpinDirection::Clockwise
            } else {
                SpinDirection::CounterClockwise
            }
        });
        let state = RotationState {
            body,
            angle: 0.0,
            angular_velocity: TAU / duration * direction.sign(),
        };
        debug!("body {body} spinning {direction:?}, {duration}s per revolution");
        self.spins.insert(body, state);
        Ok(())
    }

    /// Stop spinning. Unknown or idle bodies are ignored.
    pub fn stop(&mut self, body: BodyId) -> bool {
        self.spins.remove(&body).is_some()
    }

    /// Advance every spin by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        for spin in self.spins.values_mut() {
            spin.angle = wrap_angle(spin.angle + spin.angular_velocity * dt);
        }
    }

    /// Current angle of a spinning body.
    pub fn angle(&self, body: BodyId) -> Option<f64> {
        self.spins.get(&body).map(|s| s.angle)
    }

    pub fn get(&self, body: BodyId) -> Option<&RotationState> {
        self.spins.get(&body)
    }

    pub fn is_spinning(&self, body: BodyId) -> bool {
        self.spins.contains_key(&body)
    }

    pub fn len(&self) -> usize {
        self.spins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    pub fn clear(&mut self) {
        self.spins.clear();
    }
}

/// Wrap into `[0, 2π)`.
fn wrap_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU {
        0.0
    } else {
        a
    }
}
