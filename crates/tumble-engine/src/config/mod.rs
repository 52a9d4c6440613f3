use serde::{Deserialize, Serialize};

use crate::api::error::{DynamicsError, Result};
use crate::core::behavior::CollisionMode;
use crate::core::boundary::Boundary;
use crate::core::math::{is_finite, Vector2};
use crate::extensions::rotation::DEFAULT_REVOLUTION_SECS;

/// Sandbox configuration, usually loaded from JSON by the host page.
/// Every field has a default matching the two-box demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Fixed timestep in seconds.
    pub fixed_dt: f64,
    /// Seed for spin-direction rolls.
    pub seed: u64,
    pub boundary: BoundaryConfig,
    pub gravity: GravityConfig,
    pub collision_mode: CollisionMode,
    /// Elasticity applied by the demo's bounce behavior.
    pub elasticity: f64,
    pub rotation: RotationConfig,
    /// Boxes placed by the demo, resting on the bottom edge.
    pub boxes: Vec<BoxConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub min: Vector2,
    pub max: Vector2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityConfig {
    pub direction: Vector2,
    pub magnitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Seconds per revolution.
    pub duration: f64,
}

/// A square box anchored to the bottom edge, `trailing_inset` away from the right edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxConfig {
    #[serde(default)]
    pub name: String,
    pub size: f64,
    pub trailing_inset: f64,
    /// Falls back to `SandboxConfig::elasticity`.
    #[serde(default)]
    pub elasticity: Option<f64>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            min: Vector2::ZERO,
            max: Vector2::new(300.0, 400.0),
        }
    }
}

impl Default for GravityConfig {
    /// A tenth of a unit pointing at the top edge: the demo makes its boxes rise.
    fn default() -> Self {
        Self {
            direction: Vector2::new(0.0, 1.0),
            magnitude: 0.1,
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_REVOLUTION_SECS,
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            seed: 42,
            boundary: BoundaryConfig::default(),
            gravity: GravityConfig::default(),
            collision_mode: CollisionMode::Boundaries,
            elasticity: 0.2,
            rotation: RotationConfig::default(),
            boxes: vec![
                BoxConfig {
                    name: "blue".into(),
                    size: 80.0,
                    trailing_inset: 20.0,
                    elasticity: None,
                },
                BoxConfig {
                    name: "red".into(),
                    size: 50.0,
                    trailing_inset: 110.0,
                    elasticity: None,
                },
            ],
        }
    }
}

impl SandboxConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    /// Out-of-range values are rejected with `InvalidSpec`.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value against the range the sandbox accepts.
    pub fn validate(&self) -> Result<()> {
        if !(self.fixed_dt.is_finite() && self.fixed_dt > 0.0) {
            return Err(DynamicsError::invalid(format!(
                "fixed_dt must be positive, got {}",
                self.fixed_dt
            )));
        }
        Boundary::new(self.boundary.min, self.boundary.max)?;
        if !is_finite(self.gravity.direction) || !self.gravity.magnitude.is_finite() {
            return Err(DynamicsError::invalid("gravity must be finite"));
        }
        check_elasticity("elasticity", self.elasticity)?;
        if !(self.rotation.duration.is_finite() && self.rotation.duration > 0.0) {
            return Err(DynamicsError::invalid(format!(
                "rotation duration must be positive, got {}",
                self.rotation.duration
            )));
        }
        for (i, b) in self.boxes.iter().enumerate() {
            if !(b.size.is_finite() && b.size > 0.0) || !b.trailing_inset.is_finite() {
                return Err(DynamicsError::invalid(format!(
                    "box {i} ({:?}) needs a positive size and a finite inset",
                    b.name
                )));
            }
            if let Some(e) = b.elasticity {
                check_elasticity("box elasticity", e)?;
            }
        }
        Ok(())
    }
}

fn check_elasticity(what: &str, e: f64) -> Result<()> {
    if (0.0..=1.0).contains(&e) {
        Ok(())
    } else {
        Err(DynamicsError::invalid(format!("{what} must be within [0, 1], got {e}")))
    }
}
