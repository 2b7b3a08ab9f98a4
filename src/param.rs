use serde::{Deserialize, Serialize};

use crate::result::{Error, Result};

pub const DEFAULT_RADIUS_KM: f64 = 0.5;
pub const DEFAULT_MIN_MEMBERS: usize = 5;

#[derive(PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    pub radius_km: f64,
    pub min_members: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            min_members: DEFAULT_MIN_MEMBERS,
        }
    }
}

impl ClusterParams {
    pub fn new(radius_km: f64, min_members: usize) -> Result<Self> {
        let params = Self {
            radius_km,
            min_members,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(Error::invalid(format!(
                "radius_km must be a positive finite number, got {}",
                self.radius_km
            )));
        }

        if self.min_members == 0 {
            return Err(Error::invalid("min_members must be at least 1"));
        }

        Ok(())
    }
}
