//! Default rotation catalog: the sensor sequence and the pod compatibility map.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<RotationCatalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static RotationCatalog {
    &DEFAULT_CATALOG
}

/// Builds the default rotation catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalogs.
pub fn build_default_catalog() -> RotationCatalog {
    build_default_catalog_internal()
}

fn build_default_catalog_internal() -> RotationCatalog {
    use Site::*;

    // Stomach pair, then arms, then legs; each pair alternates right/left twice.
    let sensor_sequence = vec![
        RightStomach,
        LeftStomach,
        RightStomach,
        LeftStomach,
        RightArm,
        LeftArm,
        RightArm,
        LeftArm,
        RightLeg,
        LeftLeg,
        RightLeg,
        LeftLeg,
    ];

    let mut compatibility = HashMap::new();
    compatibility.insert(LeftLeg, vec![LeftStomach, RightStomach, LeftArm, LeftLeg]);
    compatibility.insert(RightLeg, vec![LeftStomach, RightStomach, RightArm, RightLeg]);
    compatibility.insert(LeftStomach, vec![LeftLeg, RightLeg, LeftArm, RightArm]);
    compatibility.insert(RightStomach, vec![LeftLeg, RightLeg, LeftArm, RightArm]);
    compatibility.insert(LeftArm, vec![LeftArm, LeftLeg, LeftStomach]);
    compatibility.insert(RightArm, vec![RightArm, RightLeg, RightStomach]);

    RotationCatalog {
        sensor_sequence,
        compatibility,
    }
}

impl RotationCatalog {
    /// Number of slots in the sensor sequence
    pub fn len(&self) -> usize {
        self.sensor_sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensor_sequence.is_empty()
    }

    /// Sensor site at `index`, wrapping around the sequence
    pub fn sensor_site_at(&self, index: usize) -> Result<Site> {
        if self.sensor_sequence.is_empty() {
            return Err(Error::Catalog("Sensor sequence is empty".into()));
        }
        Ok(self.sensor_sequence[index % self.sensor_sequence.len()])
    }

    /// First sequence slot carrying `site`, if any
    pub fn position_of(&self, site: Site) -> Option<usize> {
        self.sensor_sequence.iter().position(|s| *s == site)
    }

    /// Pod sites permitted while `sensor` is the active sensor site
    pub fn compatible_pod_sites(&self, sensor: Site) -> Result<&[Site]> {
        self.compatibility
            .get(&sensor)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                Error::UnknownSite(format!("{} has no pod compatibility entry", sensor))
            })
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors (empty if valid)
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.sensor_sequence.is_empty() {
            errors.push("Sensor sequence is empty".to_string());
            return errors;
        }

        let distinct: HashSet<_> = self.sensor_sequence.iter().collect();
        if distinct.len() < 2 {
            errors.push("Sensor sequence must contain at least two distinct sites".to_string());
        }

        // Adjacent slots, including the wrap from last back to first
        let len = self.sensor_sequence.len();
        if len > 1 {
            for i in 0..len {
                let next = (i + 1) % len;
                if self.sensor_sequence[i] == self.sensor_sequence[next] {
                    errors.push(format!(
                        "Sensor sequence slots {} and {} are both {}",
                        i, next, self.sensor_sequence[i]
                    ));
                }
            }
        }

        for site in distinct {
            match self.compatibility.get(site) {
                None => errors.push(format!("Sensor site {} has no pod compatibility entry", site)),
                Some(pods) if pods.is_empty() => {
                    errors.push(format!("Sensor site {} permits no pod sites", site))
                }
                Some(_) => {}
            }
        }

        errors
    }

    /// Fail with `Error::Catalog` if `validate()` reports anything
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Catalog(errors.join("; ")))
        }
    }
}
