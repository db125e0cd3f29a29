//! Sensor rotation: step through the cyclic sensor sequence.

use crate::{Error, Result, RotationCatalog, Site};

/// Advance to the next sensor site after `current` at `index`
///
/// Moves one slot forward (wrapping) and keeps moving while the slot holds
/// the same site as `current`, so the suggestion never repeats the site the
/// sensor is leaving. `index` only needs to be a position in the sequence;
/// it does not have to hold `current`.
///
/// Returns the new site and the slot it came from.
pub fn next_sensor(catalog: &RotationCatalog, current: Site, index: usize) -> Result<(Site, usize)> {
    let len = catalog.len();
    if len == 0 {
        return Err(Error::Catalog("Sensor sequence is empty".into()));
    }

    let mut next_index = (index + 1) % len;
    // At most one lap before every slot has been seen
    for _ in 0..len {
        let candidate = catalog.sensor_sequence[next_index];
        if candidate != current {
            tracing::debug!(
                "Sensor rotation: {} (slot {}) -> {} (slot {})",
                current,
                index % len,
                candidate,
                next_index
            );
            return Ok((candidate, next_index));
        }
        next_index = (next_index + 1) % len;
    }

    Err(Error::Catalog(format!(
        "Sensor sequence has no site other than {}",
        current
    )))
}
