//! Core domain types for the site rotation planner.
//!
//! This module defines the fundamental types used throughout the system:
//! - Body sites and their derived side
//! - Device kinds (sensor, pod) and their current placement
//! - Change events produced by the forecast
//! - The rotation catalog (sensor sequence and pod compatibility)

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Site Types
// ============================================================================

/// Side of the body a site sits on
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// A named body location used for sensor or pod placement
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    LeftStomach,
    RightStomach,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl Site {
    /// Every site, in a stable order
    pub const ALL: [Site; 6] = [
        Site::LeftStomach,
        Site::RightStomach,
        Site::LeftArm,
        Site::RightArm,
        Site::LeftLeg,
        Site::RightLeg,
    ];

    /// Human-readable label, e.g. "Right Stomach"
    pub fn label(self) -> &'static str {
        match self {
            Site::LeftStomach => "Left Stomach",
            Site::RightStomach => "Right Stomach",
            Site::LeftArm => "Left Arm",
            Site::RightArm => "Right Arm",
            Site::LeftLeg => "Left Leg",
            Site::RightLeg => "Right Leg",
        }
    }

    /// Side derived from the label: "Left" implies left, anything else right
    pub fn side(self) -> Side {
        if self.label().contains("Left") {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn is_stomach(self) -> bool {
        matches!(self, Site::LeftStomach | Site::RightStomach)
    }

    /// The stomach site on the same side as this one
    pub fn same_side_stomach(self) -> Site {
        match self.side() {
            Side::Left => Site::LeftStomach,
            Side::Right => Site::RightStomach,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Site {
    type Err = Error;

    /// Accepts labels ("Left Arm"), any casing, and snake_case keys ("left_arm")
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s
            .replace('_', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        Site::ALL
            .iter()
            .copied()
            .find(|site| site.label().to_lowercase() == normalized)
            .ok_or_else(|| Error::UnknownSite(s.trim().to_string()))
    }
}

// ============================================================================
// Device and Event Types
// ============================================================================

/// Which device a change applies to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Sensor,
    Pod,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Sensor => f.write_str("Sensor"),
            DeviceKind::Pod => f.write_str("Pod"),
        }
    }
}

/// Where a device currently sits and when it was put there
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub site: Site,
    pub changed_on: NaiveDate,
}

/// A projected device change
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeEvent {
    pub date: NaiveDate,
    pub kind: DeviceKind,
    pub site: Site,
}

impl fmt::Display for ChangeEvent {
    /// Formats as "Jun 03, 2025: Pod Change -> Left Arm"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} Change -> {}",
            self.date.format("%b %d, %Y"),
            self.kind,
            self.site
        )
    }
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The rotation rules: sensor sequence plus pod compatibility per sensor site
#[derive(Clone, Debug)]
pub struct RotationCatalog {
    pub sensor_sequence: Vec<Site>,
    pub compatibility: HashMap<Site, Vec<Site>>,
}

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`)
pub fn parse_iso_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|source| Error::InvalidDate {
        input: input.to_string(),
        source,
    })
}
