//! Forecast of upcoming sensor and pod changes.
//!
//! Both rotations are walked forward from their last change dates on their
//! own fixed intervals until the horizon end date. Pod choices follow the
//! sensor slot that is current at the time each pod is generated.

use crate::pod::PodSelector;
use crate::sensor::next_sensor;
use crate::{ChangeEvent, DeviceKind, Error, Result, RotationCatalog, Site};
use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default forecast length in weeks
pub const DEFAULT_FORECAST_WEEKS: u32 = 4;

/// How far ahead to project
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Horizon {
    /// Relative to today
    Weeks(u32),
    /// Fixed end date (inclusive)
    Until(NaiveDate),
}

impl Default for Horizon {
    fn default() -> Self {
        Horizon::Weeks(DEFAULT_FORECAST_WEEKS)
    }
}

impl Horizon {
    /// Last date (inclusive) a change may fall on
    pub fn end_date(&self, today: NaiveDate) -> Result<NaiveDate> {
        match *self {
            Horizon::Weeks(weeks) => add_days(today, u64::from(weeks) * 7),
            Horizon::Until(date) => Ok(date),
        }
    }
}

/// Ordering of forecast lines
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForecastOrder {
    /// By date; same-day events keep generation order (pod first)
    #[default]
    Chronological,
    /// By the formatted "Mon DD, YYYY: ..." line, as plain text
    Legacy,
}

/// Everything the generator needs to know about the current session
#[derive(Clone, Debug)]
pub struct ForecastPlan {
    pub pod_last_date: NaiveDate,
    pub sensor_last_date: NaiveDate,
    pub sensor_site: Site,
    pub sensor_index: usize,
    pub horizon_end: NaiveDate,
    pub pod_interval_days: u32,
    pub sensor_interval_days: u32,
    pub order: ForecastOrder,
}

/// Ordered list of projected changes
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct Forecast {
    events: Vec<ChangeEvent>,
}

impl Forecast {
    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events for one device
    pub fn count(&self, kind: DeviceKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Events for one device, in forecast order
    pub fn of_kind(&self, kind: DeviceKind) -> impl Iterator<Item = &ChangeEvent> + '_ {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// One "Date: Kind Change -> Site" line per event
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    /// Newline-joined lines
    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| Error::Other(format!("Date overflow adding {} days to {}", days, date)))
}

/// Project sensor and pod changes up to `plan.horizon_end`
///
/// Pod selections go through `selector`, so its recency history advances
/// with every projected pod change. Pass a clone to keep the caller's history intact.
pub fn forecast<R: Rng>(
    catalog: &RotationCatalog,
    selector: &mut PodSelector<R>,
    plan: &ForecastPlan,
) -> Result<Forecast> {
    if plan.pod_interval_days == 0 || plan.sensor_interval_days == 0 {
        return Err(Error::Config(
            "Change intervals must be at least one day".into(),
        ));
    }

    let end = plan.horizon_end;
    let mut next_pod_date = add_days(plan.pod_last_date, u64::from(plan.pod_interval_days))?;
    let mut next_sensor_date =
        add_days(plan.sensor_last_date, u64::from(plan.sensor_interval_days))?;
    let mut index = plan.sensor_index;
    let mut last_sensor = plan.sensor_site;
    let mut events = Vec::new();

    while next_pod_date <= end || next_sensor_date <= end {
        if next_pod_date <= end {
            let sensor_now = catalog.sensor_site_at(index)?;
            let site = selector.next_pod(catalog, sensor_now)?;
            events.push(ChangeEvent {
                date: next_pod_date,
                kind: DeviceKind::Pod,
                site,
            });
            next_pod_date = add_days(next_pod_date, u64::from(plan.pod_interval_days))?;
        }

        if next_sensor_date <= end {
            let (site, next_index) = next_sensor(catalog, last_sensor, index)?;
            events.push(ChangeEvent {
                date: next_sensor_date,
                kind: DeviceKind::Sensor,
                site,
            });
            last_sensor = site;
            index = next_index;
            next_sensor_date = add_days(next_sensor_date, u64::from(plan.sensor_interval_days))?;
        }
    }

    match plan.order {
        ForecastOrder::Chronological => events.sort_by_key(|e| e.date),
        ForecastOrder::Legacy => events.sort_by_cached_key(|e| e.to_string()),
    }

    tracing::debug!(
        "Forecast through {}: {} events ({} pod, {} sensor)",
        end,
        events.len(),
        events.iter().filter(|e| e.kind == DeviceKind::Pod).count(),
        events.iter().filter(|e| e.kind == DeviceKind::Sensor).count()
    );

    Ok(Forecast { events })
}
