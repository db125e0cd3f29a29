//! Session state: where the sensor and pod sit now, and what comes next.
//!
//! A `Session` owns everything the rotation needs between changes: both
//! placements, the slot in the sensor sequence, and the pod selector with its
//! recency history. Every change goes through `&mut self`.

use crate::config::ScheduleConfig;
use crate::forecast::{self, Forecast, ForecastOrder, ForecastPlan, Horizon};
use crate::pod::{AcceptSuggestion, PlacementDecider, PodSelector};
use crate::sensor::next_sensor;
use crate::types::parse_iso_date;
use crate::{Error, Placement, Result, RotationCatalog, Site};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::Rng;

/// Values a user supplies to begin tracking
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStart {
    pub sensor_site: Site,
    pub pod_site: Site,
    pub sensor_changed_on: NaiveDate,
    pub pod_changed_on: NaiveDate,
    /// Explicit sensor sequence slot; aligned to `sensor_site` when absent
    pub sensor_index: Option<usize>,
}

impl SessionStart {
    /// Build from raw labels and `YYYY-MM-DD` dates
    pub fn parse(sensor_site: &str, pod_site: &str, sensor_date: &str, pod_date: &str) -> Result<Self> {
        Ok(Self {
            sensor_site: sensor_site.parse()?,
            pod_site: pod_site.parse()?,
            sensor_changed_on: parse_iso_date(sensor_date)?,
            pod_changed_on: parse_iso_date(pod_date)?,
            sensor_index: None,
        })
    }

    pub fn with_sensor_index(mut self, index: usize) -> Self {
        self.sensor_index = Some(index);
        self
    }
}

/// A running rotation session
#[derive(Debug)]
pub struct Session<'c, R = StdRng> {
    catalog: &'c RotationCatalog,
    schedule: ScheduleConfig,
    sensor: Placement,
    pod: Placement,
    sensor_index: usize,
    selector: PodSelector<R>,
}

impl<'c, R: Rng> Session<'c, R> {
    /// Begin a session
    ///
    /// Fails if the catalog does not validate, or if no sensor slot can be
    /// found for the starting sensor site. The starting pod site is recorded
    /// in the selector's history so the first pod change moves away from it.
    pub fn start(
        catalog: &'c RotationCatalog,
        start: SessionStart,
        mut selector: PodSelector<R>,
    ) -> Result<Self> {
        catalog.ensure_valid()?;

        let sensor_index = match start.sensor_index {
            Some(index) => index % catalog.len(),
            None => catalog.position_of(start.sensor_site).ok_or_else(|| {
                Error::UnknownSite(format!(
                    "{} is not in the sensor sequence",
                    start.sensor_site
                ))
            })?,
        };
        catalog.compatible_pod_sites(start.sensor_site)?;

        selector.remember(start.pod_site);

        tracing::info!(
            "Session started: sensor {} on {} (slot {}), pod {} on {}",
            start.sensor_site,
            start.sensor_changed_on,
            sensor_index,
            start.pod_site,
            start.pod_changed_on
        );

        Ok(Self {
            catalog,
            schedule: ScheduleConfig::default(),
            sensor: Placement {
                site: start.sensor_site,
                changed_on: start.sensor_changed_on,
            },
            pod: Placement {
                site: start.pod_site,
                changed_on: start.pod_changed_on,
            },
            sensor_index,
            selector,
        })
    }

    /// Use non-default change intervals
    pub fn with_schedule(mut self, schedule: ScheduleConfig) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn sensor(&self) -> Placement {
        self.sensor
    }

    pub fn pod(&self) -> Placement {
        self.pod
    }

    pub fn sensor_index(&self) -> usize {
        self.sensor_index
    }

    pub fn selector(&self) -> &PodSelector<R> {
        &self.selector
    }

    /// Two-line summary of both placements
    pub fn confirmation(&self) -> String {
        format!(
            "Sensor: {} (Changed on {})\nPod: {} (Changed on {})",
            self.sensor.site, self.sensor.changed_on, self.pod.site, self.pod.changed_on
        )
    }

    /// Move the sensor to its next site as of `today`
    pub fn change_sensor(&mut self, today: NaiveDate) -> Result<Site> {
        let (site, index) = next_sensor(self.catalog, self.sensor.site, self.sensor_index)?;
        tracing::info!("Sensor change: {} -> {} on {}", self.sensor.site, site, today);

        self.sensor = Placement {
            site,
            changed_on: today,
        };
        self.sensor_index = index;
        Ok(site)
    }

    /// Move the pod to a freshly selected site as of `today`
    pub fn change_pod(&mut self, today: NaiveDate) -> Result<Site> {
        self.change_pod_with(today, &mut AcceptSuggestion)
    }

    /// Like `change_pod`, letting `decider` override the suggestion
    pub fn change_pod_with(
        &mut self,
        today: NaiveDate,
        decider: &mut dyn PlacementDecider,
    ) -> Result<Site> {
        let sensor_now = self.catalog.sensor_site_at(self.sensor_index)?;
        let site = self
            .selector
            .next_pod_with(self.catalog, sensor_now, decider)?;
        tracing::info!("Pod change: {} -> {} on {}", self.pod.site, site, today);

        self.pod = Placement {
            site,
            changed_on: today,
        };
        Ok(site)
    }

    /// Forecast inputs for the current state
    pub fn plan(&self, today: NaiveDate, horizon: Horizon, order: ForecastOrder) -> Result<ForecastPlan> {
        Ok(ForecastPlan {
            pod_last_date: self.pod.changed_on,
            sensor_last_date: self.sensor.changed_on,
            sensor_site: self.sensor.site,
            sensor_index: self.sensor_index,
            horizon_end: horizon.end_date(today)?,
            pod_interval_days: self.schedule.pod_interval_days,
            sensor_interval_days: self.schedule.sensor_interval_days,
            order,
        })
    }
}

impl<'c, R: Rng + Clone> Session<'c, R> {
    /// Project upcoming changes without touching the session
    ///
    /// Runs on a copy of the pod selector, so the next real pod change is
    /// drawn exactly like the first projected one.
    pub fn forecast(&self, today: NaiveDate, horizon: Horizon, order: ForecastOrder) -> Result<Forecast> {
        let plan = self.plan(today, horizon, order)?;
        let mut selector = self.selector.clone();
        forecast::forecast(self.catalog, &mut selector, &plan)
    }
}
