//! Pod site selection.
//!
//! A pod site is drawn at random from the sites the compatibility map allows
//! for the active sensor site, after removing:
//! - the same-side stomach site when the sensor sits on the stomach
//! - the pod sites used most recently (the recency buffer)
//!
//! If those exclusions leave nothing, the full compatible set is used instead,
//! so a selection always succeeds for a valid catalog.

use crate::{Error, Result, RotationCatalog, Site};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// How many previous pod sites are excluded by default
pub const DEFAULT_RECENCY_DEPTH: usize = 2;

/// Bounded history of the most recently chosen pod sites (oldest first)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecencyBuffer {
    depth: usize,
    sites: VecDeque<Site>,
}

impl RecencyBuffer {
    /// Empty buffer remembering at most `depth` sites
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            sites: VecDeque::with_capacity(depth),
        }
    }

    /// Buffer pre-filled with `sites` (oldest first), trimmed to `depth`
    pub fn with_sites(depth: usize, sites: impl IntoIterator<Item = Site>) -> Self {
        let mut buffer = Self::new(depth);
        for site in sites {
            buffer.push(site);
        }
        buffer
    }

    /// Record a site, dropping the oldest entry once over capacity
    pub fn push(&mut self, site: Site) {
        self.sites.push_back(site);
        while self.sites.len() > self.depth {
            self.sites.pop_front();
        }
    }

    pub fn contains(&self, site: Site) -> bool {
        self.sites.contains(&site)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Site> + '_ {
        self.sites.iter().copied()
    }

    /// Most recently recorded site
    pub fn last(&self) -> Option<Site> {
        self.sites.back().copied()
    }
}

impl Default for RecencyBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_RECENCY_DEPTH)
    }
}

/// Gets the final say on a pod placement
///
/// Called with the computed suggestion and every site the compatibility map
/// allows for the active sensor. Returning a site outside that set is
/// ignored and the suggestion is kept.
pub trait PlacementDecider {
    fn decide(&mut self, suggested: Site, compatible: &[Site]) -> Site;
}

/// Default decider: always takes the suggestion
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptSuggestion;

impl PlacementDecider for AcceptSuggestion {
    fn decide(&mut self, suggested: Site, _compatible: &[Site]) -> Site {
        suggested
    }
}

impl<F> PlacementDecider for F
where
    F: FnMut(Site, &[Site]) -> Site,
{
    fn decide(&mut self, suggested: Site, compatible: &[Site]) -> Site {
        self(suggested, compatible)
    }
}

/// Random pod site selector with its own recency history
#[derive(Clone, Debug)]
pub struct PodSelector<R = StdRng> {
    rng: R,
    recent: RecencyBuffer,
}

impl PodSelector<StdRng> {
    /// Deterministic selector: the same seed yields the same suggestions
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), RecencyBuffer::default())
    }

    /// Selector seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy(), RecencyBuffer::default())
    }

    /// Seeded when `seed` is given, entropy otherwise
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> PodSelector<R> {
    pub fn new(rng: R, recent: RecencyBuffer) -> Self {
        Self { rng, recent }
    }

    /// Replace the recency history, e.g. to change its depth
    pub fn with_recent(mut self, recent: RecencyBuffer) -> Self {
        self.recent = recent;
        self
    }

    pub fn recent(&self) -> &RecencyBuffer {
        &self.recent
    }

    /// Record a pod site placed outside the selector (e.g. at session start)
    pub fn remember(&mut self, site: Site) {
        self.recent.push(site);
    }

    /// Sites eligible for the next pod while `sensor` is active
    ///
    /// Never empty for a valid catalog: falls back to the full compatible
    /// set when the exclusions remove every site.
    pub fn candidates(&self, catalog: &RotationCatalog, sensor: Site) -> Result<Vec<Site>> {
        let compatible = catalog.compatible_pod_sites(sensor)?;
        let mut candidates = compatible.to_vec();

        if sensor.is_stomach() {
            let same_side = sensor.same_side_stomach();
            candidates.retain(|site| *site != same_side);
        }

        candidates.retain(|site| !self.recent.contains(*site));

        if candidates.is_empty() {
            tracing::debug!(
                "All pod sites for sensor at {} excluded by recent history, using full set",
                sensor
            );
            return Ok(compatible.to_vec());
        }

        tracing::debug!("Pod candidates for sensor at {}: {:?}", sensor, candidates);
        Ok(candidates)
    }

    /// Choose the next pod site and record it in the recency buffer
    pub fn next_pod(&mut self, catalog: &RotationCatalog, sensor: Site) -> Result<Site> {
        self.next_pod_with(catalog, sensor, &mut AcceptSuggestion)
    }

    /// Like `next_pod`, but lets `decider` override the suggestion
    pub fn next_pod_with(
        &mut self,
        catalog: &RotationCatalog,
        sensor: Site,
        decider: &mut dyn PlacementDecider,
    ) -> Result<Site> {
        let candidates = self.candidates(catalog, sensor)?;
        let suggested = *candidates.choose(&mut self.rng).ok_or_else(|| {
            Error::Catalog(format!("Sensor site {} permits no pod sites", sensor))
        })?;

        let compatible = catalog.compatible_pod_sites(sensor)?;
        let decided = decider.decide(suggested, compatible);
        let chosen = if compatible.contains(&decided) {
            decided
        } else {
            tracing::warn!(
                "Override {} is not allowed with the sensor at {}, keeping {}",
                decided,
                sensor,
                suggested
            );
            suggested
        };

        self.recent.push(chosen);
        Ok(chosen)
    }
}
