//! Sensor status loading: latest-batch extraction, health metrics and the
//! request-counter/cache book-keeping behind the status readout.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::db::{SensorRow, TankId};

/// Minimum time the loading mask stays up on a first-time fetch, so a fast
/// response does not flicker.
pub const MIN_MASK: Duration = Duration::from_millis(200);

pub type ReqId = u64;

/// The batch of readings sharing the single most recent timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub wavelengths: Vec<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Extracts the current batch from rows ordered newest-first.
pub fn latest_snapshot(rows: &[SensorRow]) -> Option<Snapshot> {
    let newest = rows.first()?.timestamp;
    let wavelengths = rows
        .iter()
        .filter(|row| row.timestamp == newest)
        .map(|row| row.wavelength)
        .collect();
    Some(Snapshot {
        wavelengths,
        timestamp: newest,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorMetrics {
    pub total: usize,
    pub active: usize,
    pub failed: usize,
    pub percent_active: u32,
}

impl SensorMetrics {
    /// A zero wavelength counts as a failed sensor. The hosted schema does
    /// not distinguish a legitimate zero reading from an error flag; that
    /// ambiguity is part of the convention.
    pub fn from_wavelengths(wavelengths: &[f64]) -> Self {
        let total = wavelengths.len();
        let active = wavelengths.iter().filter(|w| **w != 0.0).count();
        let percent_active = if total > 0 {
            ((active as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        Self {
            total,
            active,
            failed: total - active,
            percent_active,
        }
    }

    pub fn tier(&self) -> StatusTier {
        StatusTier::from_percent(self.percent_active)
    }
}

/// Traffic-light classification of the sensor array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTier {
    Full,
    Good,
    Degraded,
    Critical,
}

impl StatusTier {
    pub fn from_percent(percent_active: u32) -> Self {
        match percent_active {
            100.. => Self::Full,
            90.. => Self::Good,
            60.. => Self::Degraded,
            _ => Self::Critical,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Full => "traffic-blue",
            Self::Good => "traffic-green",
            Self::Degraded => "traffic-yellow",
            Self::Critical => "traffic-red",
        }
    }
}

/// What the owning component must do after a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    pub req: ReqId,
    pub tank: TankId,
    /// True when no cache entry existed and the loading mask went up.
    pub masked: bool,
}

/// Time left on the loading mask, `None` once the minimum duration has
/// elapsed.
pub fn mask_remaining(elapsed: Duration) -> Option<Duration> {
    let remaining = MIN_MASK.checked_sub(elapsed)?;
    (!remaining.is_zero()).then_some(remaining)
}

/// Book-keeping for the sensor status readout: request counter, settled
/// marker and the per-tank cache. Pure state; timing and I/O stay with the
/// caller.
#[derive(Debug, Default)]
pub struct StatusLoader {
    counter: ReqId,
    settled: Option<TankId>,
    wavelengths: Vec<f64>,
    loading: bool,
    cache: HashMap<TankId, Snapshot>,
}

impl StatusLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a selection change and returns the fetch to issue, if any.
    /// Every call advances the request counter, so responses to earlier
    /// selections are discarded even when the new selection is empty.
    pub fn select(&mut self, tank: Option<TankId>) -> Option<FetchPlan> {
        self.counter += 1;
        let tank = match tank {
            Some(tank) => tank,
            None => {
                self.wavelengths.clear();
                self.loading = false;
                self.settled = None;
                return None;
            }
        };

        if let Some(cached) = self.cache.get(&tank) {
            // known tank: show the cached batch right away, refresh behind it
            self.wavelengths = cached.wavelengths.clone();
            self.settled = Some(tank);
            self.loading = false;
            Some(FetchPlan {
                req: self.counter,
                tank,
                masked: false,
            })
        } else {
            self.loading = true;
            Some(FetchPlan {
                req: self.counter,
                tank,
                masked: true,
            })
        }
    }

    /// Records a fetch result. A superseded response is discarded whole:
    /// no state update, no cache write. Returns whether it was applied.
    pub fn complete(&mut self, req: ReqId, tank: TankId, snapshot: Option<Snapshot>) -> bool {
        if req != self.counter {
            return false;
        }
        match snapshot {
            Some(snapshot) => {
                self.wavelengths = snapshot.wavelengths.clone();
                self.cache.insert(tank, snapshot);
            }
            // fetch error or empty result: zero sensors
            None => self.wavelengths.clear(),
        }
        true
    }

    /// Marks the tank's data as current and drops the loading flag, unless
    /// the request has been superseded.
    pub fn settle(&mut self, req: ReqId, tank: TankId) -> bool {
        if req != self.counter {
            return false;
        }
        self.settled = Some(tank);
        self.loading = false;
        true
    }

    /// True while the displayed batch does not belong to the selected tank.
    pub fn masked(&self, selected: Option<TankId>) -> bool {
        selected.is_some() && self.settled != selected
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn metrics(&self) -> SensorMetrics {
        SensorMetrics::from_wavelengths(&self.wavelengths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap()
    }

    fn snapshot(wavelengths: &[f64]) -> Snapshot {
        Snapshot {
            wavelengths: wavelengths.to_vec(),
            timestamp: ts(0),
        }
    }

    #[test]
    fn snapshot_keeps_only_the_newest_batch() {
        let rows = vec![
            SensorRow {
                wavelength: 1547.2,
                timestamp: ts(10),
            },
            SensorRow {
                wavelength: 0.0,
                timestamp: ts(10),
            },
            SensorRow {
                wavelength: 1551.8,
                timestamp: ts(10),
            },
            SensorRow {
                wavelength: 1546.9,
                timestamp: ts(5),
            },
        ];

        let snap = latest_snapshot(&rows).unwrap();
        assert_eq!(snap.timestamp, ts(10));
        assert_eq!(snap.wavelengths, vec![1547.2, 0.0, 1551.8]);
    }

    #[test]
    fn snapshot_of_nothing_is_none() {
        assert_eq!(latest_snapshot(&[]), None);
    }

    #[test]
    fn metrics_add_up() {
        let metrics = SensorMetrics::from_wavelengths(&[1547.2, 0.0, 1551.8]);
        assert_eq!(metrics.total, 3);
        assert_eq!(metrics.active, 2);
        assert_eq!(metrics.failed, 1);
        assert_eq!(metrics.active + metrics.failed, metrics.total);
        assert_eq!(metrics.percent_active, 67);
    }

    #[test]
    fn metrics_of_no_sensors() {
        let metrics = SensorMetrics::from_wavelengths(&[]);
        assert_eq!(metrics.total, 0);
        assert_eq!(metrics.percent_active, 0);
        assert_eq!(metrics.tier(), StatusTier::Critical);
    }

    #[test]
    fn tier_thresholds() {
        assert_eq!(StatusTier::from_percent(100), StatusTier::Full);
        assert_eq!(StatusTier::from_percent(99), StatusTier::Good);
        assert_eq!(StatusTier::from_percent(90), StatusTier::Good);
        assert_eq!(StatusTier::from_percent(89), StatusTier::Degraded);
        assert_eq!(StatusTier::from_percent(60), StatusTier::Degraded);
        assert_eq!(StatusTier::from_percent(59), StatusTier::Critical);
        assert_eq!(StatusTier::from_percent(0), StatusTier::Critical);
    }

    #[test]
    fn mask_duration_is_enforced() {
        assert_eq!(
            mask_remaining(Duration::ZERO),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            mask_remaining(Duration::from_millis(150)),
            Some(Duration::from_millis(50))
        );
        assert_eq!(mask_remaining(Duration::from_millis(200)), None);
        assert_eq!(mask_remaining(Duration::from_millis(500)), None);
    }

    #[test]
    fn first_selection_masks_until_settled() {
        let mut loader = StatusLoader::new();
        let plan = loader.select(Some(1)).unwrap();
        assert!(plan.masked);
        assert!(loader.loading());
        assert!(loader.masked(Some(1)));

        assert!(loader.complete(plan.req, plan.tank, Some(snapshot(&[1547.2, 0.0]))));
        // values land before the mask lifts
        assert!(loader.masked(Some(1)));

        assert!(loader.settle(plan.req, plan.tank));
        assert!(!loader.masked(Some(1)));
        assert!(!loader.loading());
        assert_eq!(loader.metrics().active, 1);
    }

    #[test]
    fn cached_tank_settles_without_mask() {
        let mut loader = StatusLoader::new();
        let plan = loader.select(Some(1)).unwrap();
        loader.complete(plan.req, 1, Some(snapshot(&[1547.2, 0.0])));
        loader.settle(plan.req, 1);

        loader.select(Some(2));
        let back = loader.select(Some(1)).unwrap();
        assert!(!back.masked);
        assert!(!loader.loading());
        assert!(!loader.masked(Some(1)));
        assert_eq!(loader.wavelengths(), &[1547.2, 0.0]);
    }

    #[test]
    fn second_selection_wins_the_race() {
        let mut loader = StatusLoader::new();
        let first = loader.select(Some(1)).unwrap();
        let second = loader.select(Some(2)).unwrap();

        // the older fetch resolves after the newer one started
        assert!(!loader.complete(first.req, 1, Some(snapshot(&[9.0]))));
        assert!(!loader.settle(first.req, 1));
        assert!(loader.masked(Some(2)));

        assert!(loader.complete(second.req, 2, Some(snapshot(&[1547.2, 1551.8]))));
        assert!(loader.settle(second.req, 2));
        assert_eq!(loader.wavelengths(), &[1547.2, 1551.8]);

        // the discarded response never reached the cache
        let replay = loader.select(Some(1)).unwrap();
        assert!(replay.masked);
    }

    #[test]
    fn deselect_resets_and_orphans_inflight_fetch() {
        let mut loader = StatusLoader::new();
        let plan = loader.select(Some(1)).unwrap();
        assert!(loader.select(None).is_none());
        assert!(!loader.loading());
        assert!(!loader.masked(None));

        assert!(!loader.complete(plan.req, plan.tank, Some(snapshot(&[1547.2]))));
        assert!(loader.wavelengths().is_empty());
    }

    #[test]
    fn failed_fetch_counts_as_zero_sensors() {
        let mut loader = StatusLoader::new();
        let plan = loader.select(Some(1)).unwrap();
        assert!(loader.complete(plan.req, plan.tank, None));
        assert!(loader.settle(plan.req, plan.tank));
        assert_eq!(loader.metrics().total, 0);
        assert_eq!(loader.metrics().percent_active, 0);
    }

    #[test]
    fn refresh_overwrites_the_cache_entry() {
        let mut loader = StatusLoader::new();
        let plan = loader.select(Some(1)).unwrap();
        loader.complete(plan.req, 1, Some(snapshot(&[1547.2])));
        loader.settle(plan.req, 1);

        // cached re-selection still refreshes and replaces the entry
        loader.select(Some(2));
        let back = loader.select(Some(1)).unwrap();
        let newer = Snapshot {
            wavelengths: vec![1548.0, 1550.0],
            timestamp: ts(30),
        };
        assert!(loader.complete(back.req, 1, Some(newer)));
        assert!(loader.settle(back.req, 1));

        loader.select(Some(2));
        let again = loader.select(Some(1)).unwrap();
        assert!(!again.masked);
        assert_eq!(loader.wavelengths(), &[1548.0, 1550.0]);
    }
}
