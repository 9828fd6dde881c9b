use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::db::{LevelRow, TankSettingsRow};

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_SAMPLE_COUNT: usize = 390;

const DEFAULT_HEIGHT: f64 = 100.0;
const DEFAULT_CAPACITY: f64 = 0.0;

/// Tank geometry after normalization. Missing or unreadable settings fall
/// back to {height: 100, capacity: 0}.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankSettings {
    pub height: f64,
    pub capacity: f64,
}

impl Default for TankSettings {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl TankSettings {
    pub fn from_row(row: Option<TankSettingsRow>) -> Self {
        let row = row.unwrap_or_default();
        Self {
            height: row.height.unwrap_or(DEFAULT_HEIGHT),
            capacity: row.capacity.unwrap_or(DEFAULT_CAPACITY),
        }
    }
}

/// Level history in chronological order, plus the newest reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelSeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub oil: Vec<f64>,
    pub water: Vec<f64>,
    /// `[oil, water]` from the newest reading, `[0, 0]` when no readings
    /// exist.
    pub current: [f64; 2],
}

impl LevelSeries {
    /// Builds chart series from rows ordered newest-first.
    pub fn from_rows(rows: &[LevelRow]) -> Self {
        let current = rows.first().map_or([0.0, 0.0], |row| [row.oil, row.water]);

        let mut series = Self {
            timestamps: Vec::with_capacity(rows.len()),
            oil: Vec::with_capacity(rows.len()),
            water: Vec::with_capacity(rows.len()),
            current,
        };
        for row in rows.iter().rev() {
            series.timestamps.push(row.timestamp);
            series.oil.push(row.oil);
            series.water.push(row.water);
        }
        series
    }

    /// Timestamp of the newest reading on display.
    pub fn newest(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }
}

/// Absolute levels as percentages of the configured height, 0 when the
/// height is not positive.
pub fn normalized(levels: [f64; 2], height: f64) -> [f64; 2] {
    levels.map(|v| if height > 0.0 { v / height * 100.0 } else { 0.0 })
}
