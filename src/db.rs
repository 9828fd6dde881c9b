// table and column names follow the hosted Supabase schema

use chrono::{DateTime, Utc};

pub type TankId = i64;

/// One row per monitored tank.
pub const TANKS: &str = "Tanque";
/// Append-only oil/water level history.
pub const LEVELS: &str = "Niveis";
/// Per-sensor FBG wavelength readings.
pub const SENSORS: &str = "Lambdas";

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct TankRow {
    #[serde(rename = "pk_tanque")]
    pub id: TankId,
    #[serde(rename = "nome_tanque")]
    pub name: String,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TankSettingsRow {
    #[serde(rename = "altura_tanque")]
    pub height: Option<f64>,
    #[serde(rename = "capacidade_operacional")]
    pub capacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct LevelRow {
    #[serde(rename = "nivel_oleo")]
    pub oil: f64,
    #[serde(rename = "nivel_agua")]
    pub water: f64,
    #[serde(rename = "data")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct SensorRow {
    /// Measured wavelength; 0 marks a failed sensor.
    #[serde(rename = "lambda_medido")]
    pub wavelength: f64,
    #[serde(rename = "data")]
    pub timestamp: DateTime<Utc>,
}
