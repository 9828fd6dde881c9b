use anyhow::Result;

use crate::db::{self, LevelRow, SensorRow, TankId, TankRow, TankSettingsRow};
use crate::supabase::Supabase;

/// All known tanks, ordered by display name.
pub async fn tanks(supabase: &Supabase) -> Result<Vec<TankRow>> {
    supabase
        .from(db::TANKS)
        .select("pk_tanque, nome_tanque")
        .order("nome_tanque", true)
        .fetch()
        .await
}

pub async fn tank_settings(supabase: &Supabase, tank: TankId) -> Result<TankSettingsRow> {
    supabase
        .from(db::TANKS)
        .select("altura_tanque, capacidade_operacional")
        .eq("pk_tanque", tank)
        .single()
        .await
}

/// The most recent `limit` level readings, newest first.
pub async fn level_readings(
    supabase: &Supabase,
    tank: TankId,
    limit: usize,
) -> Result<Vec<LevelRow>> {
    supabase
        .from(db::LEVELS)
        .select("nivel_agua, nivel_oleo, data")
        .eq("fk_tanque", tank)
        .order("data", false)
        .limit(limit)
        .fetch()
        .await
}

/// Every sensor reading for the tank, newest first.
pub async fn sensor_readings(supabase: &Supabase, tank: TankId) -> Result<Vec<SensorRow>> {
    supabase
        .from(db::SENSORS)
        .select("lambda_medido, data")
        .eq("fk_tanque", tank)
        .order("data", false)
        .fetch()
        .await
}
