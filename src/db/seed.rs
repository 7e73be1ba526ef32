use chrono::{Duration, SecondsFormat, Utc};
use rand::Rng;
use rusqlite::params;
use tracing::info;

use crate::db::pool::DbPool;

const DRIVERS: [&str; 5] = [
    "João Silva",
    "Maria Oliveira",
    "Carlos Santos",
    "Ana Pereira",
    "Pedro Souza",
];

const DEVICES: [(&str, &str, &str, Option<i64>); 6] = [
    ("DEV001", "Tracker X1", "ABC1234", Some(1)),
    ("DEV002", "Tracker X1", "DEF5678", Some(2)),
    ("DEV003", "Tracker X2", "GHI9012", Some(3)),
    ("DEV004", "Tracker X2", "JKL3456", Some(4)),
    ("DEV005", "Tracker X3", "MNO7890", Some(5)),
    ("DEV006", "Tracker X3", "PQR1234", None),
];

const POSITIONS_PER_DEVICE: usize = 20;

/// Replaces the database contents with the sample fleet. Existing rows are
/// cleared in reverse dependency order and the autoincrement counters are
/// reset, so seeding always yields the same driver and device ids.
pub fn run(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Starting database seeding");

    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM positions", [])?;
    tx.execute("DELETE FROM devices", [])?;
    tx.execute("DELETE FROM drivers", [])?;
    tx.execute(
        "DELETE FROM sqlite_sequence WHERE name IN ('drivers', 'devices', 'positions')",
        [],
    )?;

    info!("Inserting drivers");
    for name in DRIVERS {
        tx.execute("INSERT INTO drivers (name) VALUES (?1)", [name])?;
    }

    info!("Inserting devices");
    for (identifier, model, vehicle_plate, driver_id) in DEVICES {
        tx.execute(
            "INSERT INTO devices (identifier, model, vehicle_plate, driver_id) \
             VALUES (?1, ?2, ?3, ?4)",
            params![identifier, model, vehicle_plate, driver_id],
        )?;
    }

    info!("Inserting positions");
    let mut rng = rand::thread_rng();
    for device_id in 1..=DEVICES.len() as i64 {
        for _ in 0..POSITIONS_PER_DEVICE {
            // Scattered around São Paulo, collected over the trailing 24 hours.
            let latitude = -23.55 + (rng.gen_range(0.0..1.0) - 0.5) * 0.1;
            let longitude = -46.64 + (rng.gen_range(0.0..1.0) - 0.5) * 0.1;
            let speed = f64::from(rng.gen_range(0..120));
            let direction = rng.gen_range(0..360_i64);
            let age_ms = rng.gen_range(0..24 * 60 * 60 * 1000_i64);
            let collected_at = (Utc::now() - Duration::milliseconds(age_ms))
                .to_rfc3339_opts(SecondsFormat::Millis, true);

            tx.execute(
                "INSERT INTO positions (device_id, latitude, longitude, speed, direction, collected_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![device_id, latitude, longitude, speed, direction, collected_at],
            )?;
        }
    }

    tx.commit()?;
    info!("Database seeding completed successfully");
    Ok(())
}
