use rusqlite::Row;
use serde::Serialize;

/// A driver row as the API serves it.
#[derive(Debug, Serialize)]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

impl Driver {
    /// Maps a `SELECT id, name, created_at` row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

/// A device row joined with its driver's name. Reads always go through the
/// same LEFT JOIN, so `driver_name` is present in every device response.
#[derive(Debug, Serialize)]
pub struct Device {
    pub id: i64,
    pub identifier: String,
    pub model: Option<String>,
    pub vehicle_plate: Option<String>,
    pub driver_id: Option<i64>,
    pub created_at: String,
    pub driver_name: Option<String>,
}

impl Device {
    /// Maps a row of [`Device::SELECT`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            identifier: row.get(1)?,
            model: row.get(2)?,
            vehicle_plate: row.get(3)?,
            driver_id: row.get(4)?,
            created_at: row.get(5)?,
            driver_name: row.get(6)?,
        })
    }

    pub const SELECT: &'static str = "SELECT d.id, d.identifier, d.model, d.vehicle_plate, \
         d.driver_id, d.created_at, dr.name AS driver_name \
         FROM devices d LEFT JOIN drivers dr ON d.driver_id = dr.id";
}

/// One telemetry sample from a device.
#[derive(Debug, Serialize)]
pub struct Position {
    pub id: i64,
    pub device_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: Option<f64>,
    pub direction: Option<i64>,
    pub collected_at: String,
    pub created_at: String,
}

impl Position {
    /// Maps a `SELECT id, device_id, latitude, longitude, speed, direction,
    /// collected_at, created_at` row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            device_id: row.get(1)?,
            latitude: row.get(2)?,
            longitude: row.get(3)?,
            speed: row.get(4)?,
            direction: row.get(5)?,
            collected_at: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use serde_json::json;

    use super::*;
    use crate::db::migrate::DB_SCHEMA;

    fn fleet_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(DB_SCHEMA).unwrap();
        conn.execute_batch(
            "INSERT INTO drivers (name) VALUES ('Alice');
             INSERT INTO devices (identifier, model, vehicle_plate, driver_id)
                 VALUES ('DEV001', 'X1', 'ABC1234', 1), ('DEV002', NULL, NULL, NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn device_join_carries_the_driver_name() {
        let conn = fleet_conn();
        let sql = format!("{} ORDER BY d.id", Device::SELECT);
        let mut stmt = conn.prepare(&sql).unwrap();
        let devices: Vec<Device> = stmt
            .query_map([], Device::from_row)
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].driver_name.as_deref(), Some("Alice"));
        assert!(devices[1].driver_name.is_none());
        assert!(devices[1].model.is_none());
    }

    #[test]
    fn serialized_device_includes_nullable_fields() {
        let conn = fleet_conn();
        let sql = format!("{} WHERE d.id = 2", Device::SELECT);
        let device = conn.query_row(&sql, [], |row| Device::from_row(row)).unwrap();

        let value = serde_json::to_value(&device).unwrap();
        assert_eq!(value["identifier"], json!("DEV002"));
        assert_eq!(value["driver_id"], json!(null));
        assert_eq!(value["driver_name"], json!(null));
    }
}
