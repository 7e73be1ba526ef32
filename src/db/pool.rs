use r2d2::ManageConnection;
use rusqlite::Connection;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

pub struct SqliteConnectionManager {
    database_path: String,
}

impl SqliteConnectionManager {
    pub fn new(database_path: String) -> Self {
        Self { database_path }
    }
}

impl ManageConnection for SqliteConnectionManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let conn = Connection::open(&self.database_path)?;
        // SQLite leaves the schema's ON DELETE clauses inert unless this is on.
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        conn.query_row("SELECT 1", [], |_row| Ok(()))
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
