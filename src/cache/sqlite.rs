//! SQLite implementation of the icon store

use crate::cache::store::{ColumnSet, IconStore, StoredRow};
use crate::error::{IconCacheError, IconCacheResult};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

/// Bumped whenever the table layout or icon encoding changes
pub const SCHEMA_VERSION: i64 = 3;

const LOW_RES_COLUMNS: &str =
    "component, profile_id, label, content_description, icon_color, system_state, last_updated";
const HIGH_RES_COLUMNS: &str =
    "component, profile_id, label, content_description, icon_color, system_state, last_updated, icon";

/// Icon table in a SQLite database
pub struct SqliteIconStore {
    conn: Connection,
}

impl SqliteIconStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> IconCacheResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        debug!("Opened icon database at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> IconCacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Create the table, recreating it when an older layout is found
    fn init_schema(&self) -> IconCacheResult<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version > SCHEMA_VERSION {
            return Err(IconCacheError::SchemaTooNew {
                found: version,
                supported: SCHEMA_VERSION,
            });
        }

        if version != SCHEMA_VERSION {
            if version != 0 {
                info!(
                    "Icon database schema {} is outdated, recreating at {}",
                    version, SCHEMA_VERSION
                );
            }
            self.conn.execute("DROP TABLE IF EXISTS icons", [])?;
        }

        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS icons (
                component TEXT NOT NULL,
                profile_id INTEGER NOT NULL,
                last_updated INTEGER NOT NULL DEFAULT 0,
                system_state TEXT,
                label TEXT,
                content_description TEXT,
                icon_color INTEGER NOT NULL DEFAULT 0,
                icon BLOB,
                PRIMARY KEY (component, profile_id)
            )
            "#,
            [],
        )?;

        self.conn
            .execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
        Ok(())
    }

    fn columns_sql(columns: ColumnSet) -> &'static str {
        match columns {
            ColumnSet::LowRes => LOW_RES_COLUMNS,
            ColumnSet::HighRes => HIGH_RES_COLUMNS,
        }
    }

    /// Helper to convert a row in either projection to a `StoredRow`.
    fn row_to_stored(row: &Row<'_>, columns: ColumnSet) -> rusqlite::Result<StoredRow> {
        let label: Option<String> = row.get(2)?;
        let content_description: Option<String> = row.get(3)?;
        let color: i64 = row.get(4)?;
        let system_state: Option<String> = row.get(5)?;
        let icon = match columns {
            ColumnSet::LowRes => None,
            ColumnSet::HighRes => row.get::<_, Option<Vec<u8>>>(7)?,
        };

        Ok(StoredRow {
            component: row.get(0)?,
            user_serial: row.get(1)?,
            title: label.unwrap_or_default(),
            content_description: content_description.unwrap_or_default(),
            color: color as u32,
            icon,
            freshness: system_state.unwrap_or_default(),
            last_updated: row.get(6)?,
        })
    }
}

impl IconStore for SqliteIconStore {
    fn query(
        &self,
        component: &str,
        user_serial: i64,
        columns: ColumnSet,
    ) -> IconCacheResult<Option<StoredRow>> {
        let sql = format!(
            "SELECT {} FROM icons WHERE component = ?1 AND profile_id = ?2",
            Self::columns_sql(columns)
        );
        let row = self
            .conn
            .query_row(&sql, params![component, user_serial], |row| {
                Self::row_to_stored(row, columns)
            })
            .optional()?;
        Ok(row)
    }

    fn query_bulk(
        &self,
        components: &[String],
        user_serial: i64,
        columns: ColumnSet,
    ) -> IconCacheResult<Vec<IconCacheResult<StoredRow>>> {
        if components.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; components.len()].join(",");
        let sql = format!(
            "SELECT {} FROM icons WHERE component IN ({}) AND profile_id = ?",
            Self::columns_sql(columns),
            placeholders
        );

        let mut query_params: Vec<&dyn ToSql> =
            components.iter().map(|c| c as &dyn ToSql).collect();
        query_params.push(&user_serial);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(query_params.as_slice(), |row| {
            Self::row_to_stored(row, columns)
        })?;

        let result = rows.map(|row| row.map_err(IconCacheError::from)).collect();
        Ok(result)
    }

    fn upsert(&mut self, row: &StoredRow) -> IconCacheResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO icons (
                component, profile_id, last_updated, system_state,
                label, content_description, icon_color, icon
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(component, profile_id) DO UPDATE SET
                last_updated = excluded.last_updated,
                system_state = excluded.system_state,
                label = excluded.label,
                content_description = excluded.content_description,
                icon_color = excluded.icon_color,
                icon = excluded.icon
            "#,
            params![
                row.component,
                row.user_serial,
                row.last_updated,
                row.freshness,
                row.title,
                row.content_description,
                i64::from(row.color),
                row.icon,
            ],
        )?;
        Ok(())
    }

    fn delete_package(&mut self, package: &str, user_serial: i64) -> IconCacheResult<usize> {
        let deleted = self.conn.execute(
            r#"
            DELETE FROM icons
            WHERE profile_id = ?2
              AND substr(component, 1, length(?1) + 1) = ?1 || '/'
            "#,
            params![package, user_serial],
        )?;
        Ok(deleted)
    }

    fn clear(&mut self) -> IconCacheResult<usize> {
        Ok(self.conn.execute("DELETE FROM icons", [])?)
    }

    fn list(
        &self,
        package: Option<&str>,
        user_serial: Option<i64>,
    ) -> IconCacheResult<Vec<StoredRow>> {
        let sql = format!(
            r#"
            SELECT {} FROM icons
            WHERE (?1 IS NULL OR substr(component, 1, length(?1) + 1) = ?1 || '/')
              AND (?2 IS NULL OR profile_id = ?2)
            ORDER BY component, profile_id
            "#,
            LOW_RES_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![package, user_serial], |row| {
            Self::row_to_stored(row, ColumnSet::LowRes)
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    fn count(&self) -> IconCacheResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM icons", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
