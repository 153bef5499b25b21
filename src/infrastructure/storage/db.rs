use crate::domain::error::InsightsError;
use crate::domain::traits::KeyValueStore;
use async_trait::async_trait;
use std::path::Path;
use tokio_rusqlite::Connection;

pub async fn init_database(db_path: &Path) -> Result<Connection, InsightsError> {
    let db = Connection::open(db_path.to_path_buf()).await?;
    create_schema(&db).await?;
    Ok(db)
}

pub async fn create_schema(db: &Connection) -> Result<(), InsightsError> {
    db.call(|conn| {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                data BLOB NOT NULL,
                original_size INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )
        .map(|_| ())
    })
    .await?;

    Ok(())
}

/// SQLite-backed key-value store. Values are zstd-compressed on disk.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, InsightsError> {
        get_impl(&self.conn, key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), InsightsError> {
        put_impl(&self.conn, key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), InsightsError> {
        let key_string = key.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM kv WHERE key = ?",
                    tokio_rusqlite::params![key_string],
                )
            })
            .await?;
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, InsightsError> {
        let prefix_string = prefix.to_string();
        let keys = self
            .conn
            .call(move |conn| {
                // substr comparison, LIKE would treat '_' and '%' in addresses as wildcards
                let mut stmt =
                    conn.prepare("SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1")?;
                let rows = stmt.query_map(tokio_rusqlite::params![prefix_string], |row| {
                    row.get::<_, String>(0)
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await?;
        Ok(keys)
    }
}

// Internal implementation
async fn get_impl(db: &Connection, key: &str) -> Result<Option<String>, InsightsError> {
    use rusqlite::OptionalExtension;
    use std::io::Cursor;
    use tokio_rusqlite::params;
    use zstd::stream::decode_all;

    let key_string = key.to_string();
    let result = db
        .call(move |conn| {
            conn.query_row(
                "SELECT data FROM kv WHERE key = ?",
                params![key_string],
                |row| {
                    let compressed_data: Vec<u8> = row.get(0)?;
                    let decompressed = decode_all(Cursor::new(&compressed_data)).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            0,
                            rusqlite::types::Type::Blob,
                            Box::new(e),
                        )
                    })?;
                    String::from_utf8(decompressed).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            0,
                            rusqlite::types::Type::Blob,
                            Box::new(e),
                        )
                    })
                },
            )
            .optional()
        })
        .await?;

    Ok(result)
}

async fn put_impl(db: &Connection, key: &str, value: &str) -> Result<(), InsightsError> {
    use std::io::Cursor;
    use tokio_rusqlite::params;
    use zstd::stream::encode_all;

    let compressed = encode_all(Cursor::new(value.as_bytes()), 0)?;
    let now = chrono::Utc::now().timestamp();

    let key_string = key.to_string();
    let original_len = value.len();

    db.call(move |conn| {
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, data, original_size, updated_at)
             VALUES (?, ?, ?, ?)",
            params![key_string, compressed, original_len, now],
        )
    })
    .await?;

    Ok(())
}
