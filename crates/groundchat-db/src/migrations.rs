//! Database migrations and schema management.

use crate::error::DbResult;
use rusqlite::Connection;
use tracing::info;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> DbResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating initial database schema...");
        create_initial_schema(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> DbResult<()> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

fn create_initial_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- Uploaded document descriptors
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            filename TEXT NOT NULL,
            content_type TEXT,
            file_size INTEGER NOT NULL DEFAULT 0,
            on_chat INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_documents_user ON documents(user_id);
        CREATE INDEX IF NOT EXISTS idx_documents_user_active ON documents(user_id, on_chat);

        -- Indexed chunks. Not foreign-keyed to documents: the vector index
        -- owns these rows and addresses them through the document_id
        -- metadata, mirroring an external vector store.
        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            text TEXT NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}'
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);

        -- Vector embeddings (stored as little-endian f32 BLOBs)
        CREATE TABLE IF NOT EXISTS embeddings (
            chunk_id TEXT PRIMARY KEY REFERENCES chunks(id) ON DELETE CASCADE,
            vector BLOB NOT NULL,
            model TEXT NOT NULL,
            dimensions INTEGER NOT NULL
        );
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_initializes_once() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        // Re-running must be a no-op
        initialize_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }
}
