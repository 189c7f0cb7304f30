//! DocumentRecord CRUD operations.
//!
//! Every mutating operation takes the caller's user id and verifies
//! ownership of each touched record before changing anything.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};
use groundchat_core::DocumentRecord;
use rusqlite::{params, Row};

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<DocumentRecord> {
    let created_at_str: String = row.get(6)?;

    Ok(DocumentRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        filename: row.get(2)?,
        content_type: row.get(3)?,
        file_size: row.get(4)?,
        on_chat: row.get::<_, i64>(5)? != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

const DOCUMENT_COLUMNS: &str =
    "id, user_id, filename, content_type, file_size, on_chat, created_at";

impl Database {
    /// Persist a new document record.
    pub fn create_document(&self, record: &DocumentRecord) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO documents (id, user_id, filename, content_type, file_size, on_chat, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.id,
                record.user_id,
                record.filename,
                record.content_type,
                record.file_size,
                record.on_chat as i64,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a document by ID.
    pub fn get_document(&self, id: &str) -> DbResult<DocumentRecord> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"),
            params![id],
            row_to_document,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                DbError::NotFound(format!("Document not found: {}", id))
            }
            _ => DbError::from(e),
        })
    }

    /// List all documents belonging to a user, newest first.
    pub fn list_documents(&self, user_id: &str) -> DbResult<Vec<DocumentRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = ?1 ORDER BY created_at DESC"
        ))?;
        let docs = stmt.query_map(params![user_id], row_to_document)?;
        docs.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Ids of the user's documents with `on_chat` set. This is the
    /// retrieval filter for a chat turn.
    pub fn active_document_ids(&self, user_id: &str) -> DbResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id FROM documents WHERE user_id = ?1 AND on_chat = 1 ORDER BY created_at")?;
        let ids = stmt.query_map(params![user_id], |row| row.get(0))?;
        ids.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Toggle `on_chat` for a batch of documents owned by `user_id`.
    ///
    /// All-or-nothing: if any id is missing or owned by another user, no
    /// record is changed.
    pub fn set_on_chat(
        &self,
        user_id: &str,
        ids: &[String],
        active: bool,
    ) -> DbResult<Vec<DocumentRecord>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for id in ids {
            let owner: String = tx
                .query_row(
                    "SELECT user_id FROM documents WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => {
                        DbError::NotFound(format!("Document not found: {}", id))
                    }
                    _ => DbError::from(e),
                })?;

            if owner != user_id {
                return Err(DbError::Forbidden {
                    document_id: id.clone(),
                    user_id: user_id.to_string(),
                });
            }

            tx.execute(
                "UPDATE documents SET on_chat = ?2 WHERE id = ?1",
                params![id, active as i64],
            )?;
        }

        // Read the updated rows back on the same connection; the pooled
        // connection is still checked out until this function returns.
        let updated = ids
            .iter()
            .map(|id| {
                tx.query_row(
                    &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"),
                    params![id],
                    row_to_document,
                )
                .map_err(DbError::from)
            })
            .collect::<DbResult<Vec<_>>>()?;

        tx.commit()?;
        Ok(updated)
    }

    /// Delete a batch of documents owned by `user_id`.
    ///
    /// All-or-nothing: ownership of every id is verified before any row
    /// is removed. Chunk removal from the vector index is the caller's
    /// responsibility.
    pub fn delete_documents(&self, user_id: &str, ids: &[String]) -> DbResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for id in ids {
            let owner: String = tx
                .query_row(
                    "SELECT user_id FROM documents WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => {
                        DbError::NotFound(format!("Document not found: {}", id))
                    }
                    _ => DbError::from(e),
                })?;

            if owner != user_id {
                return Err(DbError::Forbidden {
                    document_id: id.clone(),
                    user_id: user_id.to_string(),
                });
            }

            tx.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Remove a document record unconditionally. Used to compensate a
    /// failed vector write during ingestion.
    pub fn remove_document(&self, id: &str) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, name: &str) -> DocumentRecord {
        DocumentRecord::new(user, name)
    }

    #[test]
    fn test_create_and_list() {
        let db = Database::open_in_memory().unwrap();
        db.create_document(&record("u1", "a.pdf")).unwrap();
        db.create_document(&record("u1", "b.txt")).unwrap();
        db.create_document(&record("u2", "c.txt")).unwrap();

        let docs = db.list_documents("u1").unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.user_id == "u1"));
    }

    #[test]
    fn test_active_ids_respects_on_chat() {
        let db = Database::open_in_memory().unwrap();
        let a = record("u1", "a.pdf");
        let mut b = record("u1", "b.pdf");
        b.on_chat = false;
        db.create_document(&a).unwrap();
        db.create_document(&b).unwrap();

        let ids = db.active_document_ids("u1").unwrap();
        assert_eq!(ids, vec![a.id]);
    }

    #[test]
    fn test_toggle_updates_and_returns_records() {
        let db = Database::open_in_memory().unwrap();
        let a = record("u1", "a.pdf");
        let b = record("u1", "b.pdf");
        db.create_document(&a).unwrap();
        db.create_document(&b).unwrap();

        let updated = db
            .set_on_chat("u1", &[a.id.clone(), b.id.clone()], false)
            .unwrap();
        assert_eq!(updated.len(), 2);
        assert!(updated.iter().all(|d| !d.on_chat));
        assert!(db.active_document_ids("u1").unwrap().is_empty());

        let updated = db.set_on_chat("u1", &[a.id.clone()], true).unwrap();
        assert!(updated[0].on_chat);
        assert_eq!(db.active_document_ids("u1").unwrap(), vec![a.id]);
    }

    #[test]
    fn test_toggle_rejects_foreign_documents() {
        let db = Database::open_in_memory().unwrap();
        let theirs = record("u2", "theirs.pdf");
        db.create_document(&theirs).unwrap();

        let err = db
            .set_on_chat("u1", &[theirs.id.clone()], false)
            .unwrap_err();
        assert!(matches!(err, DbError::Forbidden { .. }));

        // Nothing changed
        assert!(db.get_document(&theirs.id).unwrap().on_chat);
    }

    #[test]
    fn test_toggle_batch_is_all_or_nothing() {
        let db = Database::open_in_memory().unwrap();
        let mine = record("u1", "mine.pdf");
        let theirs = record("u2", "theirs.pdf");
        db.create_document(&mine).unwrap();
        db.create_document(&theirs).unwrap();

        let err = db
            .set_on_chat("u1", &[mine.id.clone(), theirs.id.clone()], false)
            .unwrap_err();
        assert!(matches!(err, DbError::Forbidden { .. }));

        // The owned document was not toggled either
        assert!(db.get_document(&mine.id).unwrap().on_chat);
    }

    #[test]
    fn test_delete_requires_ownership() {
        let db = Database::open_in_memory().unwrap();
        let theirs = record("u2", "theirs.pdf");
        db.create_document(&theirs).unwrap();

        let err = db.delete_documents("u1", &[theirs.id.clone()]).unwrap_err();
        assert!(matches!(err, DbError::Forbidden { .. }));
        assert!(db.get_document(&theirs.id).is_ok());

        db.delete_documents("u2", &[theirs.id.clone()]).unwrap();
        assert!(matches!(
            db.get_document(&theirs.id),
            Err(DbError::NotFound(_))
        ));
    }
}
