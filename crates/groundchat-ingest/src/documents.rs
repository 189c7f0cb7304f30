//! Document lifecycle after ingestion: listing, retrieval toggling, removal.

use std::sync::Arc;

use groundchat_core::DocumentRecord;
use groundchat_db::Database;
use groundchat_index::{DocumentFilter, VectorIndex};
use tracing::info;

use crate::error::IngestResult;

pub struct DocumentManager {
    db: Database,
    index: Arc<dyn VectorIndex>,
}

impl DocumentManager {
    pub fn new(db: Database, index: Arc<dyn VectorIndex>) -> Self {
        Self { db, index }
    }

    /// All documents owned by `user_id`, newest first.
    pub fn list(&self, user_id: &str) -> IngestResult<Vec<DocumentRecord>> {
        Ok(self.db.list_documents(user_id)?)
    }

    /// Ids of the documents currently grounding the user's chats.
    pub fn active_ids(&self, user_id: &str) -> IngestResult<Vec<String>> {
        Ok(self.db.active_document_ids(user_id)?)
    }

    /// Toggle retrieval participation for a batch of documents. All-or-nothing:
    /// if any id is missing or owned by someone else no document changes.
    pub fn set_on_chat(
        &self,
        user_id: &str,
        ids: &[String],
        active: bool,
    ) -> IngestResult<Vec<DocumentRecord>> {
        let updated = self.db.set_on_chat(user_id, ids, active)?;
        info!(
            "Set on_chat={active} for {} document(s) of user {user_id}",
            updated.len()
        );
        Ok(updated)
    }

    /// Delete documents and their indexed chunks. Records go first so a
    /// failed chunk delete cannot leave records pointing at nothing.
    pub async fn delete(&self, user_id: &str, ids: &[String]) -> IngestResult<()> {
        self.db.delete_documents(user_id, ids)?;
        self.index
            .delete(&DocumentFilter::new(ids.to_vec()))
            .await?;
        info!("Deleted {} document(s) for user {user_id}", ids.len());
        Ok(())
    }
}
