use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::{BackendError, RecordStore};
use crate::models::{Author, Record, RecordKind, Remark};
use crate::remarks::log::NewRemark;

/// In-process store standing in for the CRM backend in tests. Assigns
/// sequence numbers the way the backend does.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<RecordKind, Vec<Record>>>,
    pub author: Author,
}

impl InMemoryStore {
    pub fn with_records(kind: RecordKind, records: Vec<Record>) -> Self {
        InMemoryStore {
            records: RwLock::new(HashMap::from([(kind, records)])),
            author: Author {
                id: Some(Uuid::new_v4().to_string()),
                name: Some("Console Tester".to_string()),
                email: None,
            },
        }
    }

    async fn update<F>(&self, kind: RecordKind, id: &str, f: F) -> Result<Record, BackendError>
    where
        F: FnOnce(&mut Record) -> Result<(), BackendError>,
    {
        let mut map = self.records.write().await;
        let record = map
            .get_mut(&kind)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| BackendError::NotFound(format!("{} {id}", kind.segment())))?;
        f(record)?;
        record.updated_at = Some(Utc::now().to_rfc3339());
        Ok(record.clone())
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list_records(&self, kind: RecordKind) -> Result<Vec<Record>, BackendError> {
        Ok(self
            .records
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_remark(
        &self,
        kind: RecordKind,
        parent_id: &str,
        remark: &NewRemark,
    ) -> Result<Record, BackendError> {
        let author = self.author.clone();
        self.update(kind, parent_id, |record| {
            append_remark(record, remark.clone(), author, Utc::now());
            Ok(())
        })
        .await
    }

    async fn deactivate_remark(
        &self,
        kind: RecordKind,
        parent_id: &str,
        sequence: u32,
    ) -> Result<Record, BackendError> {
        self.update(kind, parent_id, |record| {
            deactivate_remark(record, sequence)
                .ok_or_else(|| BackendError::NotFound(format!("remark {sequence}")))
        })
        .await
    }

    async fn delete_record(&self, kind: RecordKind, id: &str) -> Result<(), BackendError> {
        let mut map = self.records.write().await;
        let records = map.entry(kind).or_default();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(BackendError::NotFound(format!("{} {id}", kind.segment())));
        }
        Ok(())
    }
}

/// Next sequence number. Counts soft-deleted remarks so numbers are never
/// reused.
fn next_sequence(remarks: &[Remark]) -> u32 {
    remarks
        .iter()
        .map(|r| r.sequence_number)
        .max()
        .unwrap_or(0)
        + 1
}

/// Appends a validated remark with the next sequence number. Earlier
/// remarks are left untouched.
fn append_remark(record: &mut Record, remark: NewRemark, author: Author, now: DateTime<Utc>) {
    let sequence_number = next_sequence(&record.remarks);
    record.remarks.push(Remark {
        sequence_number,
        status: remark.status,
        message: remark.message,
        reminder_date: remark.reminder_date,
        created_by: Some(author),
        created_at: now,
        is_active: true,
    });
}

/// Soft-deletes one remark. Returns `None` if no remark has that sequence.
fn deactivate_remark(record: &mut Record, sequence: u32) -> Option<()> {
    record
        .remarks
        .iter_mut()
        .find(|r| r.sequence_number == sequence)?
        .is_active = false;
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RemarkStatus;
    use crate::remarks::conversation::{conversation_state, ConversationState};
    use crate::remarks::log::RemarkLog;
    use serde_json::json;

    fn remark(status: RemarkStatus) -> NewRemark {
        NewRemark {
            status,
            message: format!("{} call", status.as_str()),
            reminder_date: None,
        }
    }

    fn store() -> InMemoryStore {
        let lead = Record::from_value(json!({ "_id": "lead-1", "name": "Asha" })).unwrap();
        InMemoryStore::with_records(RecordKind::Lead, vec![lead])
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_sequence_without_touching_history() {
        let store = store();
        let first = store
            .append_remark(RecordKind::Lead, "lead-1", &remark(RemarkStatus::Pending))
            .await
            .unwrap();
        let second = store
            .append_remark(RecordKind::Lead, "lead-1", &remark(RemarkStatus::Interested))
            .await
            .unwrap();
        assert_eq!(second.remarks.len(), 2);
        assert_eq!(second.remarks[1].sequence_number, 2);
        assert_eq!(second.remarks[0], first.remarks[0]);
        assert!(second.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_sequence_numbers_are_not_reused_after_soft_delete() {
        let store = store();
        for status in [RemarkStatus::Pending, RemarkStatus::Rejected] {
            store
                .append_remark(RecordKind::Lead, "lead-1", &remark(status))
                .await
                .unwrap();
        }
        let lead = store.deactivate_remark(RecordKind::Lead, "lead-1", 2).await.unwrap();
        assert_eq!(RemarkLog::new(&lead.remarks).visible().len(), 1);
        assert_eq!(conversation_state(&lead.remarks), ConversationState::Active);

        let lead = store
            .append_remark(RecordKind::Lead, "lead-1", &remark(RemarkStatus::Interested))
            .await
            .unwrap();
        assert_eq!(lead.remarks[2].sequence_number, 3);
    }

    #[tokio::test]
    async fn test_unknown_record_or_sequence_is_not_found() {
        let store = store();
        let err = store
            .deactivate_remark(RecordKind::Lead, "lead-1", 9)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
        let err = store
            .append_remark(RecordKind::Lead, "missing", &remark(RemarkStatus::Pending))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }
}
