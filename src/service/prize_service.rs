//! Prize service: per-event prize management.

use super::publish_row;
use crate::domain::{ChangeBus, ChangeKind, EventId, Prize, PrizeDraft, PrizeId, WatchedTable};
use crate::error::AdminError;
use crate::store::{AdminStore, fetch_all_rows};

/// Orchestrates prize operations.
#[derive(Debug, Clone)]
pub struct PrizeService<S> {
    store: S,
    bus: ChangeBus,
    batch_size: u64,
}

impl<S: AdminStore> PrizeService<S> {
    /// Creates a new `PrizeService`.
    #[must_use]
    pub const fn new(store: S, bus: ChangeBus, batch_size: u64) -> Self {
        Self {
            store,
            bus,
            batch_size,
        }
    }

    /// Lists an event's prizes, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::EventNotFound`] or [`AdminError::Persistence`].
    pub async fn list(&self, event_id: EventId) -> Result<Vec<Prize>, AdminError> {
        self.require_event(event_id).await?;
        fetch_all_rows(&self.store.prizes_of(event_id), self.batch_size).await
    }

    /// Adds a prize to an event.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`], [`AdminError::EventNotFound`] or
    /// [`AdminError::Persistence`].
    pub async fn create(&self, event_id: EventId, draft: &PrizeDraft) -> Result<Prize, AdminError> {
        let fields = draft.validate()?;
        self.require_event(event_id).await?;
        let prize = self
            .store
            .insert_prizes(event_id, std::slice::from_ref(&fields))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AdminError::Persistence("prize insert returned no row".to_string()))?;
        publish_row(&self.bus, WatchedTable::Prizes, ChangeKind::Insert, None, Some(&prize));
        tracing::info!(prize_id = %prize.id, %event_id, "prize created");
        Ok(prize)
    }

    /// Overwrites a prize.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`], [`AdminError::PrizeNotFound`] or
    /// [`AdminError::Persistence`].
    pub async fn update(&self, id: PrizeId, draft: &PrizeDraft) -> Result<Prize, AdminError> {
        let fields = draft.validate()?;
        let existing = self
            .store
            .get_prize(id)
            .await?
            .ok_or(AdminError::PrizeNotFound(id.into()))?;
        let updated = self
            .store
            .update_prize(id, &fields)
            .await?
            .ok_or(AdminError::PrizeNotFound(id.into()))?;
        publish_row(
            &self.bus,
            WatchedTable::Prizes,
            ChangeKind::Update,
            Some(&existing),
            Some(&updated),
        );
        tracing::info!(prize_id = %id, "prize updated");
        Ok(updated)
    }

    /// Deletes a prize.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::PrizeNotFound`] or [`AdminError::Persistence`].
    pub async fn delete(&self, id: PrizeId) -> Result<Prize, AdminError> {
        let deleted = self
            .store
            .delete_prize(id)
            .await?
            .ok_or(AdminError::PrizeNotFound(id.into()))?;
        publish_row(&self.bus, WatchedTable::Prizes, ChangeKind::Delete, Some(&deleted), None);
        tracing::info!(prize_id = %id, "prize deleted");
        Ok(deleted)
    }

    async fn require_event(&self, event_id: EventId) -> Result<(), AdminError> {
        match self.store.get_event(event_id).await? {
            Some(_) => Ok(()),
            None => Err(AdminError::EventNotFound(event_id.into())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{EventFields, EventStatus};
    use crate::store::memory::MemoryStore;

    async fn setup() -> (MemoryStore, PrizeService<MemoryStore>, EventId) {
        let store = MemoryStore::new();
        let fields = EventFields {
            title: "Spring".to_string(),
            description: "d".to_string(),
            status: EventStatus::Running,
            start_date: Utc::now(),
            end_date: Utc::now(),
            image_url: None,
        };
        let Ok(event) = store.insert_event(&fields).await else {
            panic!("event insert failed");
        };
        let service = PrizeService::new(store.clone(), ChangeBus::new(16), 1000);
        (store, service, event.id)
    }

    fn draft(name: &str) -> PrizeDraft {
        PrizeDraft {
            name: name.to_string(),
            description: "A prize".to_string(),
            category: "Gadgets".to_string(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn create_list_update_delete() {
        let (store, service, event_id) = setup().await;
        let Ok(first) = service.create(event_id, &draft("Phone")).await else {
            panic!("create failed");
        };
        let Ok(_) = service.create(event_id, &draft("Tablet")).await else {
            panic!("create failed");
        };
        let Ok(list) = service.list(event_id).await else {
            panic!("list failed");
        };
        let names: Vec<&str> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Phone", "Tablet"]);

        let Ok(updated) = service.update(first.id, &draft("  Laptop ")).await else {
            panic!("update failed");
        };
        assert_eq!(updated.name, "Laptop");

        assert!(service.delete(first.id).await.is_ok());
        assert_eq!(store.prize_count(event_id), 1);
        assert!(matches!(
            service.delete(first.id).await,
            Err(AdminError::PrizeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let (_, service, event_id) = setup().await;
        let Err(AdminError::Validation(errors)) =
            service.create(event_id, &PrizeDraft::default()).await
        else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.get("name"), Some("Prize name is required"));
        assert_eq!(errors.get("category"), Some("Category is required"));
        assert_eq!(errors.len(), 3);
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let (_, service, _) = setup().await;
        assert!(matches!(
            service.create(EventId::new(), &draft("Phone")).await,
            Err(AdminError::EventNotFound(_))
        ));
    }

    #[tokio::test]
    async fn changes_are_published_with_event_id() {
        let (_, service, event_id) = setup().await;
        let mut rx = service.bus.receiver();
        let Ok(prize) = service.create(event_id, &draft("Phone")).await else {
            panic!("create failed");
        };
        let Ok(change) = rx.recv().await else {
            panic!("no change");
        };
        assert_eq!(change.kind, ChangeKind::Insert);
        assert_eq!(change.event_id(), Some(event_id));
        assert_eq!(change.row_id(), Some(prize.id.into()));
    }
}
