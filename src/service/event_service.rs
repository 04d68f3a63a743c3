//! Event service: event CRUD with image handling and placeholder prizes.

use chrono::Utc;
use futures_util::future::try_join_all;

use super::publish_row;
use crate::domain::prize::placeholder_prizes;
use crate::domain::{
    ChangeBus, ChangeKind, Event, EventDraft, EventId, EventSummary, Prize, WatchedTable,
};
use crate::error::AdminError;
use crate::storage::{BlobStore, EVENTS_BUCKET, ImageUpload};
use crate::store::{AdminStore, fetch_all_rows, get_accurate_count};

/// Result of a create or update.
#[derive(Debug, Clone)]
pub struct EventSaved {
    /// The stored event.
    pub event: Event,
    /// Placeholder prizes inserted along with it.
    pub prizes_added: usize,
    /// Set when the event was saved but the placeholder prizes were not.
    pub warning: Option<String>,
}

/// Orchestrates event operations.
///
/// Every mutation follows the same pattern: validate → store image →
/// write rows → publish changes → clean up superseded images.
#[derive(Debug, Clone)]
pub struct EventService<S, B> {
    store: S,
    blobs: B,
    bus: ChangeBus,
    batch_size: u64,
    max_image_bytes: usize,
}

impl<S: AdminStore, B: BlobStore> EventService<S, B> {
    /// Creates a new `EventService`.
    #[must_use]
    pub const fn new(
        store: S,
        blobs: B,
        bus: ChangeBus,
        batch_size: u64,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            store,
            blobs,
            bus,
            batch_size,
            max_image_bytes,
        }
    }

    /// Lists all events, newest first, with exact participant and prize
    /// counts.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] if any read fails.
    pub async fn list(&self) -> Result<Vec<EventSummary>, AdminError> {
        let events = fetch_all_rows(&self.store.events(), self.batch_size).await?;
        try_join_all(events.into_iter().map(|event| self.summarize(event))).await
    }

    /// Loads one event with its counts.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::EventNotFound`] if it does not exist.
    pub async fn get(&self, id: EventId) -> Result<EventSummary, AdminError> {
        let event = self.require(id).await?;
        self.summarize(event).await
    }

    /// Creates an event, optionally with an uploaded image and `prizes_count`
    /// placeholder prizes.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for bad fields, an image error for
    /// a rejected upload, [`AdminError::Storage`] if the upload fails, or
    /// [`AdminError::Persistence`] if the event row cannot be written.
    /// Placeholder prize failures are reported in [`EventSaved::warning`].
    pub async fn create(
        &self,
        draft: &EventDraft,
        prizes_count: u32,
        image: Option<ImageUpload>,
    ) -> Result<EventSaved, AdminError> {
        let mut fields = draft.validate()?;
        let uploaded = match image {
            Some(image) => Some(self.store_image(&image).await?),
            None => None,
        };
        if let Some(url) = &uploaded {
            fields.image_url = Some(url.clone());
        }

        let event = match self.store.insert_event(&fields).await {
            Ok(event) => event,
            Err(e) => {
                if let Some(url) = &uploaded {
                    self.discard_image(url).await;
                }
                return Err(e);
            }
        };
        publish_row(&self.bus, WatchedTable::Events, ChangeKind::Insert, None, Some(&event));
        tracing::info!(event_id = %event.id, title = %event.title, "event created");

        let (prizes_added, warning) = self.add_placeholders(event.id, 0, prizes_count, "created").await;
        Ok(EventSaved {
            event,
            prizes_added,
            warning,
        })
    }

    /// Updates an event.
    ///
    /// An uploaded image replaces the current one. Otherwise the draft's
    /// `image_url` is taken as is, so clearing it removes the image. A
    /// superseded image that lives in our storage is deleted afterwards;
    /// failures there are only logged. `extra_prizes` placeholders are
    /// numbered after the event's current prizes.
    ///
    /// # Errors
    ///
    /// Same as [`EventService::create`], plus
    /// [`AdminError::EventNotFound`].
    pub async fn update(
        &self,
        id: EventId,
        draft: &EventDraft,
        extra_prizes: u32,
        image: Option<ImageUpload>,
    ) -> Result<EventSaved, AdminError> {
        let mut fields = draft.validate()?;
        let existing = self.require(id).await?;

        let uploaded = match image {
            Some(image) => Some(self.store_image(&image).await?),
            None => None,
        };
        if let Some(url) = &uploaded {
            fields.image_url = Some(url.clone());
        }

        let written = match self.store.update_event(id, &fields).await {
            Ok(Some(event)) => Ok(event),
            Ok(None) => Err(AdminError::EventNotFound(id.into())),
            Err(e) => Err(e),
        };
        let updated = match written {
            Ok(event) => event,
            Err(e) => {
                if let Some(url) = &uploaded {
                    self.discard_image(url).await;
                }
                return Err(e);
            }
        };

        if let Some(old_url) = existing.image_url.as_deref()
            && updated.image_url.as_deref() != Some(old_url)
        {
            self.discard_image(old_url).await;
        }
        publish_row(
            &self.bus,
            WatchedTable::Events,
            ChangeKind::Update,
            Some(&existing),
            Some(&updated),
        );
        tracing::info!(event_id = %id, "event updated");

        let (prizes_added, warning) = if extra_prizes > 0 {
            match get_accurate_count(&self.store.prizes_of(id), self.batch_size).await {
                Ok(existing_prizes) => {
                    self.add_placeholders(id, existing_prizes, extra_prizes, "updated")
                        .await
                }
                Err(e) => {
                    tracing::warn!(event_id = %id, error = %e, "prize count failed");
                    (0, Some(format!("Event updated but failed to create prizes: {e}")))
                }
            }
        } else {
            (0, None)
        };
        Ok(EventSaved {
            event: updated,
            prizes_added,
            warning,
        })
    }

    /// Deletes an event, its prizes and participants, and its stored image.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::EventNotFound`] or [`AdminError::Persistence`].
    pub async fn delete(&self, id: EventId) -> Result<Event, AdminError> {
        let deleted = self
            .store
            .delete_event(id)
            .await?
            .ok_or(AdminError::EventNotFound(id.into()))?;
        if let Some(url) = deleted.image_url.as_deref() {
            self.discard_image(url).await;
        }
        publish_row(&self.bus, WatchedTable::Events, ChangeKind::Delete, Some(&deleted), None);
        tracing::info!(event_id = %id, "event deleted");
        Ok(deleted)
    }

    async fn require(&self, id: EventId) -> Result<Event, AdminError> {
        self.store
            .get_event(id)
            .await?
            .ok_or(AdminError::EventNotFound(id.into()))
    }

    async fn summarize(&self, event: Event) -> Result<EventSummary, AdminError> {
        let participants = self.store.participants_of(event.id);
        let prizes = self.store.prizes_of(event.id);
        let (participant_count, prizes_count) = futures_util::try_join!(
            get_accurate_count(&participants, self.batch_size),
            get_accurate_count(&prizes, self.batch_size),
        )?;
        Ok(EventSummary {
            event,
            participant_count,
            prizes_count,
        })
    }

    async fn store_image(&self, image: &ImageUpload) -> Result<String, AdminError> {
        image.validate(self.max_image_bytes)?;
        let path = image.object_path(Utc::now());
        self.blobs
            .upload(EVENTS_BUCKET, &path, &image.bytes, &image.content_type)
            .await
    }

    /// Deletes an image if it is one of ours; never fails.
    async fn discard_image(&self, url: &str) {
        let Some(object) = self.blobs.locate(url) else {
            tracing::debug!(url, "linked image left in place");
            return;
        };
        if let Err(e) = self.blobs.delete(&object.bucket, &object.path).await {
            tracing::warn!(path = %object.path, error = %e, "old image not deleted");
        }
    }

    async fn add_placeholders(
        &self,
        event_id: EventId,
        existing: u64,
        count: u32,
        verb: &str,
    ) -> (usize, Option<String>) {
        if count == 0 {
            return (0, None);
        }
        match self
            .store
            .insert_prizes(event_id, &placeholder_prizes(existing, count))
            .await
        {
            Ok(prizes) => {
                for prize in &prizes {
                    publish_row::<Prize>(
                        &self.bus,
                        WatchedTable::Prizes,
                        ChangeKind::Insert,
                        None,
                        Some(prize),
                    );
                }
                tracing::info!(%event_id, added = prizes.len(), "placeholder prizes added");
                (prizes.len(), None)
            }
            Err(e) => {
                tracing::warn!(%event_id, error = %e, "placeholder prizes not created");
                (
                    0,
                    Some(format!("Event {verb} but failed to create prizes: {e}")),
                )
            }
        }
    }
}
