//! Domain layer: rows, identifiers, validation and the change bus.
//!
//! Events, prizes, user entries and admin accounts are plain data; the
//! [`ChangeBus`] carries row-level [`ChangeEvent`]s to every live view.

pub mod admin;
pub mod change;
pub mod change_bus;
pub mod event;
pub mod ids;
pub mod prize;
pub mod user_entry;
pub mod validation;

pub use admin::{AdminAccount, AdminSession, AdminStatus};
pub use change::{ChangeEvent, ChangeKind, WatchedTable};
pub use change_bus::{ChangeBus, SubscriptionStatus};
pub use event::{Event, EventDraft, EventFields, EventStatus, EventSummary};
pub use ids::{AdminId, EntryId, EventId, PrizeId};
pub use prize::{Prize, PrizeDraft, PrizeFields};
pub use user_entry::UserEntry;
pub use validation::FieldErrors;
