//! Notification payloads: user-facing toasts plus the machine-readable change
//! they confirm.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use solestock_core::{RecordId, VariantId};

/// A variant quantity that was just set through a quantity control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityChange {
    pub variant_id: VariantId,
    pub quantity: u32,
}

/// Short title + description shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationKind {
    /// A quantity control committed a new value.
    QuantityUpdated {
        item_id: Option<RecordId>,
        change: QuantityChange,
    },
    /// A quantity write to the backing store failed and was rolled back.
    QuantityUpdateFailed {
        item_id: RecordId,
        variant_id: VariantId,
        reason: String,
    },
    /// Cached query results were dropped and will be refetched.
    CacheInvalidated { scope: String },
}

/// Envelope published on the notification bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: Uuid,
    occurred_at: DateTime<Utc>,
    toast: Option<Toast>,
    kind: NotificationKind,
}

impl Notification {
    pub fn new(kind: NotificationKind, toast: Option<Toast>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            occurred_at,
            toast,
            kind,
        }
    }

    /// Confirmation for a committed quantity.
    pub fn quantity_updated(
        item_id: Option<RecordId>,
        change: QuantityChange,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        let toast = Toast::new(
            "Quantity updated",
            format!("Inventory quantity has been set to {}", change.quantity),
        );
        Self::new(
            NotificationKind::QuantityUpdated { item_id, change },
            Some(toast),
            occurred_at,
        )
    }

    /// Confirmation that a quantity write reached the backing store.
    pub fn quantity_saved(
        item_id: RecordId,
        change: QuantityChange,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        let toast = Toast::new(
            "Quantity updated",
            format!(
                "Inventory quantity for variant {} has been updated successfully.",
                change.variant_id
            ),
        );
        Self::new(
            NotificationKind::QuantityUpdated {
                item_id: Some(item_id),
                change,
            },
            Some(toast),
            occurred_at,
        )
    }

    pub fn quantity_failed(
        item_id: RecordId,
        variant_id: VariantId,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        let toast = Toast::new(
            "Error updating quantity",
            "There was a problem updating the inventory quantity.",
        );
        Self::new(
            NotificationKind::QuantityUpdateFailed {
                item_id,
                variant_id,
                reason: reason.into(),
            },
            Some(toast),
            occurred_at,
        )
    }

    /// Silent notification: nothing for the user to see.
    pub fn cache_invalidated(scope: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self::new(
            NotificationKind::CacheInvalidated {
                scope: scope.into(),
            },
            None,
            occurred_at,
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn kind(&self) -> &NotificationKind {
        &self.kind
    }
}
