//! Per-variant quantity stepper with inline editing.
//!
//! The control keeps only the displayed value. Each committed change is
//! returned to the caller and announced on the notification bus; writing it
//! anywhere durable is the caller's job.

use chrono::Utc;

use solestock_core::{RecordId, VariantId};
use solestock_events::{EventBus, Notification, QuantityChange};

use crate::parse::leading_int;

/// Lowest quantity the control will set.
pub const QUANTITY_FLOOR: u32 = 1;

/// Coerce free text to a quantity: leading integer, fallback 1, floor 1.
pub fn parse_quantity_input(input: &str) -> u32 {
    let parsed = leading_int(input).unwrap_or(i64::from(QUANTITY_FLOOR));
    parsed.clamp(i64::from(QUANTITY_FLOOR), i64::from(u32::MAX)) as u32
}

#[derive(Debug)]
pub struct QuantityControl<B>
where
    B: EventBus<Notification>,
{
    item_id: Option<RecordId>,
    variant_id: VariantId,
    quantity: u32,
    draft: Option<String>,
    bus: B,
}

impl<B> QuantityControl<B>
where
    B: EventBus<Notification>,
{
    /// The initial value is shown as given, even if below the floor.
    pub fn new(variant_id: VariantId, initial_quantity: u32, bus: B) -> Self {
        Self {
            item_id: None,
            variant_id,
            quantity: initial_quantity,
            draft: None,
            bus,
        }
    }

    /// Attach the parent record so notifications can be routed to it.
    pub fn for_item(mut self, item_id: RecordId) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn variant_id(&self) -> &VariantId {
        &self.variant_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn can_decrement(&self) -> bool {
        self.quantity > QUANTITY_FLOOR
    }

    pub fn increment(&mut self) -> QuantityChange {
        let next = self.quantity.saturating_add(1);
        self.commit(next)
    }

    /// No-op (returns `None`) at the floor.
    pub fn decrement(&mut self) -> Option<QuantityChange> {
        if !self.can_decrement() {
            return None;
        }
        let next = self.quantity - 1;
        Some(self.commit(next))
    }

    /// Open the inline editor pre-filled with the current value.
    pub fn begin_edit(&mut self) {
        self.draft = Some(self.quantity.to_string());
    }

    /// Update the editor text. Ignored when the editor is closed.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let Some(draft) = self.draft.as_mut() {
            *draft = text.into();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.draft = None;
    }

    /// Close the editor and apply its text. `None` when it was not open.
    pub fn commit_edit(&mut self) -> Option<QuantityChange> {
        let draft = self.draft.take()?;
        let next = parse_quantity_input(&draft);
        Some(self.commit(next))
    }

    /// Direct edit in one step.
    pub fn edit(&mut self, text: &str) -> QuantityChange {
        self.draft = None;
        self.commit(parse_quantity_input(text))
    }

    fn commit(&mut self, quantity: u32) -> QuantityChange {
        self.quantity = quantity;
        let change = QuantityChange {
            variant_id: self.variant_id.clone(),
            quantity,
        };

        tracing::info!(
            variant_id = %self.variant_id,
            quantity,
            "variant quantity updated"
        );

        let notification =
            Notification::quantity_updated(self.item_id.clone(), change.clone(), Utc::now());
        if let Err(err) = self.bus.publish(notification) {
            tracing::warn!(
                variant_id = %self.variant_id,
                "failed to publish quantity notification: {err}"
            );
        }

        change
    }
}
