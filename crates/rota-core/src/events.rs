//! Change notifications for UI layers.
//!
//! Every store mutation emits one [`StoreEvent`] after the state change is
//! complete. Observers run synchronously, in subscription order, on the
//! thread that performed the mutation.

use std::fmt;

use crate::http::ShiftQuery;
use crate::model::{MemberId, ScheduleId, SlotKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ScheduleLoaded {
        schedule: ScheduleId,
    },
    /// Server rows were merged into the original view. `slots` lists every
    /// slot that is now known to be fetched by this call.
    ShiftsMerged {
        schedule: ScheduleId,
        slots: Vec<SlotKey>,
    },
    ShiftFetchFailed {
        schedule: ScheduleId,
        query: ShiftQuery,
        error: String,
    },
    SlotEdited {
        schedule: ScheduleId,
        slot: SlotKey,
        dirty: bool,
    },
    MemberAdded {
        schedule: ScheduleId,
        member: MemberId,
    },
    MemberRenamed {
        member: MemberId,
    },
    EditsSubmitted {
        schedule: ScheduleId,
        slots: Vec<SlotKey>,
    },
    EditsDiscarded {
        schedule: ScheduleId,
        slots: Vec<SlotKey>,
    },
}

/// Handle returned by [`Observers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&StoreEvent)>;

#[derive(Default)]
pub struct Observers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    pub fn notify(&mut self, event: &StoreEvent) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}
