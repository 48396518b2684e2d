use crate::error::{EngineError, Result};

use super::types::{Event, EventMask};

/// Opaque handle to an installed callback. Handles are never reused.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Subscriber callback.
pub type Callback = Box<dyn FnMut(&Event, &mut DispatchCtx)>;

struct Subscription {
    id: SubscriptionId,
    mask: EventMask,
    callback: Callback,
}

enum Command {
    Install(Subscription),
    Unload(SubscriptionId),
}

/// Context handed to callbacks during a dispatch pass.
///
/// The subscription list cannot change while it is being walked. Install and
/// unload requests made here are buffered and applied, in request order, once
/// the pass completes. An unloaded subscription is skipped for the rest of the
/// current pass.
pub struct DispatchCtx {
    next_id: u64,
    /// Ids that are installed or queued for install and not yet unloaded.
    live: Vec<SubscriptionId>,
    unloaded: Vec<SubscriptionId>,
    commands: Vec<Command>,
}

impl DispatchCtx {
    fn new(next_id: u64, live: Vec<SubscriptionId>) -> Self {
        Self {
            next_id,
            live,
            unloaded: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Requests a new subscription. It receives events from the next pass on.
    pub fn install_callback<F>(&mut self, mask: EventMask, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event, &mut DispatchCtx) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.live.push(id);
        self.commands.push(Command::Install(Subscription {
            id,
            mask,
            callback: Box::new(callback),
        }));
        id
    }

    /// Requests removal of `id`, which may be the subscription currently running.
    ///
    /// Fails with `NotFound` for an id that is neither installed nor queued,
    /// including one already unloaded earlier in this pass.
    pub fn unload_callback(&mut self, id: SubscriptionId) -> Result<()> {
        let index = self
            .live
            .iter()
            .position(|&live| live == id)
            .ok_or_else(|| EngineError::not_found(format!("subscription {id:?}")))?;
        self.live.swap_remove(index);
        self.unloaded.push(id);
        self.commands.push(Command::Unload(id));
        Ok(())
    }

    fn is_unloaded(&self, id: SubscriptionId) -> bool {
        self.unloaded.contains(&id)
    }
}

/// Ordered list of subscriptions and the fan-out over it.
pub struct EventDispatch {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl Default for EventDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatch")
            .field("subscriptions", &self.subscriptions.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventDispatch {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Appends a subscription to the tail of the list.
    pub fn install_callback<F>(&mut self, mask: EventMask, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(&Event, &mut DispatchCtx) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.push(Subscription {
            id,
            mask,
            callback: Box::new(callback),
        })?;
        Ok(id)
    }

    /// Removes the subscription for `id`, keeping the others in order.
    pub fn unload_callback(&mut self, id: SubscriptionId) -> Result<()> {
        let index = self
            .subscriptions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| EngineError::not_found(format!("subscription {id:?}")))?;
        self.subscriptions.remove(index);
        Ok(())
    }

    /// Drops every subscription. Outstanding handles become invalid.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    /// Delivers `event` to every interested subscriber in registration order.
    /// Returns the number of callbacks invoked.
    pub fn dispatch(&mut self, event: &Event) -> usize {
        let kind = event.kind();
        let live = self.subscriptions.iter().map(|s| s.id).collect();
        let mut ctx = DispatchCtx::new(self.next_id, live);
        let mut invoked = 0;

        for sub in &mut self.subscriptions {
            if !sub.mask.intersects(kind) || ctx.is_unloaded(sub.id) {
                continue;
            }
            (sub.callback)(event, &mut ctx);
            invoked += 1;
        }

        self.next_id = ctx.next_id;
        self.apply(ctx.commands);
        invoked
    }

    fn push(&mut self, sub: Subscription) -> Result<()> {
        self.subscriptions
            .try_reserve(1)
            .map_err(|_| EngineError::AllocationFailure { what: "subscription" })?;
        self.subscriptions.push(sub);
        Ok(())
    }

    fn apply(&mut self, commands: Vec<Command>) {
        for cmd in commands {
            match cmd {
                Command::Install(sub) => {
                    if let Err(e) = self.push(sub) {
                        log::error!("input: deferred install failed: {e}");
                    }
                }
                Command::Unload(id) => {
                    if let Err(e) = self.unload_callback(id) {
                        log::debug!("input: deferred unload: {e}");
                    }
                }
            }
        }
    }
}
