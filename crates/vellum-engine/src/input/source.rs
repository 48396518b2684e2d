use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::Result;

use crate::config::EngineConfig;
use crate::coords::CoordinateSpace;

use super::dispatch::EventDispatch;
use super::normalize::Normalizer;
use super::types::RawInput;

/// Input backend contract consumed by the engine.
pub trait InputBase {
    fn init(&mut self, config: &EngineConfig) -> Result<()>;

    fn cleanup(&mut self);

    /// Drains pending native input, normalizes it and fans it out.
    /// Returns the number of events dispatched.
    fn poll_and_dispatch(&mut self, space: &CoordinateSpace, dispatch: &mut EventDispatch) -> usize;
}

/// Shared queue of raw input waiting for the next poll.
///
/// Cloning yields another handle to the same queue, so a host can keep
/// pushing after the input base has been handed to the engine.
#[derive(Debug, Default, Clone)]
pub struct InputFeed(Rc<RefCell<VecDeque<RawInput>>>);

impl InputFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, raw: RawInput) {
        self.0.borrow_mut().push_back(raw);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn pop(&self) -> Option<RawInput> {
        self.0.borrow_mut().pop_front()
    }

    /// Normalizes and dispatches everything queued so far.
    ///
    /// The queue borrow is released before each dispatch, so callbacks may
    /// push more input; it is picked up in the same drain.
    pub(crate) fn drain_into(
        &self,
        normalizer: &mut Normalizer,
        space: &CoordinateSpace,
        dispatch: &mut EventDispatch,
    ) -> usize {
        let mut dispatched = 0;
        while let Some(raw) = self.pop() {
            if let Some(event) = normalizer.normalize(raw, space) {
                log::trace!("input: {event:?}");
                dispatch.dispatch(&event);
                dispatched += 1;
            }
        }
        dispatched
    }
}

/// Input base driven entirely by the host through an [`InputFeed`].
#[derive(Debug, Default)]
pub struct ScriptedInput {
    feed: InputFeed,
    normalizer: Normalizer,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for queueing raw input.
    pub fn feed(&self) -> InputFeed {
        self.feed.clone()
    }
}

impl InputBase for ScriptedInput {
    fn init(&mut self, _config: &EngineConfig) -> Result<()> {
        self.normalizer.reset();
        log::debug!("input: scripted");
        Ok(())
    }

    fn cleanup(&mut self) {
        self.feed.clear();
        self.normalizer.reset();
    }

    fn poll_and_dispatch(&mut self, space: &CoordinateSpace, dispatch: &mut EventDispatch) -> usize {
        self.feed.drain_into(&mut self.normalizer, space, dispatch)
    }
}
