// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Run loop and animations for the headless backend.

use core::fmt;
use core::time::Duration;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::animation::{Animation, AnimationContext, InteractionHandle, InteractiveAnimation};

type Task = Box<dyn FnOnce()>;

/// Manually driven FIFO of deferred tasks.
///
/// One task runs per [`turn`](Self::turn). Tasks scheduled while a task runs
/// are queued behind it.
#[derive(Default)]
pub struct RunLoop {
    queue: RefCell<VecDeque<Task>>,
}

impl RunLoop {
    /// Create an empty run loop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for a later turn.
    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        self.queue.borrow_mut().push_back(Box::new(task));
    }

    /// Run the oldest queued task. Returns false if nothing was queued.
    pub fn turn(&self) -> bool {
        let task = self.queue.borrow_mut().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run turns until the queue is empty; returns the number of turns taken.
    pub fn run_until_idle(&self) -> usize {
        let mut turns = 0;
        while self.turn() {
            turns += 1;
        }
        turns
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl fmt::Debug for RunLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLoop")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Animation that finishes on the next run-loop turn.
pub struct TimedAnimation {
    run_loop: Weak<RunLoop>,
    duration: Duration,
    runs: Cell<usize>,
}

impl TimedAnimation {
    /// Create an animation scheduled on `run_loop`.
    pub fn new(run_loop: &Rc<RunLoop>, duration: Duration) -> Self {
        Self {
            run_loop: Rc::downgrade(run_loop),
            duration,
            runs: Cell::new(0),
        }
    }

    /// Number of times the animation was performed.
    pub fn runs(&self) -> usize {
        self.runs.get()
    }
}

impl fmt::Debug for TimedAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedAnimation")
            .field("duration", &self.duration)
            .field("runs", &self.runs.get())
            .finish_non_exhaustive()
    }
}

impl Animation for TimedAnimation {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn perform(&self, context: AnimationContext) {
        self.runs.set(self.runs.get() + 1);
        match self.run_loop.upgrade() {
            Some(run_loop) => run_loop.schedule(move || context.complete(true)),
            None => context.complete(true),
        }
    }
}

/// Interactive animation driven through a [`DrivenHandle`].
///
/// Outside of an interaction it behaves like a [`TimedAnimation`]. Between
/// [`start`](InteractiveAnimation::start) and
/// [`cleanup`](InteractiveAnimation::cleanup), performing it hands the context
/// to the handle, which completes it on `finish` or `cancel`.
pub struct DrivenAnimation {
    timed: TimedAnimation,
    handle: RefCell<Option<Rc<DrivenHandle>>>,
    starts: Cell<usize>,
    cleanups: Cell<usize>,
}

impl DrivenAnimation {
    /// Create an animation scheduled on `run_loop` when not driven.
    pub fn new(run_loop: &Rc<RunLoop>, duration: Duration) -> Self {
        Self {
            timed: TimedAnimation::new(run_loop, duration),
            handle: RefCell::new(None),
            starts: Cell::new(0),
            cleanups: Cell::new(0),
        }
    }

    /// The handle of the interaction in flight.
    pub fn handle(&self) -> Option<Rc<DrivenHandle>> {
        self.handle.borrow().clone()
    }

    /// Number of interactions started.
    pub fn starts(&self) -> usize {
        self.starts.get()
    }

    /// Number of cleanups run.
    pub fn cleanups(&self) -> usize {
        self.cleanups.get()
    }

    /// Number of non-interactive runs.
    pub fn runs(&self) -> usize {
        self.timed.runs()
    }
}

impl fmt::Debug for DrivenAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrivenAnimation")
            .field("driven", &self.handle.borrow().is_some())
            .field("starts", &self.starts.get())
            .field("cleanups", &self.cleanups.get())
            .finish_non_exhaustive()
    }
}

impl Animation for DrivenAnimation {
    fn duration(&self) -> Duration {
        self.timed.duration()
    }

    fn perform(&self, context: AnimationContext) {
        match self.handle() {
            Some(handle) => handle.attach(context),
            None => self.timed.perform(context),
        }
    }

    fn interactive(&self) -> Option<&dyn InteractiveAnimation> {
        Some(self as &dyn InteractiveAnimation)
    }
}

impl InteractiveAnimation for DrivenAnimation {
    fn start(&self) -> Option<Rc<dyn InteractionHandle>> {
        let handle = Rc::new(DrivenHandle::default());
        let previous = self.handle.borrow_mut().replace(handle.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        self.starts.set(self.starts.get() + 1);
        Some(handle as Rc<dyn InteractionHandle>)
    }

    fn cleanup(&self) {
        let handle = self.handle.borrow_mut().take();
        if let Some(handle) = handle
            && handle.outcome().is_none()
        {
            handle.cancel();
        }
        self.cleanups.set(self.cleanups.get() + 1);
    }
}

/// Percent-driven handle of a [`DrivenAnimation`].
#[derive(Default)]
pub struct DrivenHandle {
    context: RefCell<Option<AnimationContext>>,
    progress: RefCell<Vec<f64>>,
    outcome: Cell<Option<bool>>,
}

impl DrivenHandle {
    /// Every progress value received, clamped to `0.0..=1.0`.
    pub fn progress_history(&self) -> Vec<f64> {
        self.progress.borrow().clone()
    }

    /// `Some(true)` once finished, `Some(false)` once cancelled.
    pub fn outcome(&self) -> Option<bool> {
        self.outcome.get()
    }

    /// Returns true while a container operation waits on this handle.
    pub fn is_driving(&self) -> bool {
        self.context.borrow().is_some()
    }

    fn attach(&self, context: AnimationContext) {
        match self.outcome.get() {
            Some(finished) => context.complete(finished),
            None => {
                let previous = self.context.borrow_mut().replace(context);
                drop(previous);
            }
        }
    }

    fn resolve(&self, finished: bool) {
        if self.outcome.get().is_some() {
            return;
        }
        self.outcome.set(Some(finished));
        let context = self.context.borrow_mut().take();
        if let Some(context) = context {
            context.complete(finished);
        }
    }
}

impl fmt::Debug for DrivenHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrivenHandle")
            .field("driving", &self.is_driving())
            .field("progress", &self.progress.borrow().last())
            .field("outcome", &self.outcome.get())
            .finish()
    }
}

impl InteractionHandle for DrivenHandle {
    fn update(&self, progress: f64) {
        self.progress.borrow_mut().push(progress.clamp(0.0, 1.0));
    }

    fn finish(&self) {
        self.resolve(true);
    }

    fn cancel(&self) {
        self.resolve(false);
    }
}
