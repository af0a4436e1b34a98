// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display-container boundary.
//!
//! Each container family supplies primitive operations that
//! [`Transition`](crate::transition::Transition) components compose.
//! Every container can present, dismiss and embed; the family traits add
//! stack, tab, split and page operations.
//!
//! All operations take the units to show, the optional animation pair for the
//! operation, the [`TransitionOptions`] in effect, and a [`Completion`] the
//! container must complete exactly once, after any animation settled.

use std::rc::Rc;

use crate::animation::TransitionAnimation;
use crate::presentable::{DisplayUnit, UnitRef};
use crate::types::{Completion, TransitionOptions};

/// Optional animation pair for a single container operation.
pub type AnimationRef = Option<Rc<TransitionAnimation>>;

/// Basic container: any unit that can present, dismiss and embed.
pub trait Container: DisplayUnit + Sized {
    /// Present `unit` modally over this container (or over whatever it already presents).
    fn present(
        &self,
        unit: UnitRef,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    );

    /// Dismiss the topmost unit presented from this container.
    fn dismiss(&self, animation: AnimationRef, options: TransitionOptions, completion: Completion);

    /// Dismiss everything presented from this container.
    fn dismiss_to_root(
        &self,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    );

    /// Embed `unit` into the slot `into`, replacing any previous content of that slot.
    fn embed(
        &self,
        unit: UnitRef,
        into: UnitRef,
        options: TransitionOptions,
        completion: Completion,
    );
}

/// Stack (navigation) container.
pub trait StackContainer: Container {
    /// Push `unit` on top of the stack.
    fn push(
        &self,
        unit: UnitRef,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    );

    /// Pop the top unit.
    fn pop(&self, animation: AnimationRef, options: TransitionOptions, completion: Completion);

    /// Pop down to the bottom unit.
    fn pop_to_root(
        &self,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    );

    /// Pop until `unit` is on top. Completes without effect if `unit` is not on the stack.
    fn pop_to(
        &self,
        unit: UnitRef,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    );

    /// Replace the whole stack.
    fn set_stack(
        &self,
        units: Vec<UnitRef>,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    );
}

/// Tab container.
pub trait TabContainer: Container {
    /// Replace the tabs.
    fn set_tabs(&self, units: Vec<UnitRef>, options: TransitionOptions, completion: Completion);

    /// Select the tab showing `unit`.
    fn select(&self, unit: UnitRef, options: TransitionOptions, completion: Completion);

    /// Select the tab at `index`.
    fn select_index(&self, index: usize, options: TransitionOptions, completion: Completion);
}

/// Split (master/detail) container.
pub trait SplitContainer: Container {
    /// Show `unit` in the primary column.
    fn show(&self, unit: UnitRef, options: TransitionOptions, completion: Completion);

    /// Show `unit` in the detail column.
    fn show_detail(&self, unit: UnitRef, options: TransitionOptions, completion: Completion);
}

/// Scroll direction used when a page container changes pages.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PageDirection {
    /// Move forward.
    #[default]
    Forward,
    /// Move backward.
    Reverse,
}

/// Page container.
pub trait PageContainer: Container {
    /// Replace the visible pages.
    fn set_pages(
        &self,
        units: Vec<UnitRef>,
        direction: PageDirection,
        options: TransitionOptions,
        completion: Completion,
    );
}

/// Shared handle to a container, erased to its display unit.
pub fn unit_of<C: Container>(container: &Rc<C>) -> UnitRef {
    container.clone()
}
