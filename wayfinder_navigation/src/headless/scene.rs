// Copyright 2025 the Wayfinder Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory scene graph implementing the container traits.

use core::fmt;
use core::marker::PhantomData;
use core::time::Duration;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::animation::{DrivenAnimation, RunLoop, TimedAnimation};
use crate::animation::{Animation, AnimationContext, AnimationSlot, TransitionAnimation};
use crate::container::{
    AnimationRef, Container, PageContainer, PageDirection, SplitContainer, StackContainer,
    TabContainer,
};
use crate::defect::{self, WiringDefect};
use crate::presentable::{DisplayUnit, Presentable, UnitRef};
use crate::types::{Attachment, Completion, TransitionOptions, UnitId};

/// Duration of the animation used when an animated operation has none.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(300);

/// Operation recorded by a [`Scene`], in the order operations started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    /// A unit became the root of a window.
    SetRoot {
        /// Window root.
        unit: UnitId,
    },
    /// `unit` was presented over `container` (or over what it already presents).
    Present {
        /// Container the operation ran on.
        container: UnitId,
        /// Presented unit.
        unit: UnitId,
    },
    /// The topmost unit presented from `container` was dismissed.
    Dismiss {
        /// Container the operation ran on.
        container: UnitId,
        /// Dismissed unit.
        unit: UnitId,
    },
    /// Everything presented from `container` was dismissed.
    DismissToRoot {
        /// Container the operation ran on.
        container: UnitId,
    },
    /// `unit` was embedded into the slot `container`.
    Embed {
        /// Slot unit.
        container: UnitId,
        /// Embedded unit.
        unit: UnitId,
    },
    /// `unit` was pushed onto the stack `container`.
    Push {
        /// Stack.
        container: UnitId,
        /// Pushed unit.
        unit: UnitId,
    },
    /// `units` were popped off the stack `container`, bottom first.
    Pop {
        /// Stack.
        container: UnitId,
        /// Popped units.
        units: Vec<UnitId>,
    },
    /// The stack `container` was replaced by `units`.
    SetStack {
        /// Stack.
        container: UnitId,
        /// New stack, bottom first.
        units: Vec<UnitId>,
    },
    /// The tabs of `container` were replaced by `units`.
    SetTabs {
        /// Tab container.
        container: UnitId,
        /// New tabs.
        units: Vec<UnitId>,
    },
    /// Tab `index` of `container` was selected.
    Select {
        /// Tab container.
        container: UnitId,
        /// Selected index.
        index: usize,
    },
    /// `unit` was shown in the primary column of `container`.
    Show {
        /// Split container.
        container: UnitId,
        /// Shown unit.
        unit: UnitId,
    },
    /// `unit` was shown in the detail column of `container`.
    ShowDetail {
        /// Split container.
        container: UnitId,
        /// Shown unit.
        unit: UnitId,
    },
    /// The pages of `container` were replaced by `units`.
    SetPages {
        /// Page container.
        container: UnitId,
        /// New pages.
        units: Vec<UnitId>,
        /// Scroll direction.
        direction: PageDirection,
    },
}

/// Marker for plain units.
#[derive(Debug)]
pub enum Plain {}
/// Marker for stack containers.
#[derive(Debug)]
pub enum Stack {}
/// Marker for tab containers.
#[derive(Debug)]
pub enum Tabs {}
/// Marker for split containers.
#[derive(Debug)]
pub enum Split {}
/// Marker for page containers.
#[derive(Debug)]
pub enum Pages {}

/// A plain display unit. Usable as an embed slot.
pub type View = Node<Plain>;
/// A stack container.
pub type NavigationStack = Node<Stack>;
/// A tab container.
pub type TabBar = Node<Tabs>;
/// A two-column split container.
pub type SplitView = Node<Split>;
/// A page container.
pub type PageView = Node<Pages>;

/// A unit of a [`Scene`]. `K` selects the container operations it supports.
///
/// Every node can present, dismiss and embed. Dropping the last reference to a
/// node removes it from the scene and detaches whatever it contained.
pub struct Node<K> {
    id: UnitId,
    name: String,
    scene: Weak<SceneState>,
    this: Weak<Self>,
    shown: Cell<bool>,
    kind: PhantomData<K>,
}

impl<K> Node<K> {
    /// Name given at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, completion: Completion, op: impl FnOnce(&SceneState, Completion)) {
        match self.scene.upgrade() {
            Some(scene) => op(&*scene, completion),
            None => completion.complete(),
        }
    }
}

impl<K> fmt::Debug for Node<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("shown", &self.shown.get())
            .field("kind", &core::any::type_name::<K>())
            .finish_non_exhaustive()
    }
}

impl<K> Drop for Node<K> {
    fn drop(&mut self) {
        if let Some(scene) = self.scene.upgrade() {
            scene.forget(self.id);
        }
    }
}

impl<K: 'static> DisplayUnit for Node<K> {
    fn id(&self) -> UnitId {
        self.id
    }

    fn attachment(&self) -> Attachment {
        self.scene
            .upgrade()
            .map(|scene| scene.attachment(self.id))
            .unwrap_or_default()
    }
}

impl<K: 'static> Presentable for Node<K> {
    fn display_unit(&self) -> Option<UnitRef> {
        self.this.upgrade().map(|node| node as UnitRef)
    }

    fn presented(&self, _from: Option<&UnitRef>) {
        self.shown.set(true);
    }

    // A node introduced by a transition that has not shown it yet is still reachable.
    fn can_be_removed_as_child(&self) -> bool {
        self.shown.get() && !self.is_attached()
    }
}

impl<K: 'static> Container for Node<K> {
    fn present(
        &self,
        unit: UnitRef,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        self.run(completion, |scene, completion| {
            scene.present(self.id, unit, animation, options, completion);
        });
    }

    fn dismiss(&self, animation: AnimationRef, options: TransitionOptions, completion: Completion) {
        self.run(completion, |scene, completion| {
            scene.dismiss(self.id, animation, options, completion);
        });
    }

    fn dismiss_to_root(
        &self,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        self.run(completion, |scene, completion| {
            scene.dismiss_to_root(self.id, animation, options, completion);
        });
    }

    fn embed(
        &self,
        unit: UnitRef,
        into: UnitRef,
        _options: TransitionOptions,
        completion: Completion,
    ) {
        self.run(completion, |scene, completion| {
            scene.record(SceneEvent::Embed {
                container: into.id(),
                unit: unit.id(),
            });
            let replaced = scene.replace_children(into.id(), vec![unit]);
            drop(replaced);
            completion.complete();
        });
    }
}

impl StackContainer for NavigationStack {
    fn push(
        &self,
        unit: UnitRef,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        self.run(completion, |scene, completion| {
            scene.push(self.id, unit, animation, options, completion);
        });
    }

    fn pop(&self, animation: AnimationRef, options: TransitionOptions, completion: Completion) {
        self.run(completion, |scene, completion| {
            let len = scene.children(self.id).len();
            scene.pop_from(self.id, len.saturating_sub(1).max(1), animation, options, completion);
        });
    }

    fn pop_to_root(
        &self,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        self.run(completion, |scene, completion| {
            scene.pop_from(self.id, 1, animation, options, completion);
        });
    }

    fn pop_to(
        &self,
        unit: UnitRef,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        self.run(completion, |scene, completion| {
            let position = scene
                .children(self.id)
                .iter()
                .position(|child| child.id() == unit.id());
            match position {
                Some(index) => scene.pop_from(self.id, index + 1, animation, options, completion),
                None => {
                    tracing::debug!(unit = %unit.id(), "pop_to target is not on the stack");
                    completion.complete();
                }
            }
        });
    }

    fn set_stack(
        &self,
        units: Vec<UnitRef>,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        self.run(completion, |scene, completion| {
            scene.set_stack(self.id, units, animation, options, completion);
        });
    }
}

impl TabContainer for TabBar {
    fn set_tabs(&self, units: Vec<UnitRef>, _options: TransitionOptions, completion: Completion) {
        self.run(completion, |scene, completion| {
            scene.record(SceneEvent::SetTabs {
                container: self.id,
                units: units.iter().map(|u| u.id()).collect(),
            });
            let replaced = scene.replace_children(self.id, units);
            scene.clamp_selection(self.id);
            drop(replaced);
            completion.complete();
        });
    }

    fn select(&self, unit: UnitRef, options: TransitionOptions, completion: Completion) {
        let position = self.scene.upgrade().and_then(|scene| {
            scene
                .children(self.id)
                .iter()
                .position(|child| child.id() == unit.id())
        });
        match position {
            Some(index) => self.select_index(index, options, completion),
            None => {
                tracing::debug!(unit = %unit.id(), "selected unit is not a tab");
                completion.complete();
            }
        }
    }

    fn select_index(&self, index: usize, _options: TransitionOptions, completion: Completion) {
        self.run(completion, |scene, completion| {
            if scene.select(self.id, index) {
                scene.record(SceneEvent::Select {
                    container: self.id,
                    index,
                });
            } else {
                tracing::debug!(index, "tab index out of range");
            }
            completion.complete();
        });
    }
}

impl SplitContainer for SplitView {
    fn show(&self, unit: UnitRef, _options: TransitionOptions, completion: Completion) {
        self.run(completion, |scene, completion| {
            scene.record(SceneEvent::Show {
                container: self.id,
                unit: unit.id(),
            });
            let replaced = scene.set_column(self.id, 0, &unit);
            drop(replaced);
            completion.complete();
        });
    }

    fn show_detail(&self, unit: UnitRef, _options: TransitionOptions, completion: Completion) {
        self.run(completion, |scene, completion| {
            scene.record(SceneEvent::ShowDetail {
                container: self.id,
                unit: unit.id(),
            });
            let replaced = scene.set_column(self.id, 1, &unit);
            drop(replaced);
            completion.complete();
        });
    }
}

impl PageContainer for PageView {
    fn set_pages(
        &self,
        units: Vec<UnitRef>,
        direction: PageDirection,
        _options: TransitionOptions,
        completion: Completion,
    ) {
        self.run(completion, |scene, completion| {
            scene.record(SceneEvent::SetPages {
                container: self.id,
                units: units.iter().map(|u| u.id()).collect(),
                direction,
            });
            let replaced = scene.replace_children(self.id, units);
            drop(replaced);
            completion.complete();
        });
    }
}

/// An in-memory display hierarchy with a manual run loop.
///
/// Cloning a scene yields another handle to the same hierarchy.
#[derive(Clone)]
pub struct Scene {
    state: Rc<SceneState>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("units", &self.state.graph.borrow().len())
            .field("windows", &self.state.windows.borrow().len())
            .field("run_loop", &self.state.run_loop)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        let run_loop = Rc::new(RunLoop::new());
        let state = Rc::new_cyclic(|this| SceneState {
            this: this.clone(),
            next_id: Cell::new(0),
            graph: RefCell::new(HashMap::new()),
            windows: RefCell::new(Vec::new()),
            animations: RefCell::new(HashMap::new()),
            journal: RefCell::new(Vec::new()),
            default_animation: Rc::new(TimedAnimation::new(&run_loop, DEFAULT_ANIMATION_DURATION)),
            run_loop,
        });
        Self { state }
    }

    /// Create a plain unit.
    pub fn view(&self, name: &str) -> Rc<View> {
        self.node(name)
    }

    /// Create a stack container.
    pub fn navigation_stack(&self, name: &str) -> Rc<NavigationStack> {
        self.node(name)
    }

    /// Create a tab container.
    pub fn tab_bar(&self, name: &str) -> Rc<TabBar> {
        self.node(name)
    }

    /// Create a split container.
    pub fn split_view(&self, name: &str) -> Rc<SplitView> {
        self.node(name)
    }

    /// Create a page container.
    pub fn page_view(&self, name: &str) -> Rc<PageView> {
        self.node(name)
    }

    fn node<K: 'static>(&self, name: &str) -> Rc<Node<K>> {
        let id = self.state.allocate();
        let node = Rc::new_cyclic(|this| Node {
            id,
            name: name.to_owned(),
            scene: Rc::downgrade(&self.state),
            this: this.clone(),
            shown: Cell::new(false),
            kind: PhantomData,
        });
        self.state
            .register(id, Rc::downgrade(&node) as Weak<dyn DisplayUnit>);
        node
    }

    /// Make `presentable`'s unit the root of a new window and notify it.
    ///
    /// The window keeps the unit alive until [`detach`](Self::detach).
    pub fn set_root(&self, presentable: &dyn Presentable) {
        let Some(unit) = presentable.display_unit() else {
            defect::report(&WiringDefect::MissingDisplayUnit {
                context: "set_root",
            });
            return;
        };
        self.state.record(SceneEvent::SetRoot { unit: unit.id() });
        if let Some(links) = self.state.graph.borrow_mut().get_mut(&unit.id()) {
            links.window = true;
        }
        self.state.windows.borrow_mut().push(unit);
        presentable.presented(None);
    }

    /// Remove `unit` from its window, container and presenter.
    pub fn detach(&self, unit: UnitId) {
        let from_parent = self.state.detach_from_parent(unit);
        let presenter = self
            .state
            .graph
            .borrow()
            .get(&unit)
            .and_then(|links| links.presenter);
        let from_presenter = presenter.and_then(|p| self.state.unlink_presented(p));
        if let Some(links) = self.state.graph.borrow_mut().get_mut(&unit) {
            links.window = false;
        }
        let from_window = {
            let mut windows = self.state.windows.borrow_mut();
            windows
                .iter()
                .position(|w| w.id() == unit)
                .map(|index| windows.remove(index))
        };
        drop((from_parent, from_presenter, from_window));
    }

    /// Run one run-loop task. Returns false if none was queued.
    pub fn turn(&self) -> bool {
        self.state.run_loop.turn()
    }

    /// Run until no task is queued; returns the number of turns taken.
    pub fn run_until_idle(&self) -> usize {
        self.state.run_loop.run_until_idle()
    }

    /// Number of queued run-loop tasks.
    pub fn pending(&self) -> usize {
        self.state.run_loop.pending()
    }

    /// The scene's run loop.
    pub fn run_loop(&self) -> Rc<RunLoop> {
        self.state.run_loop.clone()
    }

    /// Operations recorded so far.
    pub fn journal(&self) -> Vec<SceneEvent> {
        self.state.journal.borrow().clone()
    }

    /// Forget recorded operations.
    pub fn clear_journal(&self) {
        self.state.journal.borrow_mut().clear();
    }

    /// Units contained by `unit`, in order.
    pub fn children_of(&self, unit: UnitId) -> Vec<UnitId> {
        self.state
            .children(unit)
            .iter()
            .map(|child| child.id())
            .collect()
    }

    /// Unit presented by `unit`, if any.
    pub fn presented_by(&self, unit: UnitId) -> Option<UnitId> {
        self.state
            .graph
            .borrow()
            .get(&unit)?
            .presented
            .as_ref()
            .map(|p| p.id())
    }

    /// Selected tab of `unit`.
    pub fn selected_index(&self, unit: UnitId) -> Option<usize> {
        self.state.graph.borrow().get(&unit)?.selected
    }

    /// Returns true if `unit` is known to the scene.
    pub fn contains(&self, unit: UnitId) -> bool {
        self.state.graph.borrow().contains_key(&unit)
    }

    /// A [`TimedAnimation`] on this scene's run loop.
    pub fn timed_animation(&self, millis: u64) -> Rc<TimedAnimation> {
        Rc::new(TimedAnimation::new(
            &self.state.run_loop,
            Duration::from_millis(millis),
        ))
    }

    /// A [`DrivenAnimation`] on this scene's run loop.
    pub fn driven_animation(&self, millis: u64) -> Rc<DrivenAnimation> {
        Rc::new(DrivenAnimation::new(
            &self.state.run_loop,
            Duration::from_millis(millis),
        ))
    }
}

impl AnimationSlot for Scene {
    fn active_animation(&self, unit: UnitId) -> Option<Rc<TransitionAnimation>> {
        self.state.active_animation(unit)
    }

    fn set_active_animation(&self, unit: UnitId, animation: Option<Rc<TransitionAnimation>>) {
        self.state.set_active_animation(unit, animation);
    }
}

struct Links {
    this: Weak<dyn DisplayUnit>,
    window: bool,
    parent: Option<UnitId>,
    children: Vec<UnitRef>,
    selected: Option<usize>,
    presenter: Option<UnitId>,
    presented: Option<UnitRef>,
}

impl Links {
    fn new(this: Weak<dyn DisplayUnit>) -> Self {
        Self {
            this,
            window: false,
            parent: None,
            children: Vec::new(),
            selected: None,
            presenter: None,
            presented: None,
        }
    }
}

// Units referenced from the graph are only cloned or moved out while the graph
// is borrowed; anything removed is returned and dropped by the caller.
struct SceneState {
    this: Weak<SceneState>,
    next_id: Cell<u64>,
    graph: RefCell<HashMap<UnitId, Links>>,
    windows: RefCell<Vec<UnitRef>>,
    animations: RefCell<HashMap<UnitId, Rc<TransitionAnimation>>>,
    journal: RefCell<Vec<SceneEvent>>,
    default_animation: Rc<TimedAnimation>,
    run_loop: Rc<RunLoop>,
}

impl SceneState {
    fn allocate(&self) -> UnitId {
        let raw = self.next_id.get() + 1;
        self.next_id.set(raw);
        UnitId::new(raw)
    }

    fn register(&self, id: UnitId, this: Weak<dyn DisplayUnit>) {
        self.graph.borrow_mut().insert(id, Links::new(this));
    }

    fn forget(&self, id: UnitId) {
        let Ok(mut graph) = self.graph.try_borrow_mut() else {
            tracing::warn!(unit = %id, "unit dropped while the scene graph was borrowed");
            return;
        };
        let Some(links) = graph.remove(&id) else {
            return;
        };
        for child in &links.children {
            if let Some(child) = graph.get_mut(&child.id())
                && child.parent == Some(id)
            {
                child.parent = None;
            }
        }
        if let Some(presented) = &links.presented
            && let Some(presented) = graph.get_mut(&presented.id())
        {
            presented.presenter = None;
        }
        drop(graph);
        let slot = self.animations.borrow_mut().remove(&id);
        drop((links, slot));
    }

    fn record(&self, event: SceneEvent) {
        tracing::debug!(?event, "scene operation");
        self.journal.borrow_mut().push(event);
    }

    fn unit(&self, id: UnitId) -> Option<UnitRef> {
        let graph = self.graph.borrow();
        graph.get(&id)?.this.upgrade()
    }

    fn attachment(&self, id: UnitId) -> Attachment {
        let graph = self.graph.borrow();
        let Some(links) = graph.get(&id) else {
            return Attachment::empty();
        };
        let mut attachment = Attachment::empty();
        attachment.set(Attachment::WINDOW, links.window);
        attachment.set(Attachment::CONTAINED, links.parent.is_some());
        attachment.set(Attachment::PRESENTED, links.presenter.is_some());
        attachment.set(Attachment::PRESENTING, links.presented.is_some());
        attachment
    }

    fn children(&self, container: UnitId) -> Vec<UnitRef> {
        self.graph
            .borrow()
            .get(&container)
            .map(|links| links.children.clone())
            .unwrap_or_default()
    }

    fn parent_of(&self, unit: UnitId) -> Option<UnitId> {
        self.graph.borrow().get(&unit)?.parent
    }

    fn select(&self, container: UnitId, index: usize) -> bool {
        let mut graph = self.graph.borrow_mut();
        match graph.get_mut(&container) {
            Some(links) if index < links.children.len() => {
                links.selected = Some(index);
                true
            }
            _ => false,
        }
    }

    fn clamp_selection(&self, container: UnitId) {
        if let Some(links) = self.graph.borrow_mut().get_mut(&container) {
            let len = links.children.len();
            links.selected = match links.selected {
                _ if len == 0 => None,
                Some(index) if index < len => Some(index),
                _ => Some(0),
            };
        }
    }

    /// Remove `unit` from the container holding it.
    fn detach_from_parent(&self, unit: UnitId) -> Option<UnitRef> {
        let parent = self.parent_of(unit)?;
        self.unlink_child(parent, unit)
    }

    fn link_child(&self, container: UnitId, unit: &UnitRef) {
        let displaced = match self.parent_of(unit.id()) {
            Some(parent) => self.unlink_child(parent, unit.id()),
            None => None,
        };
        {
            let mut graph = self.graph.borrow_mut();
            if let Some(links) = graph.get_mut(&container) {
                links.children.push(unit.clone());
                if let Some(child) = graph.get_mut(&unit.id()) {
                    child.parent = Some(container);
                }
            }
        }
        drop(displaced);
    }

    fn unlink_child(&self, container: UnitId, unit: UnitId) -> Option<UnitRef> {
        let mut graph = self.graph.borrow_mut();
        let links = graph.get_mut(&container)?;
        let index = links.children.iter().position(|c| c.id() == unit)?;
        let removed = links.children.remove(index);
        if let Some(selected) = links.selected
            && selected >= links.children.len()
        {
            links.selected = links.children.len().checked_sub(1);
        }
        if let Some(child) = graph.get_mut(&unit)
            && child.parent == Some(container)
        {
            child.parent = None;
        }
        Some(removed)
    }

    /// Replace the children of `container`, returning the previous ones.
    fn replace_children(&self, container: UnitId, units: Vec<UnitRef>) -> Vec<UnitRef> {
        let displaced: Vec<UnitRef> = units
            .iter()
            .filter(|u| self.parent_of(u.id()).is_some_and(|p| p != container))
            .filter_map(|u| self.detach_from_parent(u.id()))
            .collect();
        let previous = {
            let mut graph = self.graph.borrow_mut();
            let Some(links) = graph.get_mut(&container) else {
                drop(graph);
                drop((displaced, units));
                return Vec::new();
            };
            let previous = core::mem::replace(&mut links.children, units.clone());
            for old in &previous {
                if let Some(child) = graph.get_mut(&old.id())
                    && child.parent == Some(container)
                {
                    child.parent = None;
                }
            }
            for new in &units {
                if let Some(child) = graph.get_mut(&new.id()) {
                    child.parent = Some(container);
                }
            }
            previous
        };
        drop((displaced, units));
        previous
    }

    /// Put `unit` in column `index`, returning the unit it replaced.
    ///
    /// Missing columns are appended, so a detail column shown before any
    /// primary column takes the first position.
    fn set_column(&self, container: UnitId, index: usize, unit: &UnitRef) -> Option<UnitRef> {
        let displaced = match self.parent_of(unit.id()) {
            Some(parent) if parent != container => self.unlink_child(parent, unit.id()),
            _ => None,
        };
        let mut graph = self.graph.borrow_mut();
        let links = graph.get_mut(&container)?;
        let replaced = if index < links.children.len() {
            Some(core::mem::replace(&mut links.children[index], unit.clone()))
        } else {
            links.children.push(unit.clone());
            None
        };
        if let Some(old) = &replaced
            && let Some(child) = graph.get_mut(&old.id())
            && child.parent == Some(container)
        {
            child.parent = None;
        }
        if let Some(child) = graph.get_mut(&unit.id()) {
            child.parent = Some(container);
        }
        drop(graph);
        drop(displaced);
        replaced
    }

    /// The unit new presentations from `container` go on top of.
    fn topmost_presenter(&self, container: UnitId) -> UnitId {
        let graph = self.graph.borrow();
        let mut current = container;
        for _ in 0..graph.len() {
            match graph.get(&current).and_then(|l| l.presented.as_ref()) {
                Some(presented) => current = presented.id(),
                None => break,
            }
        }
        current
    }

    /// The topmost unit presented from `container` and the unit presenting it.
    fn topmost_presented(&self, container: UnitId) -> Option<(UnitId, UnitRef)> {
        let presenter = self.topmost_presenter(container);
        if presenter == container {
            return None;
        }
        let graph = self.graph.borrow();
        let parent = graph.get(&presenter)?.presenter?;
        let top = graph.get(&parent)?.presented.clone()?;
        Some((parent, top))
    }

    fn link_presented(&self, presenter: UnitId, unit: &UnitRef) -> Option<UnitRef> {
        let mut graph = self.graph.borrow_mut();
        let previous = graph.get_mut(&presenter)?.presented.replace(unit.clone());
        if let Some(links) = graph.get_mut(&unit.id()) {
            links.presenter = Some(presenter);
        }
        previous
    }

    fn unlink_presented(&self, presenter: UnitId) -> Option<UnitRef> {
        let mut graph = self.graph.borrow_mut();
        let removed = graph.get_mut(&presenter)?.presented.take()?;
        if let Some(links) = graph.get_mut(&removed.id())
            && links.presenter == Some(presenter)
        {
            links.presenter = None;
        }
        Some(removed)
    }

    /// Unlink every presentation above `presenter`, bottom first.
    fn unlink_presented_chain(&self, presenter: UnitId) -> Vec<UnitRef> {
        let mut removed = Vec::new();
        let mut current = presenter;
        while let Some(unit) = self.unlink_presented(current) {
            current = unit.id();
            removed.push(unit);
        }
        removed
    }

    fn active_animation(&self, unit: UnitId) -> Option<Rc<TransitionAnimation>> {
        self.animations.borrow().get(&unit).cloned()
    }

    fn set_active_animation(&self, unit: UnitId, animation: Option<Rc<TransitionAnimation>>) {
        let previous = match animation {
            Some(animation) => self.animations.borrow_mut().insert(unit, animation),
            None => self.animations.borrow_mut().remove(&unit),
        };
        drop(previous);
    }

    /// Presentation animation for showing `unit`; an explicit pair becomes the unit's active one.
    fn presentation_for(&self, explicit: &AnimationRef, unit: UnitId) -> Option<Rc<dyn Animation>> {
        match explicit {
            Some(pair) => {
                self.set_active_animation(unit, Some(pair.clone()));
                pair.presentation.clone()
            }
            None => self
                .active_animation(unit)
                .and_then(|pair| pair.presentation.clone()),
        }
    }

    /// Dismissal animation for removing `unit`.
    fn dismissal_for(&self, explicit: &AnimationRef, unit: UnitId) -> Option<Rc<dyn Animation>> {
        match explicit {
            Some(pair) => pair.dismissal.clone(),
            None => self
                .active_animation(unit)
                .and_then(|pair| pair.dismissal.clone()),
        }
    }

    fn animate(
        &self,
        animation: Option<Rc<dyn Animation>>,
        options: TransitionOptions,
        from: Option<UnitRef>,
        to: Option<UnitRef>,
        done: impl FnOnce(bool) + 'static,
    ) {
        if !options.animated {
            drop((from, to));
            done(true);
            return;
        }
        let animation =
            animation.unwrap_or_else(|| self.default_animation.clone() as Rc<dyn Animation>);
        animation.perform(AnimationContext::new(from, to, done));
    }

    fn present(
        &self,
        container: UnitId,
        unit: UnitRef,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        let presenter = self.topmost_presenter(container);
        self.record(SceneEvent::Present {
            container,
            unit: unit.id(),
        });
        let chosen = self.presentation_for(&animation, unit.id());
        let previous = self.link_presented(presenter, &unit);
        drop(previous);
        let from = self.unit(presenter);
        let scene = self.this.clone();
        self.animate(chosen, options, from, Some(unit), move |finished| {
            if !finished && let Some(scene) = scene.upgrade() {
                drop(scene.unlink_presented(presenter));
            }
            completion.complete();
        });
    }

    fn dismiss(
        &self,
        container: UnitId,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        let Some((presenter, top)) = self.topmost_presented(container) else {
            tracing::debug!(container = %container, "nothing to dismiss");
            completion.complete();
            return;
        };
        self.record(SceneEvent::Dismiss {
            container,
            unit: top.id(),
        });
        let chosen = self.dismissal_for(&animation, top.id());
        let to = self.unit(presenter);
        let scene = self.this.clone();
        self.animate(chosen, options, Some(top), to, move |finished| {
            if finished && let Some(scene) = scene.upgrade() {
                drop(scene.unlink_presented(presenter));
            }
            completion.complete();
        });
    }

    fn dismiss_to_root(
        &self,
        container: UnitId,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        let Some((_, top)) = self.topmost_presented(container) else {
            tracing::debug!(container = %container, "nothing to dismiss");
            completion.complete();
            return;
        };
        self.record(SceneEvent::DismissToRoot { container });
        let chosen = self.dismissal_for(&animation, top.id());
        let to = self.unit(container);
        let scene = self.this.clone();
        self.animate(chosen, options, Some(top), to, move |finished| {
            if finished && let Some(scene) = scene.upgrade() {
                drop(scene.unlink_presented_chain(container));
            }
            completion.complete();
        });
    }

    fn push(
        &self,
        container: UnitId,
        unit: UnitRef,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        self.record(SceneEvent::Push {
            container,
            unit: unit.id(),
        });
        let chosen = self.presentation_for(&animation, unit.id());
        let from = self.children(container).last().cloned();
        self.link_child(container, &unit);
        let id = unit.id();
        let scene = self.this.clone();
        self.animate(chosen, options, from, Some(unit), move |finished| {
            if !finished && let Some(scene) = scene.upgrade() {
                drop(scene.unlink_child(container, id));
            }
            completion.complete();
        });
    }

    /// Pop every unit from position `keep` upwards.
    fn pop_from(
        &self,
        container: UnitId,
        keep: usize,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        let stack = self.children(container);
        if stack.len() <= keep {
            tracing::debug!(container = %container, depth = stack.len(), "nothing to pop");
            completion.complete();
            return;
        }
        let popped: Vec<UnitId> = stack[keep..].iter().map(|u| u.id()).collect();
        self.record(SceneEvent::Pop {
            container,
            units: popped.clone(),
        });
        let top = stack.last().cloned();
        let to = stack.get(keep - 1).cloned();
        drop(stack);
        let chosen = top
            .as_ref()
            .and_then(|top| self.dismissal_for(&animation, top.id()));
        let scene = self.this.clone();
        self.animate(chosen, options, top, to, move |finished| {
            if finished && let Some(scene) = scene.upgrade() {
                let removed: Vec<_> = popped
                    .iter()
                    .rev()
                    .filter_map(|id| scene.unlink_child(container, *id))
                    .collect();
                drop(removed);
            }
            completion.complete();
        });
    }

    fn set_stack(
        &self,
        container: UnitId,
        units: Vec<UnitRef>,
        animation: AnimationRef,
        options: TransitionOptions,
        completion: Completion,
    ) {
        self.record(SceneEvent::SetStack {
            container,
            units: units.iter().map(|u| u.id()).collect(),
        });
        let from = self.children(container).last().cloned();
        let to = units.last().cloned();
        let chosen = match &to {
            Some(top) => self.presentation_for(&animation, top.id()),
            None => animation.as_ref().and_then(|pair| pair.dismissal.clone()),
        };
        let previous = self.replace_children(container, units);
        let scene = self.this.clone();
        self.animate(chosen, options, from, to, move |finished| {
            if !finished && let Some(scene) = scene.upgrade() {
                drop(scene.replace_children(container, previous));
            } else {
                drop(previous);
            }
            completion.complete();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::InteractiveAnimation;

    fn immediate() -> (TransitionOptions, Completion) {
        (TransitionOptions::IMMEDIATE, Completion::noop())
    }

    #[test]
    fn push_and_pop_update_containment() {
        let scene = Scene::new();
        let nav = scene.navigation_stack("nav");
        let a = scene.view("a");
        let b = scene.view("b");
        let (options, done) = immediate();
        nav.push(a.clone(), None, options, done);
        nav.push(b.clone(), None, options, Completion::noop());
        assert_eq!(scene.children_of(nav.id()), vec![a.id(), b.id()]);
        assert!(b.attachment().contains(Attachment::CONTAINED));

        nav.pop(None, options, Completion::noop());
        assert_eq!(scene.children_of(nav.id()), vec![a.id()]);
        assert!(!b.is_attached());

        // The bottom unit is never popped.
        nav.pop(None, options, Completion::noop());
        assert_eq!(scene.children_of(nav.id()), vec![a.id()]);
    }

    #[test]
    fn animated_pop_removes_at_completion() {
        let scene = Scene::new();
        let nav = scene.navigation_stack("nav");
        let a = scene.view("a");
        let b = scene.view("b");
        nav.set_stack(
            vec![a.clone() as UnitRef, b.clone()],
            None,
            TransitionOptions::IMMEDIATE,
            Completion::noop(),
        );
        nav.pop(None, TransitionOptions::ANIMATED, Completion::noop());
        assert!(b.is_attached(), "still on screen while animating");
        scene.run_until_idle();
        assert!(!b.is_attached());
    }

    #[test]
    fn pop_to_and_pop_to_root() {
        let scene = Scene::new();
        let nav = scene.navigation_stack("nav");
        let units: Vec<Rc<View>> = ["a", "b", "c", "d"].iter().map(|n| scene.view(n)).collect();
        nav.set_stack(
            units.iter().map(|u| u.clone() as UnitRef).collect(),
            None,
            TransitionOptions::IMMEDIATE,
            Completion::noop(),
        );
        nav.pop_to(units[1].clone(), None, TransitionOptions::IMMEDIATE, Completion::noop());
        assert_eq!(scene.children_of(nav.id()), vec![units[0].id(), units[1].id()]);
        nav.pop_to_root(None, TransitionOptions::IMMEDIATE, Completion::noop());
        assert_eq!(scene.children_of(nav.id()), vec![units[0].id()]);
        assert_eq!(
            scene.journal().last(),
            Some(&SceneEvent::Pop {
                container: nav.id(),
                units: vec![units[1].id()],
            })
        );
    }

    #[test]
    fn present_stacks_and_dismiss_unwinds() {
        let scene = Scene::new();
        let root = scene.view("root");
        let first = scene.view("first");
        let second = scene.view("second");
        let (options, _) = immediate();
        root.present(first.clone(), None, options, Completion::noop());
        root.present(second.clone(), None, options, Completion::noop());
        assert_eq!(scene.presented_by(root.id()), Some(first.id()));
        assert_eq!(scene.presented_by(first.id()), Some(second.id()));
        assert!(first.attachment().contains(Attachment::PRESENTED | Attachment::PRESENTING));

        root.dismiss(None, options, Completion::noop());
        assert_eq!(scene.presented_by(first.id()), None);
        assert!(!second.is_attached());

        root.present(second.clone(), None, options, Completion::noop());
        root.dismiss_to_root(None, options, Completion::noop());
        assert_eq!(scene.presented_by(root.id()), None);
        assert!(!first.is_attached());
    }

    #[test]
    fn cancelled_interactive_pop_keeps_unit() {
        let scene = Scene::new();
        let nav = scene.navigation_stack("nav");
        let a = scene.view("a");
        let b = scene.view("b");
        let driven = scene.driven_animation(250);
        nav.push(a.clone(), None, TransitionOptions::IMMEDIATE, Completion::noop());
        nav.push(
            b.clone(),
            Some(Rc::new(TransitionAnimation::symmetric(driven.clone()))),
            TransitionOptions::IMMEDIATE,
            Completion::noop(),
        );
        assert!(scene.active_animation(b.id()).is_some());

        let handle = driven.start().expect("driven animation starts");
        let completed = Rc::new(Cell::new(false));
        let c = completed.clone();
        nav.pop(
            None,
            TransitionOptions::ANIMATED,
            Completion::new(move || c.set(true)),
        );
        assert!(!completed.get(), "waits for the interaction");
        handle.update(0.3);
        handle.cancel();
        driven.cleanup();
        assert!(completed.get());
        assert_eq!(scene.children_of(nav.id()), vec![a.id(), b.id()]);
    }

    #[test]
    fn cancelled_push_is_reverted() {
        let scene = Scene::new();
        let nav = scene.navigation_stack("nav");
        let a = scene.view("a");
        let driven = scene.driven_animation(250);
        let handle = driven.start().expect("handle");
        nav.push(
            a.clone(),
            Some(Rc::new(TransitionAnimation::symmetric(driven.clone()))),
            TransitionOptions::ANIMATED,
            Completion::noop(),
        );
        assert!(a.is_attached());
        handle.cancel();
        assert!(!a.is_attached());
    }

    #[test]
    fn tabs_split_pages_and_embed() {
        let scene = Scene::new();
        let tabs = scene.tab_bar("tabs");
        let split = scene.split_view("split");
        let pages = scene.page_view("pages");
        let slot = scene.view("slot");
        let a = scene.view("a");
        let b = scene.view("b");
        let (options, _) = immediate();

        tabs.set_tabs(vec![a.clone() as UnitRef, b.clone()], options, Completion::noop());
        tabs.select_index(1, options, Completion::noop());
        assert_eq!(scene.selected_index(tabs.id()), Some(1));
        tabs.select_index(7, options, Completion::noop());
        assert_eq!(scene.selected_index(tabs.id()), Some(1));

        // Moving a tab into the split detaches it from the tabs.
        split.show(a.clone(), options, Completion::noop());
        split.show_detail(b.clone(), options, Completion::noop());
        assert_eq!(scene.children_of(split.id()), vec![a.id(), b.id()]);
        assert!(scene.children_of(tabs.id()).is_empty());
        assert_eq!(scene.selected_index(tabs.id()), None);

        pages.set_pages(
            vec![a.clone() as UnitRef],
            PageDirection::Reverse,
            options,
            Completion::noop(),
        );
        assert_eq!(scene.children_of(pages.id()), vec![a.id()]);
        assert_eq!(scene.children_of(split.id()), vec![b.id()]);

        slot.embed(b.clone(), slot.clone(), options, Completion::noop());
        assert_eq!(scene.children_of(slot.id()), vec![b.id()]);
    }

    #[test]
    fn dropping_a_container_detaches_its_children() {
        let scene = Scene::new();
        let a = scene.view("a");
        {
            let nav = scene.navigation_stack("nav");
            nav.push(a.clone(), None, TransitionOptions::IMMEDIATE, Completion::noop());
            assert!(a.is_attached());
        }
        assert!(!a.is_attached());
        assert!(scene.contains(a.id()));
    }

    #[test]
    fn set_root_and_detach() {
        let scene = Scene::new();
        let root = scene.view("root");
        let id = root.id();
        scene.set_root(&*root);
        assert!(root.attachment().contains(Attachment::WINDOW));
        drop(root);
        assert!(scene.contains(id), "window keeps the unit alive");
        scene.detach(id);
        assert!(!scene.contains(id));
    }
}
