//! The manager: owns the recognizers and the session, arbitrates which
//! recognizers may advance on each frame, and dispatches named events.
//!
//! # Example
//!
//! ```
//! use gestura_core::{InputPhase, Manager, ManagerOptions, NoSource, PointerSample, RawInput};
//!
//! let mut manager = Manager::with_default_preset(ManagerOptions::default());
//! manager.on("tap", |event, _| println!("tap x{:?}", event.tap_count));
//!
//! let down = RawInput::new(InputPhase::Start, vec![PointerSample::new(1, 10.0, 10.0)], 0);
//! let up = RawInput::new(InputPhase::End, vec![PointerSample::new(1, 10.0, 10.0)], 80);
//! manager.handle(&down, &mut NoSource);
//! manager.handle(&up, &mut NoSource);
//! ```

use crate::error::GestureError;
use crate::event::{NoSource, RawInput, SourceEvent};
use crate::input::{self, InputFrame};
use crate::kinematics::Direction;
use crate::recognizer::{
    GestureEvent, PanOptions, PinchOptions, PressOptions, Recognizer, RecognizerId,
    RecognizerState, RotateOptions, SwipeOptions, TapOptions,
};
use crate::session::{Session, StopState};
use crate::target::{self, FlatTree, TargetId, TargetTree};
use crate::touch_action::{self, TouchAction, TouchActionSetting};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

/// Event name under which every normalized frame is emitted.
pub const INPUT_EVENT: &str = "input";

/// Manager-wide options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerOptions {
    /// Accept input at all
    pub enable: bool,
    /// Computed or fixed touch-action
    pub touch_action: TouchActionSetting,
    /// The host enforces touch-action itself; never prevent defaults
    pub native_touch_action: bool,
    /// Logical root that frame targets resolve against
    pub root: TargetId,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            enable: true,
            touch_action: TouchActionSetting::Compute,
            native_touch_action: false,
            root: TargetId::default(),
        }
    }
}

/// A recognizer named by id or by event name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerRef {
    /// By manager id
    Id(RecognizerId),
    /// By event name
    Name(String),
}

impl fmt::Display for RecognizerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<RecognizerId> for RecognizerRef {
    fn from(id: RecognizerId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for RecognizerRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for RecognizerRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for RecognizerRef {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

/// One or more relation peers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Peers(Vec<RecognizerRef>);

impl From<RecognizerRef> for Peers {
    fn from(peer: RecognizerRef) -> Self {
        Self(vec![peer])
    }
}

impl From<RecognizerId> for Peers {
    fn from(id: RecognizerId) -> Self {
        Self(vec![id.into()])
    }
}

impl From<&str> for Peers {
    fn from(name: &str) -> Self {
        Self(vec![name.into()])
    }
}

impl From<String> for Peers {
    fn from(name: String) -> Self {
        Self(vec![name.into()])
    }
}

impl<T: Into<RecognizerRef>> From<Vec<T>> for Peers {
    fn from(peers: Vec<T>) -> Self {
        Self(peers.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RecognizerRef> + Clone> From<&[T]> for Peers {
    fn from(peers: &[T]) -> Self {
        Self(peers.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<RecognizerRef>, const N: usize> From<[T; N]> for Peers {
    fn from(peers: [T; N]) -> Self {
        Self(peers.into_iter().map(Into::into).collect())
    }
}

/// Handle returned by [`Manager::on`], used to remove a single handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

/// Per-dispatch controls handed to every handler.
pub struct EmitControl<'a> {
    src: &'a mut dyn SourceEvent,
    stop: Option<bool>,
}

impl<'a> EmitControl<'a> {
    pub(crate) fn new(src: &'a mut dyn SourceEvent) -> Self {
        Self { src, stop: None }
    }

    /// Stop recognition for the rest of the sequence.
    ///
    /// Applies before the next recognizer is evaluated. A forced stop also
    /// resets every recognizer and cancels their timers.
    pub fn stop(&mut self, forced: bool) {
        self.stop = Some(forced);
    }

    /// Suppress the platform default for the triggering raw event.
    pub fn prevent_default(&mut self) {
        self.src.prevent_default();
    }
}

type Handler = Box<dyn FnMut(&GestureEvent, &mut EmitControl<'_>)>;

/// Owns recognizers, the session and the handler registry.
pub struct Manager {
    options: ManagerOptions,
    recognizers: Vec<Recognizer>,
    next_id: u32,
    handlers: HashMap<HandlerId, Handler>,
    routes: HashMap<String, Vec<HandlerId>>,
    next_handler: u64,
    session: Session,
    tree: Box<dyn TargetTree>,
    touch_action: TouchAction,
    touch_action_dirty: bool,
    destroyed: bool,
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("options", &self.options)
            .field("recognizers", &self.recognizers)
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .field("session", &self.session)
            .field("touch_action", &self.touch_action)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(ManagerOptions::default())
    }
}

impl Manager {
    /// Create an empty manager.
    #[must_use]
    pub fn new(options: ManagerOptions) -> Self {
        Self {
            options,
            recognizers: Vec::new(),
            next_id: 0,
            handlers: HashMap::new(),
            routes: HashMap::new(),
            next_handler: 0,
            session: Session::new(),
            tree: Box::new(FlatTree),
            touch_action: TouchAction::AUTO,
            touch_action_dirty: true,
            destroyed: false,
        }
    }

    /// Create a manager with the stock recognizer set.
    ///
    /// In order: rotate (disabled), pinch (disabled, with rotate), horizontal
    /// swipe, horizontal pan (with swipe), tap, doubletap (with tap), press.
    #[must_use]
    pub fn with_default_preset(options: ManagerOptions) -> Self {
        let mut manager = Self::new(options);
        let rotate = manager.add(Recognizer::new(RotateOptions {
            enable: false,
            ..RotateOptions::default()
        }));
        let pinch = manager.add(Recognizer::new(PinchOptions {
            enable: false,
            ..PinchOptions::default()
        }));
        let swipe = manager.add(Recognizer::new(SwipeOptions {
            direction: Direction::HORIZONTAL,
            ..SwipeOptions::default()
        }));
        let pan = manager.add(Recognizer::new(PanOptions {
            direction: Direction::HORIZONTAL,
            ..PanOptions::default()
        }));
        let tap = manager.add(Recognizer::new(TapOptions::default()));
        let doubletap = manager.add(Recognizer::new(TapOptions {
            event: "doubletap".to_string(),
            taps: 2,
            ..TapOptions::default()
        }));
        manager.add(Recognizer::new(PressOptions::default()));

        for (a, b) in [(pinch, rotate), (pan, swipe), (doubletap, tap)] {
            if let (Some(a), Some(b)) = (manager.position(a), manager.position(b)) {
                manager.link_simultaneous(a, b);
            }
        }
        manager
    }

    /// Resolve frame targets against `tree` instead of a flat hierarchy.
    #[must_use]
    pub fn with_tree(mut self, tree: impl TargetTree + 'static) -> Self {
        self.tree = Box::new(tree);
        self
    }

    /// Current options.
    #[must_use]
    pub const fn options(&self) -> &ManagerOptions {
        &self.options
    }

    /// Replace the options; the touch-action is recomputed on the next frame.
    pub fn set_options(&mut self, options: ManagerOptions) {
        self.options = options;
        self.touch_action_dirty = true;
    }

    /// Current sequence memory.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Recognizers in registration order.
    #[must_use]
    pub fn recognizers(&self) -> &[Recognizer] {
        &self.recognizers
    }

    /// Whether [`Manager::destroy`] was called.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Effective touch-action for the current configuration.
    #[must_use]
    pub fn touch_action(&self) -> TouchAction {
        if self.touch_action_dirty {
            self.compute_touch_action()
        } else {
            self.touch_action
        }
    }

    fn compute_touch_action(&self) -> TouchAction {
        match self.options.touch_action {
            TouchActionSetting::Fixed(actions) => actions,
            TouchActionSetting::Compute => self
                .recognizers
                .iter()
                .filter(|r| r.is_enabled())
                .fold(TouchAction::AUTO, |acc, r| acc | r.touch_action())
                .clean(),
        }
    }

    fn refresh_touch_action(&mut self) {
        if self.touch_action_dirty {
            self.touch_action = self.compute_touch_action();
            self.touch_action_dirty = false;
            trace!(touch_action = %self.touch_action, "touch-action updated");
        }
    }

    // ------------------------------------------------------------------
    // Recognizer registry
    // ------------------------------------------------------------------

    /// Add a recognizer, replacing any existing one with the same event name.
    pub fn add(&mut self, mut recognizer: Recognizer) -> RecognizerId {
        if let Some(index) = self.position_by_name(recognizer.event()) {
            let replaced = self.remove_at(index);
            debug!(recognizer = %replaced.event(), "replaced recognizer");
        }
        self.next_id = self.next_id.wrapping_add(1);
        let id = RecognizerId(self.next_id);
        recognizer.set_id(id);
        recognizer.clear_relations();
        debug!(recognizer = %recognizer.event(), %id, "added recognizer");
        self.recognizers.push(recognizer);
        self.touch_action_dirty = true;
        id
    }

    /// Remove a recognizer and purge it from every peer's relations.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::UnknownRecognizer`] if no recognizer matches.
    pub fn remove(&mut self, recognizer: impl Into<RecognizerRef>) -> Result<Recognizer, GestureError> {
        let index = self.resolve(&recognizer.into())?;
        Ok(self.remove_at(index))
    }

    fn remove_at(&mut self, index: usize) -> Recognizer {
        let removed = self.recognizers.remove(index);
        let id = removed.id();
        for other in &mut self.recognizers {
            other.remove_simultaneous(id);
            other.remove_require_failure(id);
        }
        if self.session.cur_recognizer == Some(id) {
            self.session.cur_recognizer = None;
        }
        self.touch_action_dirty = true;
        removed
    }

    /// Look up a recognizer by id or event name.
    #[must_use]
    pub fn get(&self, recognizer: impl Into<RecognizerRef>) -> Option<&Recognizer> {
        self.resolve(&recognizer.into())
            .ok()
            .map(|i| &self.recognizers[i])
    }

    /// Mutable lookup; invalidates the cached touch-action.
    pub fn get_mut(&mut self, recognizer: impl Into<RecognizerRef>) -> Option<&mut Recognizer> {
        let index = self.resolve(&recognizer.into()).ok()?;
        self.touch_action_dirty = true;
        self.recognizers.get_mut(index)
    }

    fn position(&self, id: RecognizerId) -> Option<usize> {
        self.recognizers.iter().position(|r| r.id() == id)
    }

    fn position_by_name(&self, name: &str) -> Option<usize> {
        self.recognizers.iter().position(|r| r.event() == name)
    }

    fn resolve(&self, recognizer: &RecognizerRef) -> Result<usize, GestureError> {
        let found = match recognizer {
            RecognizerRef::Id(id) => self.position(*id),
            RecognizerRef::Name(name) => self.position_by_name(name),
        };
        found.ok_or_else(|| GestureError::UnknownRecognizer(recognizer.to_string()))
    }

    fn resolve_pair(
        &self,
        recognizer: RecognizerRef,
        peers: Peers,
    ) -> Result<(usize, Vec<usize>), GestureError> {
        let index = self.resolve(&recognizer)?;
        let peers = peers
            .0
            .iter()
            .map(|peer| {
                let peer_index = self.resolve(peer)?;
                if peer_index == index {
                    return Err(GestureError::SelfRelation(
                        self.recognizers[index].event().to_string(),
                    ));
                }
                Ok(peer_index)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((index, peers))
    }

    // ------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------

    /// Let `recognizer` and each peer hold a sequence together. Symmetric.
    ///
    /// # Errors
    ///
    /// Fails without changing anything if a name is unknown or a
    /// recognizer is related to itself.
    pub fn recognize_with(
        &mut self,
        recognizer: impl Into<RecognizerRef>,
        peers: impl Into<Peers>,
    ) -> Result<(), GestureError> {
        let (index, peers) = self.resolve_pair(recognizer.into(), peers.into())?;
        for peer in peers {
            self.link_simultaneous(index, peer);
        }
        Ok(())
    }

    fn link_simultaneous(&mut self, a: usize, b: usize) {
        let (id_a, id_b) = (self.recognizers[a].id(), self.recognizers[b].id());
        self.recognizers[a].add_simultaneous(id_b);
        self.recognizers[b].add_simultaneous(id_a);
    }

    /// Remove peers from `recognizer`'s simultaneous set. One-sided.
    ///
    /// # Errors
    ///
    /// Fails if a name is unknown.
    pub fn drop_recognize_with(
        &mut self,
        recognizer: impl Into<RecognizerRef>,
        peers: impl Into<Peers>,
    ) -> Result<(), GestureError> {
        let (index, peers) = self.resolve_pair(recognizer.into(), peers.into())?;
        for peer in peers {
            let peer_id = self.recognizers[peer].id();
            self.recognizers[index].remove_simultaneous(peer_id);
        }
        Ok(())
    }

    /// Make `recognizer` and each peer require the other's failure before
    /// emitting. Symmetric; peers keep their registration order.
    ///
    /// # Errors
    ///
    /// Fails without changing anything if a name is unknown or a
    /// recognizer is related to itself.
    pub fn require_failure(
        &mut self,
        recognizer: impl Into<RecognizerRef>,
        peers: impl Into<Peers>,
    ) -> Result<(), GestureError> {
        let (index, peers) = self.resolve_pair(recognizer.into(), peers.into())?;
        for peer in peers {
            let (id, peer_id) = (self.recognizers[index].id(), self.recognizers[peer].id());
            self.recognizers[index].add_require_failure(peer_id);
            self.recognizers[peer].add_require_failure(id);
        }
        Ok(())
    }

    /// Remove peers from `recognizer`'s require-failure list. One-sided.
    ///
    /// # Errors
    ///
    /// Fails if a name is unknown.
    pub fn drop_require_failure(
        &mut self,
        recognizer: impl Into<RecognizerRef>,
        peers: impl Into<Peers>,
    ) -> Result<(), GestureError> {
        let (index, peers) = self.resolve_pair(recognizer.into(), peers.into())?;
        for peer in peers {
            let peer_id = self.recognizers[peer].id();
            self.recognizers[index].remove_require_failure(peer_id);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------

    /// Register `handler` under each space-separated name in `events`.
    pub fn on(
        &mut self,
        events: &str,
        handler: impl FnMut(&GestureEvent, &mut EmitControl<'_>) + 'static,
    ) -> HandlerId {
        self.next_handler = self.next_handler.wrapping_add(1);
        let id = HandlerId(self.next_handler);
        self.handlers.insert(id, Box::new(handler));
        for event in events.split_whitespace() {
            self.routes.entry(event.to_string()).or_default().push(id);
        }
        id
    }

    /// Unregister handlers from each space-separated name in `events`:
    /// just `handler` if given, otherwise all of them.
    pub fn off(&mut self, events: &str, handler: Option<HandlerId>) {
        for event in events.split_whitespace() {
            match handler {
                Some(id) => {
                    if let Some(route) = self.routes.get_mut(event) {
                        route.retain(|h| *h != id);
                    }
                }
                None => {
                    self.routes.remove(event);
                }
            }
        }
        self.routes.retain(|_, route| !route.is_empty());
        let routes = &self.routes;
        self.handlers
            .retain(|id, _| routes.values().any(|route| route.contains(id)));
    }

    /// Dispatch `event` to its handlers in registration order.
    ///
    /// Stop requests made by handlers take effect once every handler for
    /// this event has run.
    pub fn emit(&mut self, event: &GestureEvent, src: &mut dyn SourceEvent) {
        let Some(route) = self.routes.get(&event.event_type) else {
            return;
        };
        let route = route.clone();
        trace!(event = %event.event_type, handlers = route.len(), "emit");

        let mut stops = Vec::new();
        for id in route {
            if let Some(handler) = self.handlers.get_mut(&id) {
                let mut control = EmitControl::new(&mut *src);
                handler(event, &mut control);
                stops.extend(control.stop);
            }
        }
        for forced in stops {
            self.stop(forced);
        }
    }

    fn dispatch(&mut self, events: &[GestureEvent], src: &mut dyn SourceEvent) {
        for event in events {
            self.emit(event, src);
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Process one raw event end to end.
    ///
    /// Timers due strictly before the event's timestamp fire first. The
    /// normalized frame is emitted as [`INPUT_EVENT`], then recognized.
    pub fn handle(&mut self, raw: &RawInput, src: &mut dyn SourceEvent) {
        if self.destroyed || !self.options.enable {
            return;
        }
        if let Some(before) = raw.timestamp.checked_sub(1) {
            self.advance(before);
        }

        let target = target::resolve(self.tree.as_ref(), self.options.root, raw.hit);
        let frame = input::normalize(&mut self.session, raw, target);
        self.emit(&GestureEvent::new(INPUT_EVENT, frame.clone()), src);
        self.recognize(&frame, src);
        input::record_prev(&mut self.session, &frame);
    }

    fn peer_states(&self) -> Vec<(RecognizerId, RecognizerState)> {
        self.recognizers.iter().map(|r| (r.id(), r.state())).collect()
    }

    fn claim_if_unowned(&mut self, index: usize) {
        let recognizer = &self.recognizers[index];
        if self.session.cur_recognizer.is_none() && recognizer.state().holds_sequence() {
            debug!(recognizer = %recognizer.event(), "sequence claimed");
            self.session.cur_recognizer = Some(recognizer.id());
        }
    }

    fn recognize(&mut self, frame: &InputFrame, src: &mut dyn SourceEvent) {
        if self.session.stopped.is_stopped() {
            return;
        }
        self.refresh_touch_action();
        touch_action::prevent_defaults(
            self.touch_action,
            self.options.native_touch_action,
            &mut self.session,
            frame.offset_direction,
            src,
        );

        if let Some(owner) = self.session.cur_recognizer {
            let finished = self
                .position(owner)
                .map_or(true, |i| self.recognizers[i].state() == RecognizerState::RECOGNIZED);
            if finished {
                self.session.cur_recognizer = None;
            }
        }

        // handlers cannot add or remove recognizers, so indices stay valid
        for index in 0..self.recognizers.len() {
            let owner = self.session.cur_recognizer;
            let forced = self.session.stopped == StopState::Forced;
            let recognizer = &self.recognizers[index];
            let allowed = !forced
                && owner.map_or(true, |owner| {
                    owner == recognizer.id() || recognizer.can_recognize_with(owner)
                });

            if allowed {
                let peers = self.peer_states();
                let events = self.recognizers[index].recognize(frame, &peers);
                self.dispatch(&events, src);
            } else {
                self.recognizers[index].reset();
            }
            self.claim_if_unowned(index);
        }
    }

    // ------------------------------------------------------------------
    // Time and lifecycle
    // ------------------------------------------------------------------

    /// Fire every timer due at or before `now`, earliest first; equal
    /// deadlines fire in registration order.
    pub fn advance(&mut self, now: u64) {
        if self.destroyed {
            return;
        }
        while let Some(index) = self.next_due(now) {
            let peers = self.peer_states();
            let events = self.recognizers[index].fire_timer(now, &peers);
            self.claim_if_unowned(index);
            self.dispatch(&events, &mut NoSource);
        }
    }

    fn next_due(&self, now: u64) -> Option<usize> {
        self.recognizers
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.pending_deadline().filter(|d| *d <= now).map(|d| (d, i)))
            .min()
            .map(|(_, i)| i)
    }

    /// Earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.recognizers
            .iter()
            .filter_map(Recognizer::pending_deadline)
            .min()
    }

    /// Stop recognition for the rest of the sequence.
    ///
    /// A soft stop skips recognition. A forced stop also resets every
    /// recognizer, cancelling their timers.
    pub fn stop(&mut self, forced: bool) {
        self.session.stopped = if forced {
            StopState::Forced
        } else {
            StopState::Soft
        };
        debug!(forced, "recognition stopped");
        if forced {
            for recognizer in &mut self.recognizers {
                recognizer.reset();
            }
        }
    }

    /// Cancel all timers, drop all handlers and the session, and ignore any
    /// further input.
    pub fn destroy(&mut self) {
        for recognizer in &mut self.recognizers {
            recognizer.reset();
        }
        self.handlers.clear();
        self.routes.clear();
        self.session.reset();
        self.destroyed = true;
        debug!("manager destroyed");
    }
}
