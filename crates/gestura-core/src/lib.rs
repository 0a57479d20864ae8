//! Multi-pointer gesture recognition.
//!
//! Raw pointer events go in, named gesture events come out:
//! - Input normalization: [`RawInput`] to [`InputFrame`] with totals, deltas
//!   and interval-sampled velocity
//! - Recognizers: [`Pan`], [`Pinch`], [`Rotate`], [`Swipe`], [`Press`],
//!   [`Tap`] behind one [`Recognizer`] state machine
//! - Arbitration: the [`Manager`] decides which recognizers may advance,
//!   honours simultaneous and require-failure relations, and dispatches
//!   events to handlers
//!
//! The engine never reads a clock. Time only moves through input
//! timestamps and [`Manager::advance`].

mod error;
mod event;
mod geometry;
pub mod input;
pub mod kinematics;
mod manager;
pub mod recognizer;
mod session;
pub mod source;
pub mod target;
pub mod timer;
pub mod touch_action;

pub use error::GestureError;
pub use event::{
    DefaultPrevented, InputPhase, NoSource, PointerId, PointerSample, PointerType, RawInput,
    SourceEvent,
};
pub use geometry::Point;
pub use input::InputFrame;
pub use kinematics::{Direction, Velocity};
pub use manager::{
    EmitControl, HandlerId, Manager, ManagerOptions, Peers, RecognizerRef, INPUT_EVENT,
};
pub use recognizer::{
    GestureEvent, Pan, PanOptions, Pinch, PinchOptions, Press, PressOptions, Recognizer,
    RecognizerId, RecognizerKind, RecognizerState, Rotate, RotateOptions, Swipe, SwipeOptions,
    Tap, TapOptions,
};
pub use session::{Session, StopState};
pub use source::{PointerAction, PointerEvent, PointerTracker};
pub use target::{FlatTree, ParentMap, TargetId, TargetTree};
pub use touch_action::{TouchAction, TouchActionSetting};
