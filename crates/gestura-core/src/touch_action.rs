//! Touch-action hints and default-action suppression.
//!
//! Each recognizer declares which native panning/zooming it conflicts with.
//! The manager merges those hints into one cleaned value and uses it to
//! decide, frame by frame, whether to suppress the platform default.

use crate::event::SourceEvent;
use crate::kinematics::Direction;
use crate::session::Session;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Native behaviour a recognizer leaves to the platform.
    ///
    /// The empty set is `auto`: no restriction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TouchAction: u8 {
        /// Platform handles nothing
        const NONE = 1;
        /// Platform may pan horizontally
        const PAN_X = 1 << 1;
        /// Platform may pan vertically
        const PAN_Y = 1 << 2;
        /// Platform may pan and zoom but not double-tap zoom
        const MANIPULATION = 1 << 3;
    }
}

impl TouchAction {
    /// No restriction.
    pub const AUTO: Self = Self::empty();

    /// Reduce a union of hints to the single value the platform accepts.
    #[must_use]
    pub fn clean(self) -> Self {
        if self.contains(Self::NONE) {
            return Self::NONE;
        }
        let pan = self & (Self::PAN_X | Self::PAN_Y);
        if !pan.is_empty() {
            return pan;
        }
        if self.contains(Self::MANIPULATION) {
            return Self::MANIPULATION;
        }
        Self::AUTO
    }

    /// Whether the default must be suppressed for movement in `direction`.
    #[must_use]
    pub fn blocks(self, direction: Direction) -> bool {
        let pan_x = self.contains(Self::PAN_X);
        let pan_y = self.contains(Self::PAN_Y);
        self.contains(Self::NONE)
            || (pan_x && pan_y)
            || (pan_y && direction.intersects(Direction::HORIZONTAL))
            || (pan_x && direction.intersects(Direction::VERTICAL))
    }
}

impl fmt::Display for TouchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("auto");
        }
        let mut words = Vec::new();
        if self.contains(Self::NONE) {
            words.push("none");
        }
        if self.contains(Self::PAN_X) {
            words.push("pan-x");
        }
        if self.contains(Self::PAN_Y) {
            words.push("pan-y");
        }
        if self.contains(Self::MANIPULATION) {
            words.push("manipulation");
        }
        f.write_str(&words.join(" "))
    }
}

impl FromStr for TouchAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .try_fold(Self::AUTO, |acc, word| {
                let flag = match word.to_ascii_lowercase().as_str() {
                    "auto" => Self::AUTO,
                    "none" => Self::NONE,
                    "pan-x" => Self::PAN_X,
                    "pan-y" => Self::PAN_Y,
                    "manipulation" => Self::MANIPULATION,
                    other => return Err(format!("unknown touch-action '{other}'")),
                };
                Ok(acc | flag)
            })
    }
}

/// How the manager picks its touch-action value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TouchActionSetting {
    /// Derive it from the enabled recognizers
    #[default]
    Compute,
    /// Use a fixed value
    Fixed(TouchAction),
}

impl TryFrom<String> for TouchActionSetting {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("compute") {
            Ok(Self::Compute)
        } else {
            value.parse().map(Self::Fixed)
        }
    }
}

impl From<TouchActionSetting> for String {
    fn from(setting: TouchActionSetting) -> Self {
        match setting {
            TouchActionSetting::Compute => "compute".to_string(),
            TouchActionSetting::Fixed(action) => action.to_string(),
        }
    }
}

/// Suppress the platform default when the frame's movement conflicts with
/// `actions`. Once suppressed, every later frame of the sequence is too.
pub(crate) fn prevent_defaults(
    actions: TouchAction,
    native: bool,
    session: &mut Session,
    offset_direction: Direction,
    src: &mut dyn SourceEvent,
) {
    if native {
        return;
    }
    if session.prevented {
        src.prevent_default();
        return;
    }
    if actions.blocks(offset_direction) {
        session.prevented = true;
        src.prevent_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DefaultPrevented;

    #[test]
    fn test_clean_rules() {
        assert_eq!((TouchAction::NONE | TouchAction::PAN_X).clean(), TouchAction::NONE);
        assert_eq!(
            (TouchAction::PAN_X | TouchAction::PAN_Y | TouchAction::MANIPULATION).clean(),
            TouchAction::PAN_X | TouchAction::PAN_Y
        );
        assert_eq!((TouchAction::PAN_Y | TouchAction::MANIPULATION).clean(), TouchAction::PAN_Y);
        assert_eq!(TouchAction::MANIPULATION.clean(), TouchAction::MANIPULATION);
        assert_eq!(TouchAction::AUTO.clean(), TouchAction::AUTO);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(TouchAction::AUTO.to_string(), "auto");
        assert_eq!((TouchAction::PAN_X | TouchAction::PAN_Y).to_string(), "pan-x pan-y");
        assert_eq!("pan-y".parse::<TouchAction>().unwrap(), TouchAction::PAN_Y);
        assert_eq!(" Pan-X  pan-y ".parse::<TouchAction>().unwrap(), TouchAction::PAN_X | TouchAction::PAN_Y);
        assert_eq!("auto".parse::<TouchAction>().unwrap(), TouchAction::AUTO);
        assert!("scroll".parse::<TouchAction>().is_err());
    }

    #[test]
    fn test_setting_serde() {
        let s: TouchActionSetting = serde_json::from_str("\"compute\"").unwrap();
        assert_eq!(s, TouchActionSetting::Compute);
        let s: TouchActionSetting = serde_json::from_str("\"pan-y\"").unwrap();
        assert_eq!(s, TouchActionSetting::Fixed(TouchAction::PAN_Y));
        let json = serde_json::to_string(&TouchActionSetting::Fixed(TouchAction::NONE)).unwrap();
        assert_eq!(json, "\"none\"");
    }

    #[test]
    fn test_blocks_by_direction() {
        assert!(TouchAction::PAN_Y.blocks(Direction::LEFT));
        assert!(!TouchAction::PAN_Y.blocks(Direction::UP));
        assert!(TouchAction::PAN_X.blocks(Direction::DOWN));
        assert!(!TouchAction::PAN_X.blocks(Direction::NONE));
        assert!(TouchAction::NONE.blocks(Direction::NONE));
        assert!(!TouchAction::MANIPULATION.blocks(Direction::RIGHT));
    }

    #[test]
    fn test_prevent_defaults_sticks_for_sequence() {
        let mut session = Session::new();
        let mut src = DefaultPrevented::default();
        prevent_defaults(TouchAction::PAN_Y, false, &mut session, Direction::UP, &mut src);
        assert!(!src.0);

        prevent_defaults(TouchAction::PAN_Y, false, &mut session, Direction::RIGHT, &mut src);
        assert!(src.0);
        assert!(session.prevented());

        let mut next = DefaultPrevented::default();
        prevent_defaults(TouchAction::PAN_Y, false, &mut session, Direction::UP, &mut next);
        assert!(next.0);
    }

    #[test]
    fn test_native_never_prevents() {
        let mut session = Session::new();
        let mut src = DefaultPrevented::default();
        prevent_defaults(TouchAction::NONE, true, &mut session, Direction::LEFT, &mut src);
        assert!(!src.0);
        assert!(!session.prevented());
    }
}
