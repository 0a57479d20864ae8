//! Recognizer presets.
//!
//! A preset lists recognizers in registration order. Each entry is tagged
//! by `type`, carries that kind's options, and may name peers it recognizes
//! with or requires to fail. Relations are applied after every recognizer
//! has been added, so an entry may name a peer defined later.
//!
//! ```yaml
//! manager:
//!   touch_action: compute
//! recognizers:
//!   - type: pan
//!     direction: HORIZONTAL
//!   - type: tap
//!     event: doubletap
//!     taps: 2
//!   - type: tap
//!     require_failure: [doubletap]
//! ```

use crate::error::ConfigError;
use crate::format::Format;
use gestura_core::{
    Manager, ManagerOptions, PanOptions, PinchOptions, PressOptions, Recognizer, RecognizerKind,
    RotateOptions, SwipeOptions, TapOptions,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Options for one recognizer, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecognizerConfig {
    /// Pan recognizer
    Pan(PanOptions),
    /// Pinch recognizer
    Pinch(PinchOptions),
    /// Rotate recognizer
    Rotate(RotateOptions),
    /// Swipe recognizer
    Swipe(SwipeOptions),
    /// Press recognizer
    Press(PressOptions),
    /// Tap recognizer
    Tap(TapOptions),
}

impl RecognizerConfig {
    /// Event name the recognizer registers under.
    #[must_use]
    pub fn event(&self) -> &str {
        match self {
            Self::Pan(o) => &o.event,
            Self::Pinch(o) => &o.event,
            Self::Rotate(o) => &o.event,
            Self::Swipe(o) => &o.event,
            Self::Press(o) => &o.event,
            Self::Tap(o) => &o.event,
        }
    }

    /// Snapshot the options of a live recognizer.
    #[must_use]
    pub fn of(kind: &RecognizerKind) -> Self {
        match kind {
            RecognizerKind::Pan(g) => Self::Pan(g.options.clone()),
            RecognizerKind::Pinch(g) => Self::Pinch(g.options.clone()),
            RecognizerKind::Rotate(g) => Self::Rotate(g.options.clone()),
            RecognizerKind::Swipe(g) => Self::Swipe(g.options.clone()),
            RecognizerKind::Press(g) => Self::Press(g.options.clone()),
            RecognizerKind::Tap(g) => Self::Tap(g.options.clone()),
        }
    }
}

impl From<RecognizerConfig> for RecognizerKind {
    fn from(config: RecognizerConfig) -> Self {
        match config {
            RecognizerConfig::Pan(o) => o.into(),
            RecognizerConfig::Pinch(o) => o.into(),
            RecognizerConfig::Rotate(o) => o.into(),
            RecognizerConfig::Swipe(o) => o.into(),
            RecognizerConfig::Press(o) => o.into(),
            RecognizerConfig::Tap(o) => o.into(),
        }
    }
}

/// One preset entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizerSpec {
    /// Kind and options
    #[serde(flatten)]
    pub config: RecognizerConfig,
    /// Peers allowed to hold the sequence alongside this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recognize_with: Vec<String>,
    /// Peers that must fail before this one may emit
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require_failure: Vec<String>,
}

impl RecognizerSpec {
    /// Create an entry with no relations.
    #[must_use]
    pub const fn new(config: RecognizerConfig) -> Self {
        Self {
            config,
            recognize_with: Vec::new(),
            require_failure: Vec::new(),
        }
    }
}

/// A full manager configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    /// Manager-wide options
    pub manager: ManagerOptions,
    /// Recognizers in registration order
    pub recognizers: Vec<RecognizerSpec>,
}

impl Preset {
    /// The stock recognizer set, as built by
    /// [`Manager::with_default_preset`].
    #[must_use]
    pub fn default_preset() -> Self {
        Self::from_manager(&Manager::with_default_preset(ManagerOptions::default()))
    }

    /// Describe a live manager's configuration.
    ///
    /// A symmetric relation is written once, on the later-registered side.
    #[must_use]
    pub fn from_manager(manager: &Manager) -> Self {
        let recognizers = manager.recognizers();
        let position = |id| recognizers.iter().position(|r| r.id() == id);

        let specs = recognizers
            .iter()
            .enumerate()
            .map(|(index, recognizer)| {
                let written_here = |peer: &Recognizer, mutual: bool| {
                    position(peer.id()).is_some_and(|p| p < index) || !mutual
                };
                let recognize_with = recognizer
                    .simultaneous()
                    .iter()
                    .filter_map(|id| manager.get(*id))
                    .filter(|peer| written_here(peer, peer.can_recognize_with(recognizer.id())))
                    .map(|peer| peer.event().to_string())
                    .collect();
                let require_failure = recognizer
                    .require_failures()
                    .iter()
                    .filter_map(|id| manager.get(*id))
                    .filter(|peer| {
                        written_here(peer, peer.require_failures().contains(&recognizer.id()))
                    })
                    .map(|peer| peer.event().to_string())
                    .collect();
                RecognizerSpec {
                    config: RecognizerConfig::of(recognizer.kind()),
                    recognize_with,
                    require_failure,
                }
            })
            .collect();

        Self {
            manager: manager.options().clone(),
            recognizers: specs,
        }
    }

    /// Build a manager from this preset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Relation`] if a relation names an unknown
    /// recognizer or the recognizer itself.
    pub fn build(&self) -> Result<Manager, ConfigError> {
        let mut manager = Manager::new(self.manager.clone());
        for spec in &self.recognizers {
            let name = spec.config.event();
            if manager.get(name).is_some() {
                warn!(recognizer = %name, "duplicate recognizer replaces the earlier entry");
            }
            manager.add(Recognizer::new(spec.config.clone()));
        }

        for spec in &self.recognizers {
            let name = spec.config.event();
            let relation = |source| ConfigError::Relation {
                recognizer: name.to_string(),
                source,
            };
            if !spec.recognize_with.is_empty() {
                manager
                    .recognize_with(name, spec.recognize_with.clone())
                    .map_err(relation)?;
            }
            if !spec.require_failure.is_empty() {
                manager
                    .require_failure(name, spec.require_failure.clone())
                    .map_err(relation)?;
            }
        }

        debug!(
            recognizers = manager.recognizers().len(),
            touch_action = %manager.touch_action(),
            "preset built"
        );
        Ok(manager)
    }

    /// Parse a preset in the given format.
    pub fn parse(text: &str, format: Format) -> Result<Self, ConfigError> {
        format.parse(text)
    }

    /// Parse a YAML preset.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse(yaml, Format::Yaml)
    }

    /// Serialize in the given format.
    pub fn render(&self, format: Format) -> Result<String, ConfigError> {
        format.render(self)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        self.render(Format::Yaml)
    }

    /// Load a preset file; the format follows the extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = Format::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        let preset = Self::parse(&text, format)?;
        debug!(path = %path.display(), %format, recognizers = preset.recognizers.len(), "preset loaded");
        Ok(preset)
    }
}
