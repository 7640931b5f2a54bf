use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::filter::SelectionMode;
use crate::kana::Kana;

/// Which notation the card shows.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    #[default]
    Hiragana,
    Katakana,
    Romaji,
}

impl DisplayType {
    pub const ALL: [DisplayType; 3] = [
        DisplayType::Hiragana,
        DisplayType::Katakana,
        DisplayType::Romaji,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DisplayType::Hiragana => "Hiragana",
            DisplayType::Katakana => "Katakana",
            DisplayType::Romaji => "Romaji",
        }
    }

    pub fn glyph(self, kana: &Kana) -> &'static str {
        match self {
            DisplayType::Hiragana => kana.hiragana,
            DisplayType::Katakana => kana.katakana,
            DisplayType::Romaji => kana.romaji,
        }
    }

    /// The two notations not on the card, in hiragana/katakana/romaji order.
    pub fn hints(self, kana: &Kana) -> Vec<&'static str> {
        Self::ALL
            .into_iter()
            .filter(|&d| d != self)
            .map(|d| d.glyph(kana))
            .collect()
    }

    pub fn next(self) -> Self {
        match self {
            DisplayType::Hiragana => DisplayType::Katakana,
            DisplayType::Katakana => DisplayType::Romaji,
            DisplayType::Romaji => DisplayType::Hiragana,
        }
    }

    pub fn prev(self) -> Self {
        self.next().next()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("auto-advance interval must be between 1 and 10 seconds, got {0}")]
    OutOfRange(u32),
}

/// Seconds between automatic card changes, always within 1..=10.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AutoInterval(u8);

impl AutoInterval {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(secs: u32) -> Result<Self, IntervalError> {
        if (u32::from(Self::MIN)..=u32::from(Self::MAX)).contains(&secs) {
            Ok(Self(secs as u8))
        } else {
            Err(IntervalError::OutOfRange(secs))
        }
    }

    pub fn clamped(secs: u32) -> Self {
        Self(secs.clamp(u32::from(Self::MIN), u32::from(Self::MAX)) as u8)
    }

    pub fn secs(self) -> u8 {
        self.0
    }

    pub fn duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }

    pub fn increment(self) -> Self {
        Self((self.0 + 1).min(Self::MAX))
    }

    pub fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN))
    }
}

impl Default for AutoInterval {
    fn default() -> Self {
        Self(3)
    }
}

impl fmt::Display for AutoInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// User-chosen drill settings. Survives session resets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionConfig {
    pub display_type: DisplayType,
    pub mode: SelectionMode,
    pub auto_advance: bool,
    pub auto_interval: AutoInterval,
}

impl SelectionConfig {
    pub fn pool(&self) -> Vec<&'static Kana> {
        self.mode.filter()
    }
}

/// Partial update to a `SelectionConfig`; `None` fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub display_type: Option<DisplayType>,
    pub mode: Option<SelectionMode>,
    pub auto_advance: Option<bool>,
    pub auto_interval: Option<AutoInterval>,
}

impl SettingsPatch {
    pub fn display_type(display_type: DisplayType) -> Self {
        Self {
            display_type: Some(display_type),
            ..Self::default()
        }
    }

    pub fn mode(mode: SelectionMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn auto_advance(enabled: bool) -> Self {
        Self {
            auto_advance: Some(enabled),
            ..Self::default()
        }
    }

    pub fn auto_interval(interval: AutoInterval) -> Self {
        Self {
            auto_interval: Some(interval),
            ..Self::default()
        }
    }

    pub fn apply_to(self, config: &mut SelectionConfig) {
        if let Some(display_type) = self.display_type {
            config.display_type = display_type;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(auto) = self.auto_advance {
            config.auto_advance = auto;
        }
        if let Some(interval) = self.auto_interval {
            config.auto_interval = interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kana::lookup;

    #[test]
    fn test_glyph_and_hints() {
        let shi = lookup("し").unwrap();
        assert_eq!(DisplayType::Katakana.glyph(shi), "シ");
        assert_eq!(DisplayType::Hiragana.hints(shi), vec!["シ", "shi"]);
        assert_eq!(DisplayType::Katakana.hints(shi), vec!["し", "shi"]);
        assert_eq!(DisplayType::Romaji.hints(shi), vec!["し", "シ"]);
    }

    #[test]
    fn test_display_cycle() {
        assert_eq!(DisplayType::Romaji.next(), DisplayType::Hiragana);
        assert_eq!(DisplayType::Hiragana.prev(), DisplayType::Romaji);
    }

    #[test]
    fn test_interval_bounds() {
        assert!(AutoInterval::new(1).is_ok());
        assert!(AutoInterval::new(10).is_ok());
        assert_eq!(AutoInterval::new(0), Err(IntervalError::OutOfRange(0)));
        assert_eq!(AutoInterval::new(11), Err(IntervalError::OutOfRange(11)));
        assert_eq!(AutoInterval::clamped(42).secs(), 10);
        assert_eq!(AutoInterval::clamped(0).secs(), 1);
    }

    #[test]
    fn test_interval_step_saturates() {
        let max = AutoInterval::new(10).unwrap();
        assert_eq!(max.increment(), max);
        let min = AutoInterval::new(1).unwrap();
        assert_eq!(min.decrement(), min);
        assert_eq!(AutoInterval::default().increment().secs(), 4);
        assert_eq!(AutoInterval::default().duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_interval_error_message() {
        let err = AutoInterval::new(20).unwrap_err();
        assert_eq!(
            err.to_string(),
            "auto-advance interval must be between 1 and 10 seconds, got 20"
        );
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut config = SelectionConfig::default();
        SettingsPatch::auto_advance(true).apply_to(&mut config);
        assert!(config.auto_advance);
        assert_eq!(config.display_type, DisplayType::Hiragana);
        assert_eq!(config.mode, SelectionMode::All);

        SettingsPatch {
            display_type: Some(DisplayType::Romaji),
            auto_interval: Some(AutoInterval::new(7).unwrap()),
            ..SettingsPatch::default()
        }
        .apply_to(&mut config);
        assert!(config.auto_advance);
        assert_eq!(config.display_type, DisplayType::Romaji);
        assert_eq!(config.auto_interval.secs(), 7);
    }
}
