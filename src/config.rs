use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::filter::{ModeKind, SelectionMode};
use crate::engine::hit_test::DEFAULT_DRAG_THRESHOLD;
use crate::kana::{self, Column, Row};
use crate::session::settings::{AutoInterval, DisplayType, SelectionConfig};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display_type: DisplayType,
    #[serde(default = "default_selection_mode")]
    pub selection_mode: ModeKind,
    #[serde(default)]
    pub selected_rows: Vec<Row>,
    #[serde(default)]
    pub selected_columns: Vec<Column>,
    /// Hiragana keys of the hand-picked subset, in selection order.
    #[serde(default)]
    pub custom_selected: Vec<String>,
    #[serde(default)]
    pub auto_advance: bool,
    #[serde(default = "default_auto_interval_secs")]
    pub auto_interval_secs: u32,
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: i32,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_selection_mode() -> ModeKind {
    ModeKind::All
}
fn default_auto_interval_secs() -> u32 {
    u32::from(AutoInterval::default().secs())
}
fn default_drag_threshold() -> i32 {
    DEFAULT_DRAG_THRESHOLD
}
fn default_log_file() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kanadr")
        .join("kanadr.log")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_type: DisplayType::default(),
            selection_mode: default_selection_mode(),
            selected_rows: Vec::new(),
            selected_columns: Vec::new(),
            custom_selected: Vec::new(),
            auto_advance: false,
            auto_interval_secs: default_auto_interval_secs(),
            drag_threshold: default_drag_threshold(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanadr")
            .join("config.toml")
    }

    /// Clamp the interval into range and drop unknown or repeated kana keys
    /// left behind by hand edits.
    pub fn normalize(&mut self) {
        self.auto_interval_secs = u32::from(AutoInterval::clamped(self.auto_interval_secs).secs());
        self.drag_threshold = self.drag_threshold.max(0);

        let mut seen = BTreeSet::new();
        self.custom_selected
            .retain(|key| kana::lookup(key).is_some() && seen.insert(key.clone()));

        let mut rows = BTreeSet::new();
        self.selected_rows.retain(|r| rows.insert(*r));
        let mut columns = BTreeSet::new();
        self.selected_columns.retain(|c| columns.insert(*c));
    }

    /// Build the parameters for `kind` from the remembered rows, columns and
    /// custom subset, so switching modes back and forth loses nothing.
    pub fn mode_for(&self, kind: ModeKind) -> SelectionMode {
        match kind {
            ModeKind::All => SelectionMode::All,
            ModeKind::Dakuon => SelectionMode::Dakuon,
            ModeKind::Row => SelectionMode::Row(self.selected_rows.iter().copied().collect()),
            ModeKind::Column => {
                SelectionMode::Column(self.selected_columns.iter().copied().collect())
            }
            ModeKind::Custom => SelectionMode::Custom(
                self.custom_selected
                    .iter()
                    .filter_map(|key| kana::lookup(key))
                    .collect(),
            ),
        }
    }

    pub fn selection(&self) -> SelectionConfig {
        SelectionConfig {
            display_type: self.display_type,
            mode: self.mode_for(self.selection_mode),
            auto_advance: self.auto_advance,
            auto_interval: AutoInterval::clamped(self.auto_interval_secs),
        }
    }

    /// Store a session's settings back, keeping the parameters of the
    /// modes that are not currently active.
    pub fn remember(&mut self, selection: &SelectionConfig) {
        self.display_type = selection.display_type;
        self.selection_mode = selection.mode.kind();
        self.auto_advance = selection.auto_advance;
        self.auto_interval_secs = u32::from(selection.auto_interval.secs());
        match &selection.mode {
            SelectionMode::Row(rows) => self.selected_rows = rows.iter().copied().collect(),
            SelectionMode::Column(columns) => {
                self.selected_columns = columns.iter().copied().collect()
            }
            SelectionMode::Custom(subset) => {
                self.custom_selected = subset.iter().map(|k| k.hiragana.to_string()).collect()
            }
            SelectionMode::All | SelectionMode::Dakuon => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.display_type, DisplayType::Hiragana);
        assert_eq!(config.selection_mode, ModeKind::All);
        assert!(!config.auto_advance);
        assert_eq!(config.auto_interval_secs, 3);
        assert_eq!(config.drag_threshold, 5);
        assert!(config.log_file.ends_with("kanadr.log"));
    }

    #[test]
    fn test_config_parses_labels() {
        let toml_str = r#"
display_type = "katakana"
selection_mode = "row"
selected_rows = ["a", "ka", "pa"]
selected_columns = ["n"]
auto_advance = true
auto_interval_secs = 7
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.display_type, DisplayType::Katakana);
        assert_eq!(config.selection_mode, ModeKind::Row);
        assert_eq!(config.selected_rows, vec![Row::A, Row::Ka, Row::Pa]);
        assert_eq!(config.selected_columns, vec![Column::N]);

        let selection = config.selection();
        assert!(selection.auto_advance);
        assert_eq!(selection.auto_interval.secs(), 7);
        assert_eq!(selection.pool().len(), 15);
    }

    #[test]
    fn test_unknown_selection_mode_is_rejected() {
        let result: Result<Config, _> = toml::from_str(r#"selection_mode = "hiragana""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_clamps_and_dedups() {
        let mut config = Config {
            auto_interval_secs: 60,
            drag_threshold: -3,
            custom_selected: vec!["あ".into(), "x".into(), "あ".into(), "ぽ".into()],
            selected_rows: vec![Row::Ka, Row::Ka],
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.auto_interval_secs, 10);
        assert_eq!(config.drag_threshold, 0);
        assert_eq!(config.custom_selected, vec!["あ".to_string(), "ぽ".to_string()]);
        assert_eq!(config.selected_rows, vec![Row::Ka]);
    }

    #[test]
    fn test_mode_for_keeps_custom_order() {
        let config = Config {
            custom_selected: vec!["ぽ".into(), "あ".into()],
            ..Config::default()
        };
        let keys: Vec<&str> = config
            .mode_for(ModeKind::Custom)
            .filter()
            .iter()
            .map(|k| k.hiragana)
            .collect();
        assert_eq!(keys, vec!["ぽ", "あ"]);
    }

    #[test]
    fn test_remember_preserves_inactive_drafts() {
        let mut config = Config {
            selected_rows: vec![Row::Sa],
            custom_selected: vec!["ん".into()],
            ..Config::default()
        };
        let mut selection = config.selection();
        selection.mode = SelectionMode::Column(BTreeSet::from([Column::E]));
        selection.display_type = DisplayType::Romaji;
        config.remember(&selection);

        assert_eq!(config.selection_mode, ModeKind::Column);
        assert_eq!(config.display_type, DisplayType::Romaji);
        assert_eq!(config.selected_columns, vec![Column::E]);
        assert_eq!(config.selected_rows, vec![Row::Sa]);
        assert_eq!(config.custom_selected, vec!["ん".to_string()]);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            display_type: DisplayType::Romaji,
            selection_mode: ModeKind::Custom,
            custom_selected: vec!["き".into(), "か".into()],
            auto_advance: true,
            auto_interval_secs: 2,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_load_normalizes_hand_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "auto_interval_secs = 0\ncustom_selected = [\"zz\", \"い\"]\n").unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.auto_interval_secs, 1);
        assert_eq!(loaded.custom_selected, vec!["い".to_string()]);
    }
}
