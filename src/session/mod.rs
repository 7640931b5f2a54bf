pub mod practice;
pub mod settings;
pub mod timer;

pub use practice::{Phase, PracticeSession, SessionState};
pub use settings::{AutoInterval, DisplayType, SelectionConfig, SettingsPatch};
