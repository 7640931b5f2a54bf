use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::engine::sampler::{self, SeenKeys};
use crate::kana::{Column, Kana, Row};
use crate::session::settings::{SelectionConfig, SettingsPatch};
use crate::session::timer::AutoTimer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Configuring,
    Practicing,
}

/// Draw state of one practice run. Cleared by `reset`, unlike the config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    pub current: Option<&'static Kana>,
    /// Only meaningful while practicing with auto-advance on.
    pub paused: bool,
    pub seen: SeenKeys,
    pub hint_visible: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Configuring,
            current: None,
            paused: false,
            seen: SeenKeys::new(),
            hint_visible: false,
        }
    }
}

/// Owns the user's `SelectionConfig` and the draw state, and drives the
/// configuring/practicing transitions plus the auto-advance timer.
pub struct PracticeSession<R = SmallRng> {
    config: SelectionConfig,
    state: SessionState,
    timer: AutoTimer,
    rng: R,
}

impl PracticeSession<SmallRng> {
    pub fn from_entropy(config: SelectionConfig) -> Self {
        Self::new(config, SmallRng::from_entropy())
    }

    pub fn with_seed(config: SelectionConfig, seed: u64) -> Self {
        Self::new(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PracticeSession<R> {
    pub fn new(config: SelectionConfig, rng: R) -> Self {
        Self {
            config,
            state: SessionState::default(),
            timer: AutoTimer::default(),
            rng,
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current(&self) -> Option<&'static Kana> {
        self.state.current
    }

    pub fn is_practicing(&self) -> bool {
        self.state.phase == Phase::Practicing
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn pool(&self) -> Vec<&'static Kana> {
        self.config.pool()
    }

    pub fn can_start(&self) -> bool {
        !self.pool().is_empty()
    }

    pub fn update(&mut self, patch: SettingsPatch, now: Instant) {
        patch.apply_to(&mut self.config);
        if !self.config.auto_advance {
            self.state.paused = false;
        }
        self.sync_timer(now);
    }

    pub fn toggle_row(&mut self, row: Row) -> bool {
        self.config.mode.toggle_row(row)
    }

    pub fn toggle_column(&mut self, column: Column) -> bool {
        self.config.mode.toggle_column(column)
    }

    pub fn toggle_custom(&mut self, kana: &'static Kana) -> bool {
        self.config.mode.toggle_custom(kana)
    }

    pub fn add_custom<I>(&mut self, added: I) -> bool
    where
        I: IntoIterator<Item = &'static Kana>,
    {
        self.config.mode.add_custom(added)
    }

    pub fn clear_custom(&mut self) -> bool {
        self.config.mode.clear_custom()
    }

    /// Configuring -> Practicing. Refused (returns `None`) when already
    /// practicing or when the pool is empty.
    pub fn start(&mut self, now: Instant) -> Option<&'static Kana> {
        if self.is_practicing() {
            return None;
        }
        let pool = self.pool();
        let mut seen = SeenKeys::new();
        let Some(first) = sampler::draw(&pool, &mut seen, &mut self.rng) else {
            debug!("start refused: empty pool");
            return None;
        };

        self.state = SessionState {
            phase: Phase::Practicing,
            current: Some(first),
            paused: false,
            seen,
            hint_visible: false,
        };
        info!(
            pool = pool.len(),
            display = ?self.config.display_type,
            mode = ?self.config.mode.kind(),
            auto = self.config.auto_advance,
            "practice started"
        );
        self.sync_timer(now);
        Some(first)
    }

    /// Draws the next card. Stays on the current card if the pool is
    /// empty; ignored outside the practicing phase.
    pub fn next(&mut self) -> Option<&'static Kana> {
        if !self.is_practicing() {
            return None;
        }
        let pool = self.pool();
        let card = sampler::draw(&pool, &mut self.state.seen, &mut self.rng)?;
        debug!(
            card = card.hiragana,
            seen = self.state.seen.len(),
            pool = pool.len(),
            "drew card"
        );
        self.state.current = Some(card);
        self.state.hint_visible = false;
        Some(card)
    }

    /// Ignored unless practicing with auto-advance enabled.
    pub fn toggle_pause(&mut self, now: Instant) {
        if !self.is_practicing() || !self.config.auto_advance {
            return;
        }
        self.state.paused = !self.state.paused;
        debug!(paused = self.state.paused, "toggled pause");
        self.sync_timer(now);
    }

    pub fn toggle_hint(&mut self) {
        if self.state.current.is_some() {
            self.state.hint_visible = !self.state.hint_visible;
        }
    }

    /// Practicing -> Configuring. The config is left untouched.
    pub fn reset(&mut self) {
        if self.is_practicing() {
            info!(seen = self.state.seen.len(), "practice reset");
        }
        self.state = SessionState::default();
        self.timer.disarm();
    }

    /// Timer notification from the event loop. Returns true when the
    /// auto-advance timer fired and a new card was drawn.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.timer.poll(now) {
            return false;
        }
        self.next().is_some()
    }

    /// How far through the current auto-advance period we are.
    pub fn auto_progress(&self, now: Instant) -> Option<f64> {
        self.timer.progress(now)
    }

    fn timer_should_run(&self) -> bool {
        self.is_practicing() && self.config.auto_advance && !self.state.paused
    }

    /// Arms the timer when practicing + auto + unpaused, re-arms it when the
    /// interval changed, and disarms it on every other path.
    fn sync_timer(&mut self, now: Instant) {
        let period = self.config.auto_interval.duration();
        if !self.timer_should_run() {
            if self.timer.is_armed() {
                self.timer.disarm();
                debug!("auto-advance disarmed");
            }
            return;
        }
        if self.timer.period() != Some(period) {
            self.timer.arm(period, now);
            debug!(secs = self.config.auto_interval.secs(), "auto-advance armed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::filter::SelectionMode;
    use crate::kana::lookup;
    use crate::session::settings::{AutoInterval, DisplayType};
    use std::collections::{BTreeSet, HashSet};
    use std::time::Duration;

    const SEC: Duration = Duration::from_secs(1);

    fn row_config(rows: &[Row]) -> SelectionConfig {
        SelectionConfig {
            mode: SelectionMode::Row(rows.iter().copied().collect()),
            ..SelectionConfig::default()
        }
    }

    fn auto_config(secs: u32) -> SelectionConfig {
        SelectionConfig {
            auto_advance: true,
            auto_interval: AutoInterval::new(secs).unwrap(),
            ..SelectionConfig::default()
        }
    }

    #[test]
    fn test_new_session_is_configuring() {
        let session = PracticeSession::with_seed(SelectionConfig::default(), 1);
        assert_eq!(*session.state(), SessionState::default());
        assert!(session.can_start());
        assert_eq!(session.pool().len(), 71);
    }

    #[test]
    fn test_start_seeds_seen_with_first_card() {
        let mut session = PracticeSession::with_seed(row_config(&[Row::A]), 9);
        let now = Instant::now();
        let first = session.start(now).unwrap();
        assert_eq!(first.row, Row::A);
        assert!(session.is_practicing());
        assert_eq!(session.current(), Some(first));
        assert_eq!(session.state().seen, HashSet::from([first.hiragana]));
        assert!(!session.state().paused);
    }

    #[test]
    fn test_row_scenario_covers_pool_then_rolls_over() {
        for seed in 0..20 {
            let mut session = PracticeSession::with_seed(row_config(&[Row::A]), seed);
            let now = Instant::now();
            let mut shown = vec![session.start(now).unwrap().hiragana];
            for _ in 0..4 {
                shown.push(session.next().unwrap().hiragana);
            }
            let unique: HashSet<&str> = shown.iter().copied().collect();
            assert_eq!(unique, HashSet::from(["あ", "い", "う", "え", "お"]));
            assert_eq!(session.state().seen.len(), 5);

            let sixth = session.next().unwrap();
            assert_eq!(sixth.row, Row::A);
            assert_eq!(session.state().seen, HashSet::from([sixth.hiragana]));
        }
    }

    #[test]
    fn test_start_refused_on_empty_pool() {
        let mut session = PracticeSession::with_seed(row_config(&[]), 1);
        assert!(!session.can_start());
        assert!(session.start(Instant::now()).is_none());
        assert_eq!(session.state().phase, Phase::Configuring);
        assert!(session.current().is_none());
    }

    #[test]
    fn test_next_on_emptied_pool_keeps_card() {
        let mut session = PracticeSession::with_seed(row_config(&[Row::Ka]), 1);
        let now = Instant::now();
        let first = session.start(now).unwrap();
        session.update(SettingsPatch::mode(SelectionMode::Row(BTreeSet::new())), now);
        assert!(session.next().is_none());
        assert_eq!(session.current(), Some(first));
        assert!(session.is_practicing());
    }

    #[test]
    fn test_next_ignored_while_configuring() {
        let mut session = PracticeSession::with_seed(SelectionConfig::default(), 1);
        assert!(session.next().is_none());
        assert!(session.state().seen.is_empty());
    }

    #[test]
    fn test_start_while_practicing_is_refused() {
        let mut session = PracticeSession::with_seed(SelectionConfig::default(), 1);
        let now = Instant::now();
        let first = session.start(now).unwrap();
        assert!(session.start(now).is_none());
        assert_eq!(session.current(), Some(first));
    }

    #[test]
    fn test_reset_preserves_config() {
        let config = SelectionConfig {
            display_type: DisplayType::Katakana,
            mode: SelectionMode::Custom(vec![lookup("あ").unwrap(), lookup("ぽ").unwrap()]),
            auto_advance: true,
            auto_interval: AutoInterval::new(5).unwrap(),
        };
        let mut session = PracticeSession::with_seed(config.clone(), 4);
        let now = Instant::now();
        session.start(now);
        session.next();
        session.toggle_pause(now);
        session.toggle_hint();
        session.reset();

        assert_eq!(*session.config(), config);
        assert_eq!(*session.state(), SessionState::default());
        assert!(!session.is_timer_armed());
    }

    #[test]
    fn test_hint_hidden_on_new_card() {
        let mut session = PracticeSession::with_seed(SelectionConfig::default(), 2);
        session.toggle_hint();
        assert!(!session.state().hint_visible);

        let now = Instant::now();
        session.start(now);
        session.toggle_hint();
        assert!(session.state().hint_visible);
        session.next();
        assert!(!session.state().hint_visible);
    }

    #[test]
    fn test_pause_ignored_without_auto() {
        let mut session = PracticeSession::with_seed(SelectionConfig::default(), 1);
        let now = Instant::now();
        session.start(now);
        session.toggle_pause(now);
        assert!(!session.state().paused);
        assert!(!session.is_timer_armed());
    }

    #[test]
    fn test_auto_advance_fires_every_interval() {
        let mut session = PracticeSession::with_seed(auto_config(2), 1);
        let t0 = Instant::now();
        session.start(t0);
        assert!(session.is_timer_armed());
        assert!(!session.tick(t0 + SEC));
        assert!(session.tick(t0 + SEC * 2));
        assert_eq!(session.state().seen.len(), 2);
        assert!(!session.tick(t0 + SEC * 3));
        assert!(session.tick(t0 + SEC * 4));
        assert_eq!(session.state().seen.len(), 3);
    }

    #[test]
    fn test_pause_tears_down_and_resume_rearms() {
        let mut session = PracticeSession::with_seed(auto_config(2), 1);
        let t0 = Instant::now();
        session.start(t0);
        session.toggle_pause(t0 + SEC);
        assert!(session.state().paused);
        assert!(!session.is_timer_armed());
        assert!(!session.tick(t0 + SEC * 10));

        session.toggle_pause(t0 + SEC * 10);
        assert!(session.is_timer_armed());
        assert!(!session.tick(t0 + SEC * 11));
        assert!(session.tick(t0 + SEC * 12));
    }

    #[test]
    fn test_disabling_auto_tears_down_timer() {
        let mut session = PracticeSession::with_seed(auto_config(1), 1);
        let t0 = Instant::now();
        session.start(t0);
        session.update(SettingsPatch::auto_advance(false), t0);
        assert!(!session.is_timer_armed());
        assert!(!session.tick(t0 + SEC * 5));

        session.update(SettingsPatch::auto_advance(true), t0 + SEC * 5);
        assert!(session.tick(t0 + SEC * 6));
    }

    #[test]
    fn test_disabling_auto_clears_pause() {
        let mut session = PracticeSession::with_seed(auto_config(2), 1);
        let t0 = Instant::now();
        session.start(t0);
        session.toggle_pause(t0);
        assert!(session.state().paused);

        session.update(SettingsPatch::auto_advance(false), t0 + SEC);
        assert!(!session.state().paused);

        session.update(SettingsPatch::auto_advance(true), t0 + SEC * 2);
        assert!(session.is_timer_armed());
        assert!(session.tick(t0 + SEC * 4));
    }

    #[test]
    fn test_interval_change_rearms_from_change() {
        let mut session = PracticeSession::with_seed(auto_config(3), 1);
        let t0 = Instant::now();
        session.start(t0);
        session.update(
            SettingsPatch::auto_interval(AutoInterval::new(5).unwrap()),
            t0 + SEC * 2,
        );
        // No carry-over of the two seconds already elapsed.
        assert!(!session.tick(t0 + SEC * 3));
        assert!(!session.tick(t0 + SEC * 6));
        assert!(session.tick(t0 + SEC * 7));
    }

    #[test]
    fn test_same_interval_does_not_rearm() {
        let mut session = PracticeSession::with_seed(auto_config(3), 1);
        let t0 = Instant::now();
        session.start(t0);
        session.update(
            SettingsPatch::auto_interval(AutoInterval::new(3).unwrap()),
            t0 + SEC * 2,
        );
        assert!(session.tick(t0 + SEC * 3));
    }

    #[test]
    fn test_reset_stops_auto_advance() {
        let mut session = PracticeSession::with_seed(auto_config(1), 1);
        let t0 = Instant::now();
        session.start(t0);
        session.reset();
        assert!(!session.tick(t0 + SEC * 3));
        assert!(session.current().is_none());
    }

    #[test]
    fn test_auto_before_start_stays_disarmed() {
        let mut session = PracticeSession::with_seed(SelectionConfig::default(), 1);
        let t0 = Instant::now();
        session.update(SettingsPatch::auto_advance(true), t0);
        assert!(!session.is_timer_armed());
        assert!(!session.tick(t0 + SEC * 10));
    }

    #[test]
    fn test_custom_edits_go_through_session() {
        let config = SelectionConfig {
            mode: SelectionMode::Custom(vec![lookup("あ").unwrap()]),
            ..SelectionConfig::default()
        };
        let mut session = PracticeSession::with_seed(config, 1);
        session.add_custom([lookup("い").unwrap(), lookup("う").unwrap()]);
        let keys: Vec<&str> = session.pool().iter().map(|k| k.hiragana).collect();
        assert_eq!(keys, vec!["あ", "い", "う"]);
        assert!(session.clear_custom());
        assert!(!session.can_start());
        assert!(!session.toggle_row(Row::Ka));
    }
}
