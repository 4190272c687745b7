//! # Session State
//!
//! The play session: lifecycle state machine, movement, pickup and delivery,
//! the mission clock, chat with the advisor and the read-only views handed
//! to the renderer and the broadcast feed.
//!
//! A session owns one generated [`Level`] at a time. Walls and rescue points
//! never change during play; the session keeps its own copy of the victims
//! still on the ground and the stack the player carries.

use super::{CarryStack, Cell, Direction, PriorityClass, RenderFeed, Snapshot, ViewMode};
use crate::assistant::{
    Advisor, AdvisoryRequest, ChatTranscript, HeuristicAdvisor, SituationScanner,
};
use crate::config::{Difficulty, GameConfig};
use crate::generation::{count_by_priority, Level, LevelGenerator};
use crate::input::InputEvent;
use crate::rendering::Camera;
use crate::SarError;
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Transcript lines passed to the advisor as conversation history.
const ADVISOR_HISTORY_LINES: usize = 10;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Start screen: difficulty and view selection
    Start,
    Playing,
    Paused,
    /// Every victim was delivered
    Complete,
    /// The mission clock reached zero
    TimeExpired,
}

impl SessionState {
    /// Whether the mission is over.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Complete | SessionState::TimeExpired)
    }

    /// Whether a level is loaded.
    pub fn in_mission(self) -> bool {
        !matches!(self, SessionState::Start)
    }
}

/// When a mission counts as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionRule {
    /// No victims on the ground and none carried, checked on a rescue point
    AllVictimsHandled,
    /// Reaching a rescue point ends the mission (single-carry variant)
    ReachRescuePoint,
}

impl CompletionRule {
    /// Single carry slot with a single rescue point plays the short variant.
    pub fn for_config(config: &GameConfig) -> Self {
        if config.carry_capacity == 1 && config.rescue_point_count == 1 {
            CompletionRule::ReachRescuePoint
        } else {
            CompletionRule::AllVictimsHandled
        }
    }
}

/// Receives session snapshots. Implemented by the broadcast feed.
pub trait TickObserver: Send {
    /// Called once per tick while a mission is in progress.
    fn on_tick(&mut self, snapshot: &Snapshot);

    /// Called with a full snapshot after a new level is loaded.
    fn on_level_built(&mut self, snapshot: &Snapshot) {
        self.on_tick(snapshot);
    }

    /// Called with the last update when the mission ends, either complete or
    /// out of time. No ticks follow until the next level is loaded.
    fn on_mission_end(&mut self, snapshot: &Snapshot) {
        self.on_tick(snapshot);
    }
}

/// Counters for the current mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatistics {
    /// Successful moves
    pub moves: u32,
    /// Moves refused because of a wall or the boundary
    pub blocked_moves: u32,
    pub picked_up: u32,
    /// Delivered victims, indexed High, Medium, Low
    pub delivered: [usize; 3],
    /// Drop-offs that delivered at least one victim
    pub deliveries: u32,
}

impl SessionStatistics {
    pub fn total_delivered(&self) -> usize {
        self.delivered.iter().sum()
    }
}

/// Text lines for the heads-up display.
#[derive(Debug, Clone, PartialEq)]
pub struct HudText {
    pub status: String,
    pub difficulty: String,
    pub time: String,
    pub view: String,
    pub zoom: String,
    pub victims_left: String,
    pub player: String,
    pub rescue_points: String,
    pub carrying: String,
}

impl HudText {
    /// Lines in display order.
    pub fn lines(&self) -> [&str; 9] {
        [
            self.status.as_str(),
            self.difficulty.as_str(),
            self.time.as_str(),
            self.view.as_str(),
            self.zoom.as_str(),
            self.victims_left.as_str(),
            self.player.as_str(),
            self.rescue_points.as_str(),
            self.carrying.as_str(),
        ]
    }
}

/// A single play session from start screen to mission end.
///
/// # Examples
///
/// ```
/// use sar_mission::{GameConfig, GameSession, SessionState};
///
/// let mut session = GameSession::new(GameConfig::default().with_seed(7));
/// assert_eq!(session.state(), SessionState::Start);
/// session.confirm();
/// assert_eq!(session.state(), SessionState::Playing);
/// ```
pub struct GameSession {
    config: GameConfig,
    state: SessionState,
    difficulty: Difficulty,
    completion_rule: CompletionRule,
    camera: Camera,
    level: Option<Level>,
    /// Current player cell
    player: Cell,
    /// Victims still on the ground
    victims: BTreeMap<Cell, PriorityClass>,
    carried: CarryStack,
    time_remaining: f64,
    time_drain: f64,
    status: String,
    statistics: SessionStatistics,
    transcript: ChatTranscript,
    advisor: Box<dyn Advisor>,
    observers: Vec<Box<dyn TickObserver>>,
}

impl GameSession {
    /// Creates a session on the start screen with the heuristic advisor.
    pub fn new(config: GameConfig) -> Self {
        let completion_rule = CompletionRule::for_config(&config);
        let carried = CarryStack::new(config.carry_capacity);
        let time_remaining = config.time_limit;
        let player = config.start;

        let mut session = Self {
            config,
            state: SessionState::Start,
            difficulty: Difficulty::default(),
            completion_rule,
            camera: Camera::default(),
            level: None,
            player,
            victims: BTreeMap::new(),
            carried,
            time_remaining,
            time_drain: 1.0,
            status: String::new(),
            statistics: SessionStatistics::default(),
            transcript: ChatTranscript::default(),
            advisor: Box::new(HeuristicAdvisor::new()),
            observers: Vec::new(),
        };
        session.refresh_status();
        session
    }

    /// Replaces the advisor.
    pub fn with_advisor(mut self, advisor: Box<dyn Advisor>) -> Self {
        self.set_advisor(advisor);
        self
    }

    pub fn set_advisor(&mut self, advisor: Box<dyn Advisor>) {
        info!("Using the {} advisor", advisor.name());
        self.advisor = advisor;
    }

    pub fn add_observer(&mut self, observer: Box<dyn TickObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn completion_rule(&self) -> CompletionRule {
        self.completion_rule
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn view_mode(&self) -> ViewMode {
        self.camera.view_mode()
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    /// Victims still on the ground.
    pub fn victims(&self) -> &BTreeMap<Cell, PriorityClass> {
        &self.victims
    }

    pub fn carried(&self) -> &CarryStack {
        &self.carried
    }

    pub fn time_remaining(&self) -> f64 {
        self.time_remaining
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn statistics(&self) -> &SessionStatistics {
        &self.statistics
    }

    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    /// Ground victims left, indexed High, Medium, Low.
    pub fn victims_left(&self) -> [usize; 3] {
        count_by_priority(self.victims.values())
    }

    /// Chooses the difficulty. Only honored on the start screen.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        if self.state == SessionState::Start {
            self.difficulty = difficulty;
            debug!("Difficulty set to {}", difficulty);
        }
    }

    pub fn cycle_difficulty(&mut self, forward: bool) {
        let next = if forward {
            self.difficulty.next()
        } else {
            self.difficulty.previous()
        };
        self.select_difficulty(next);
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.camera.set_view_mode(view_mode);
    }

    pub fn toggle_view_mode(&mut self) {
        self.camera.toggle_view_mode();
    }

    pub fn adjust_zoom(&mut self, steps: i32) -> f32 {
        self.camera.adjust_zoom(steps)
    }

    /// Enter: starts a mission from the start screen, or returns to the
    /// start screen once a mission has ended.
    pub fn confirm(&mut self) {
        match self.state {
            SessionState::Start => self.start_mission(),
            SessionState::Complete | SessionState::TimeExpired => self.return_to_menu(),
            SessionState::Playing | SessionState::Paused => {}
        }
    }

    /// Generates a level for the selected difficulty and starts playing it.
    pub fn start_mission(&mut self) {
        let params = self.config.level_params(self.difficulty);
        let level = LevelGenerator::new().build(&params);
        let drain = self.config.profile(self.difficulty).time_drain;
        self.load_level(level, drain);
    }

    /// Starts playing a prepared level.
    pub fn load_level(&mut self, level: Level, time_drain: f64) {
        self.player = level.start;
        self.victims = level.victims.clone();
        self.carried = CarryStack::new(self.config.carry_capacity);
        self.time_remaining = self.config.time_limit;
        self.time_drain = time_drain;
        self.statistics = SessionStatistics::default();
        self.level = Some(level);
        self.transition(SessionState::Playing);

        self.transcript.system(&format!(
            "Mission started on {}. Bring victims to a rescue point.",
            self.difficulty
        ));
        info!(
            "Mission started on {} with {} victims",
            self.difficulty,
            self.victims.len()
        );

        if let Some(snapshot) = self.snapshot() {
            for observer in &mut self.observers {
                observer.on_level_built(&snapshot);
            }
        }
    }

    /// Drops the current level and goes back to the start screen.
    pub fn return_to_menu(&mut self) {
        if self.state == SessionState::Start {
            return;
        }
        self.level = None;
        self.victims.clear();
        self.carried.drain_all();
        self.player = self.config.start;
        self.time_remaining = self.config.time_limit;
        self.transition(SessionState::Start);
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            SessionState::Playing => self.transition(SessionState::Paused),
            SessionState::Paused => self.transition(SessionState::Playing),
            _ => {}
        }
    }

    /// Moves one cell. Returns `false` when not playing or the target is a
    /// wall or outside the grid.
    pub fn move_player(&mut self, direction: Direction) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        let Some(level) = self.level.as_ref() else {
            return false;
        };

        let target = self.player.step(direction);
        if level.grid.contains(target) && !level.is_wall(target) {
            self.player = target;
            self.statistics.moves += 1;
            true
        } else {
            self.statistics.blocked_moves += 1;
            false
        }
    }

    /// Per-frame update: pickup, delivery and completion, then observers.
    pub fn tick(&mut self) {
        if self.state != SessionState::Playing {
            return;
        }

        if self.time_remaining <= 0.0 {
            self.expire();
            return;
        }

        self.pick_up();

        let on_rescue_point = self
            .level
            .as_ref()
            .map_or(false, |level| level.is_rescue_point(self.player));
        if on_rescue_point {
            self.deliver();
            let complete = match self.completion_rule {
                CompletionRule::AllVictimsHandled => {
                    self.victims.is_empty() && self.carried.is_empty()
                }
                CompletionRule::ReachRescuePoint => true,
            };
            if complete {
                self.transition(SessionState::Complete);
                self.transcript.system("Mission complete! All victims handled.");
                info!(
                    "Mission complete: {} victims delivered in {} moves",
                    self.statistics.total_delivered(),
                    self.statistics.moves
                );
                self.notify_mission_end();
                return;
            }
        }

        self.notify_observers();
    }

    /// One second of the mission clock.
    pub fn clock_tick(&mut self) {
        if self.state != SessionState::Playing {
            return;
        }
        self.time_remaining = (self.time_remaining - self.time_drain).max(0.0);
        if self.time_remaining <= 0.0 {
            self.expire();
        }
    }

    fn expire(&mut self) {
        self.time_remaining = 0.0;
        self.transition(SessionState::TimeExpired);
        self.transcript.system("Time up! Mission ended.");
        info!(
            "Time expired with {} victims left on the ground",
            self.victims.len()
        );
        self.notify_mission_end();
    }

    fn pick_up(&mut self) {
        let Some(&priority) = self.victims.get(&self.player) else {
            return;
        };
        if self.carried.try_push(priority) {
            self.victims.remove(&self.player);
            self.statistics.picked_up += 1;
            debug!("Picked up a {} victim at {}", priority.color_name(), self.player);
        }
    }

    fn deliver(&mut self) {
        let delivered = self.carried.drain_all();
        if delivered.is_empty() {
            return;
        }
        let counts = count_by_priority(&delivered);
        for (total, count) in self.statistics.delivered.iter_mut().zip(counts) {
            *total += count;
        }
        self.statistics.deliveries += 1;
        self.transcript.system(&format!(
            "Dropped {} victim(s) at rescue point.",
            delivered.len()
        ));
        debug!("Delivered {} victims at {}", delivered.len(), self.player);
    }

    fn notify_observers(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = Snapshot::update(self.player, &self.victims, self.time_remaining);
        for observer in &mut self.observers {
            observer.on_tick(&snapshot);
        }
    }

    fn notify_mission_end(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = Snapshot::update(self.player, &self.victims, self.time_remaining);
        for observer in &mut self.observers {
            observer.on_mission_end(&snapshot);
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            info!("Session state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        self.status = match self.state {
            SessionState::Start => "Select a difficulty and press Enter".to_string(),
            SessionState::Playing => "Find the victims and bring them to a rescue point".to_string(),
            SessionState::Paused => "Paused (P to resume)".to_string(),
            SessionState::Complete => "Mission complete! Press Enter for the menu".to_string(),
            SessionState::TimeExpired => "Time up! Press Enter for the menu".to_string(),
        };
    }

    /// Sends a question to the advisor and records both sides in the
    /// transcript. Returns `false` for blank input.
    pub fn submit_chat(&mut self, text: &str) -> bool {
        let question = text.trim();
        if question.is_empty() {
            return false;
        }

        let history = self.transcript.recent(ADVISOR_HISTORY_LINES);
        self.transcript.user(question);

        let situation = self.situation_summary();
        let request = AdvisoryRequest {
            question,
            situation: &situation,
            history: &history,
        };
        match self.advisor.advise(&request) {
            Ok(answer) => self.transcript.assistant(&answer),
            Err(e) => {
                warn!("Advisor {} failed: {}", self.advisor.name(), e);
                let reason = match e {
                    SarError::Advisor(message) => message,
                    other => other.to_string(),
                };
                self.transcript.assistant(&format!("Error: {}", reason));
            }
        }
        true
    }

    /// Plain-language description of the player's surroundings.
    pub fn situation_summary(&self) -> String {
        match &self.level {
            Some(level) => SituationScanner {
                grid: &level.grid,
                walls: &level.walls,
                victims: &self.victims,
                rescue_points: &level.rescue_points,
                player: self.player,
                carried: self.carried.len(),
            }
            .describe(self.camera.view_mode()),
            None => "no notable features nearby.".to_string(),
        }
    }

    /// Applies one player intent.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Move(direction) => {
                self.move_player(direction);
            }
            InputEvent::ToggleView => self.toggle_view_mode(),
            InputEvent::SelectView(mode) => self.set_view_mode(mode),
            InputEvent::Zoom(steps) => {
                self.adjust_zoom(steps);
            }
            InputEvent::Confirm => self.confirm(),
            InputEvent::SelectDifficulty(difficulty) => self.select_difficulty(difficulty),
            InputEvent::CycleDifficulty(forward) => self.cycle_difficulty(forward),
            InputEvent::TogglePause => self.toggle_pause(),
            InputEvent::Back => self.return_to_menu(),
            InputEvent::SubmitChat(text) => {
                self.submit_chat(&text);
            }
            InputEvent::Quit => {}
        }
    }

    pub fn hud(&self) -> HudText {
        let [high, medium, low] = self.victims_left();
        let rescue_points = self.level.as_ref().map_or(0, |level| level.rescue_points.len());

        HudText {
            status: self.status.clone(),
            difficulty: format!("Difficulty: {}", self.difficulty),
            time: format!("Time: {:>3}s", self.time_remaining.ceil() as u64),
            view: format!("View: {}", self.camera.view_mode().label()),
            zoom: format!("Zoom: {:.2}x", self.camera.zoom()),
            victims_left: format!("Victims left (H/M/L): {}/{}/{}", high, medium, low),
            player: format!("Player: {}", self.player),
            rescue_points: format!("Rescue points: {}", rescue_points),
            carrying: format!(
                "Carrying: {}/{}",
                self.carried.len(),
                self.carried.capacity()
            ),
        }
    }

    /// Borrowed view of everything the renderer draws.
    pub fn render_feed(&self) -> Option<RenderFeed<'_>> {
        let level = self.level.as_ref()?;
        Some(RenderFeed {
            grid: level.grid,
            start: level.start,
            player: self.player,
            walls: &level.walls,
            highlighted: &level.highlighted,
            victims: &self.victims,
            rescue_points: &level.rescue_points,
            carried: self.carried.as_slice(),
            time_remaining: self.time_remaining,
        })
    }

    /// Full snapshot of the current mission.
    pub fn snapshot(&self) -> Option<Snapshot> {
        let level = self.level.as_ref()?;
        Some(Snapshot::full(
            level,
            self.player,
            &self.victims,
            self.time_remaining,
        ))
    }

    /// Matrix export of the current layout with the victims still on the
    /// ground.
    pub fn matrix(&self) -> Option<Vec<Vec<u8>>> {
        let level = self.level.as_ref()?;
        Some(level.matrix_with(&self.victims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::DisabledAdvisor;
    use crate::game::Grid;
    use crate::game::SnapshotKind;
    use std::sync::{Arc, Mutex};

    fn open_level(victims: &[(Cell, PriorityClass)], rescue_points: Vec<Cell>) -> Level {
        let grid = Grid::new(12, 12);
        Level::from_layout(
            grid,
            Cell::new(1, 1),
            grid.perimeter(),
            victims.iter().copied().collect(),
            rescue_points,
        )
    }

    fn playing_session(level: Level) -> GameSession {
        let mut session = GameSession::new(GameConfig::default());
        session.load_level(level, 1.0);
        session
    }

    fn walk(session: &mut GameSession, direction: Direction, steps: usize) {
        for _ in 0..steps {
            assert!(session.move_player(direction));
            session.tick();
        }
    }

    #[test]
    fn test_starts_on_start_screen() {
        let session = GameSession::new(GameConfig::default());
        assert_eq!(session.state(), SessionState::Start);
        assert!(session.level().is_none());
        assert!(session.render_feed().is_none());
        assert_eq!(session.completion_rule(), CompletionRule::AllVictimsHandled);
    }

    #[test]
    fn test_pickup_on_victim_cell() {
        let level = open_level(&[(Cell::new(5, 5), PriorityClass::High)], vec![Cell::new(10, 10)]);
        let mut session = playing_session(level);
        session.player = Cell::new(5, 4);

        assert!(session.move_player(Direction::South));
        session.tick();

        assert!(session.victims().is_empty());
        assert_eq!(session.carried().as_slice(), &[PriorityClass::High]);
        assert_eq!(session.statistics().picked_up, 1);
    }

    #[test]
    fn test_pickup_ignored_when_full() {
        let level = open_level(
            &[
                (Cell::new(2, 1), PriorityClass::Low),
                (Cell::new(3, 1), PriorityClass::Low),
                (Cell::new(4, 1), PriorityClass::Low),
                (Cell::new(5, 1), PriorityClass::High),
            ],
            vec![Cell::new(10, 10)],
        );
        let mut session = playing_session(level);
        walk(&mut session, Direction::East, 4);

        assert_eq!(session.carried().len(), 3);
        assert_eq!(session.victims().get(&Cell::new(5, 1)), Some(&PriorityClass::High));
    }

    #[test]
    fn test_delivery_and_completion() {
        let level = open_level(&[(Cell::new(2, 1), PriorityClass::Medium)], vec![Cell::new(4, 1)]);
        let mut session = playing_session(level);

        walk(&mut session, Direction::East, 3);

        assert_eq!(session.state(), SessionState::Complete);
        assert!(session.carried().is_empty());
        assert_eq!(session.statistics().delivered, [0, 1, 0]);
        let lines: Vec<&str> = session.transcript().lines().collect();
        assert!(lines.contains(&"[SYSTEM] Dropped 1 victim(s) at rescue point."));
        assert_eq!(session.transcript().last(), Some("[SYSTEM] Mission complete! All victims handled."));
    }

    #[test]
    fn test_rescue_point_without_cargo_keeps_playing() {
        let level = open_level(&[(Cell::new(8, 8), PriorityClass::Low)], vec![Cell::new(2, 1)]);
        let mut session = playing_session(level);

        walk(&mut session, Direction::East, 1);

        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.statistics().deliveries, 0);
    }

    #[test]
    fn test_reach_rescue_point_variant() {
        let mut config = GameConfig::default();
        config.carry_capacity = 1;
        config.rescue_point_count = 1;
        let mut session = GameSession::new(config);
        assert_eq!(session.completion_rule(), CompletionRule::ReachRescuePoint);

        session.load_level(
            open_level(&[(Cell::new(8, 8), PriorityClass::Low)], vec![Cell::new(2, 1)]),
            1.0,
        );
        walk(&mut session, Direction::East, 1);
        assert_eq!(session.state(), SessionState::Complete);
    }

    #[test]
    fn test_clock_expires() {
        let mut session = playing_session(open_level(&[], vec![Cell::new(10, 10)]));
        session.time_remaining = 0.4;

        session.clock_tick();

        assert_eq!(session.time_remaining(), 0.0);
        assert_eq!(session.state(), SessionState::TimeExpired);
        assert_eq!(session.transcript().last(), Some("[SYSTEM] Time up! Mission ended."));
        assert!(!session.move_player(Direction::East));
    }

    #[test]
    fn test_pause_freezes_clock_and_moves() {
        let mut session = playing_session(open_level(&[], vec![Cell::new(10, 10)]));
        let before = session.time_remaining();

        session.toggle_pause();
        assert_eq!(session.state(), SessionState::Paused);
        session.clock_tick();
        assert!(!session.move_player(Direction::East));
        assert_eq!(session.time_remaining(), before);

        session.toggle_pause();
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn test_blocked_moves() {
        let mut session = playing_session(open_level(&[], vec![Cell::new(10, 10)]));

        assert!(!session.move_player(Direction::North));
        assert!(!session.move_player(Direction::West));
        assert_eq!(session.player(), Cell::new(1, 1));
        assert_eq!(session.statistics().blocked_moves, 2);
    }

    #[test]
    fn test_difficulty_locked_during_play() {
        let mut session = GameSession::new(GameConfig::default());
        session.handle_input(InputEvent::CycleDifficulty(true));
        assert_eq!(session.difficulty(), Difficulty::Hard);

        session.load_level(open_level(&[], vec![Cell::new(10, 10)]), 1.0);
        session.select_difficulty(Difficulty::Easy);
        assert_eq!(session.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn test_back_returns_to_menu() {
        let mut session = playing_session(open_level(&[], vec![Cell::new(10, 10)]));
        session.handle_input(InputEvent::Back);
        assert_eq!(session.state(), SessionState::Start);
        assert!(session.level().is_none());
    }

    #[test]
    fn test_chat_records_both_sides() {
        let level = open_level(&[(Cell::new(1, 5), PriorityClass::High)], vec![Cell::new(10, 10)]);
        let mut session = playing_session(level);

        assert!(!session.submit_chat("   "));
        assert!(session.submit_chat("where should I go?"));

        let lines: Vec<&str> = session.transcript().lines().collect();
        assert!(lines.contains(&"[YOU] where should I go?"));
        assert!(lines.iter().any(|line| line.starts_with("[AI] ")));
    }

    #[test]
    fn test_chat_error_shown_inline() {
        let mut session = GameSession::new(GameConfig::default()).with_advisor(Box::new(DisabledAdvisor));
        session.submit_chat("hello");
        assert_eq!(session.transcript().last(), Some("[AI] Error: the assistant is disabled"));
    }

    #[test]
    fn test_hud_lines() {
        let level = open_level(
            &[(Cell::new(3, 3), PriorityClass::High), (Cell::new(4, 4), PriorityClass::Low)],
            vec![Cell::new(10, 10)],
        );
        let session = playing_session(level);
        let hud = session.hud();

        assert_eq!(hud.time, "Time: 180s");
        assert_eq!(hud.victims_left, "Victims left (H/M/L): 1/0/1");
        assert_eq!(hud.carrying, "Carrying: 0/3");
        assert_eq!(hud.view, "View: Local");
        assert_eq!(hud.lines().len(), 9);
    }

    struct Recorder(Arc<Mutex<Vec<SnapshotKind>>>);

    impl TickObserver for Recorder {
        fn on_tick(&mut self, snapshot: &Snapshot) {
            if let Ok(mut kinds) = self.0.lock() {
                kinds.push(snapshot.kind);
            }
        }
    }

    /// Keeps only the snapshots passed to `on_mission_end`.
    struct EndRecorder(Arc<Mutex<Vec<Snapshot>>>);

    impl TickObserver for EndRecorder {
        fn on_tick(&mut self, _snapshot: &Snapshot) {}

        fn on_mission_end(&mut self, snapshot: &Snapshot) {
            if let Ok(mut ends) = self.0.lock() {
                ends.push(snapshot.clone());
            }
        }
    }

    #[test]
    fn test_observers_get_full_then_updates() {
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let mut session = GameSession::new(GameConfig::default());
        session.add_observer(Box::new(Recorder(Arc::clone(&kinds))));

        session.load_level(open_level(&[], vec![Cell::new(10, 10)]), 1.0);
        session.tick();
        session.tick();

        let kinds = kinds.lock().unwrap();
        assert_eq!(
            *kinds,
            vec![SnapshotKind::Snapshot, SnapshotKind::Update, SnapshotKind::Update]
        );
    }

    #[test]
    fn test_time_expiry_reaches_observers() {
        let ends = Arc::new(Mutex::new(Vec::new()));
        let mut session = playing_session(open_level(
            &[(Cell::new(6, 6), PriorityClass::Low)],
            vec![Cell::new(10, 10)],
        ));
        session.add_observer(Box::new(EndRecorder(Arc::clone(&ends))));
        session.tick();

        session.time_drain = 200.0;
        session.clock_tick();
        session.tick();

        assert_eq!(session.state(), SessionState::TimeExpired);
        let ends = ends.lock().unwrap();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].kind, SnapshotKind::Update);
        assert_eq!(ends[0].time_remaining, 0.0);
        assert_eq!(ends[0].victims.len(), 1);
    }

    #[test]
    fn test_completion_reaches_observers() {
        let ends = Arc::new(Mutex::new(Vec::new()));
        let mut session = playing_session(open_level(
            &[(Cell::new(2, 1), PriorityClass::Medium)],
            vec![Cell::new(3, 1)],
        ));
        session.add_observer(Box::new(EndRecorder(Arc::clone(&ends))));

        walk(&mut session, Direction::East, 2);
        session.tick();

        assert_eq!(session.state(), SessionState::Complete);
        let ends = ends.lock().unwrap();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].player, [3, 1]);
        assert!(ends[0].victims.is_empty());
    }
}
