//! Falling-target data structures.
//!
//! Elements spawn above the play area, fall for one fall period, and are
//! either tapped by the player or resolved at the bottom boundary.

use super::clock::GameClock;
use super::observer::{SessionEvent, SessionObserver};
use crate::core::config::GameConfig;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use uuid::Uuid;

/// Opaque identity of a falling element, stable for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First block is enough to tell elements apart in logs
        let full = self.0.simple().to_string();
        write!(f, "{}", &full[..8])
    }
}

/// A point in world units. Y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the visible play area in world units, supplied by the host at
/// layout time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Negative or non-finite dimensions clamp to zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: clamp_dimension(width),
            height: clamp_dimension(height),
        }
    }
}

fn clamp_dimension(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(400.0, 800.0)
    }
}

/// A single falling target.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    /// `x` is the left edge, `y` the vertical center.
    pub position: Position,
    pub tapped: bool,
    /// Clock time the element was spawned at.
    pub spawned_at_ms: u64,
}

impl Element {
    pub fn new(position: Position, spawned_at_ms: u64) -> Self {
        Self {
            id: ElementId::new(),
            position,
            tapped: false,
            spawned_at_ms,
        }
    }

    /// Whether `point` lies inside the element's circle.
    pub fn contains(&self, point: Position, size: f64) -> bool {
        ElementView::from(self).contains(point, size)
    }
}

/// Read-only view of an element for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementView {
    pub id: ElementId,
    pub position: Position,
    pub tapped: bool,
}

impl ElementView {
    /// Whether `point` lies inside a circle of diameter `size` whose left
    /// edge is at `position.x`.
    pub fn contains(&self, point: Position, size: f64) -> bool {
        let radius = size / 2.0;
        let dx = point.x - (self.position.x + radius);
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= radius * radius
    }
}

impl From<&Element> for ElementView {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id,
            position: element.position,
            tapped: element.tapped,
        }
    }
}

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    GameOver { final_score: u32 },
}

/// What happens to an element the moment it is tapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapPolicy {
    /// Tapped elements leave the play area immediately and are never resolved.
    #[default]
    Pop,
    /// Tapped elements keep falling and count as touched bottom on resolution.
    CountAtBoundary,
}

/// Terminal fate of an element that reached its resolution deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallOutcome {
    Missed,
    TouchedBottom,
}

/// Main session state.
pub struct FallingGame {
    pub(crate) config: GameConfig,
    pub(crate) viewport: Viewport,

    // Active elements, addressable by id, with spawn order kept separately
    pub(crate) elements: HashMap<ElementId, Element>,
    pub(crate) order: VecDeque<ElementId>,

    // Scoring
    pub(crate) score: u32,
    pub(crate) best_score: u32,
    pub(crate) missed_count: u32,
    pub(crate) touched_bottom_count: u32,

    pub(crate) phase: GamePhase,
    pub(crate) clock: GameClock,

    pub(crate) observers: Vec<Box<dyn SessionObserver + Send>>,
}

impl FallingGame {
    /// Create a new session. The first spawn fires at clock time zero.
    pub fn new(config: GameConfig, viewport: Viewport) -> Self {
        let mut clock = GameClock::new();
        clock.schedule_spawn(0);
        Self {
            config,
            viewport,
            elements: HashMap::new(),
            order: VecDeque::new(),
            score: 0,
            best_score: 0,
            missed_count: 0,
            touched_bottom_count: 0,
            phase: GamePhase::Playing,
            clock,
            observers: Vec::new(),
        }
    }

    /// Register an observer for session events.
    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver + Send>) {
        self.observers.push(observer);
    }

    pub(crate) fn notify(&mut self, event: SessionEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Update the play area size, e.g. after a terminal resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Highest final score reached by this session object, including any
    /// carried in with [`FallingGame::record_best_score`].
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Carry a best score over from an earlier session. Never lowers it.
    pub fn record_best_score(&mut self, score: u32) {
        self.best_score = self.best_score.max(score);
    }

    pub fn missed_count(&self) -> u32 {
        self.missed_count
    }

    pub fn touched_bottom_count(&self) -> u32 {
        self.touched_bottom_count
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver { .. })
    }

    /// Misses the player can still afford before the game ends.
    pub fn lives_left(&self) -> u32 {
        self.config.max_missed.saturating_sub(self.missed_count)
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn active_count(&self) -> usize {
        self.order.len()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Active elements in spawn order.
    pub fn snapshot(&self) -> Vec<ElementView> {
        self.order
            .iter()
            .filter_map(|id| self.elements.get(id))
            .map(ElementView::from)
            .collect()
    }

    /// Y coordinate elements spawn at, fully above the visible area.
    pub fn spawn_y(&self) -> f64 {
        -self.config.element_size / 2.0
    }

    /// Y coordinate of the bottom boundary, fully below the visible area.
    pub fn bottom_y(&self) -> f64 {
        self.viewport.height + self.config.element_size / 2.0
    }
}

impl fmt::Debug for FallingGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallingGame")
            .field("phase", &self.phase)
            .field("score", &self.score)
            .field("missed_count", &self.missed_count)
            .field("touched_bottom_count", &self.touched_bottom_count)
            .field("active", &self.order.len())
            .field("now_ms", &self.clock.now_ms())
            .finish()
    }
}
