//! Game clock and spawner.
//!
//! The clock is a min-heap of scheduled events keyed by fire time. Spawn ticks
//! reschedule themselves every spawn period until the session ends, and each
//! spawn schedules the fall resolution of the element it created.

use super::observer::SessionEvent;
use super::types::{Element, ElementId, FallingGame, Position};
use rand::Rng;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Something that happens at a scheduled clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    SpawnTick,
    ResolveFall(ElementId),
}

/// An event plus its fire time. Ties on fire time fire in scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub fire_at_ms: u64,
    pub seq: u64,
    pub event: ClockEvent,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.fire_at_ms, self.seq).cmp(&(other.fire_at_ms, other.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Virtual clock with its pending event queue.
#[derive(Debug, Clone, Default)]
pub struct GameClock {
    now_ms: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Fire time of the earliest pending event.
    pub fn next_fire_at(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(s)| s.fire_at_ms)
    }

    pub fn schedule(&mut self, fire_at_ms: u64, event: ClockEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled {
            fire_at_ms,
            seq,
            event,
        }));
    }

    pub fn schedule_spawn(&mut self, fire_at_ms: u64) {
        self.schedule(fire_at_ms, ClockEvent::SpawnTick);
    }

    pub fn schedule_resolve(&mut self, fire_at_ms: u64, id: ElementId) {
        self.schedule(fire_at_ms, ClockEvent::ResolveFall(id));
    }

    /// Pop the earliest event firing at or before `until_ms`, moving the clock
    /// to its fire time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Scheduled> {
        match self.queue.peek() {
            Some(Reverse(next)) if next.fire_at_ms <= until_ms => {}
            _ => return None,
        }
        let Reverse(scheduled) = self.queue.pop()?;
        self.now_ms = self.now_ms.max(scheduled.fire_at_ms);
        Some(scheduled)
    }

    /// Move the clock forward. Time never runs backwards.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Drop every pending event.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Pick a spawn column so the element fits on screen. Zero when the viewport
/// is narrower than an element or its width is not finite.
pub fn random_spawn_x<R: Rng>(rng: &mut R, view_width: f64, element_size: f64) -> f64 {
    let max_x = view_width - element_size;
    if !max_x.is_finite() || max_x <= 0.0 {
        return 0.0;
    }
    rng.gen_range(0.0..=max_x)
}

/// Handle one spawn tick: create an element above the play area, schedule
/// its resolution one fall period from now, and schedule the next tick.
///
/// Once the session is over the tick neither spawns nor reschedules, which
/// stops the spawner for good until a restart.
pub fn spawn_tick<R: Rng>(game: &mut FallingGame, rng: &mut R) -> Option<ElementId> {
    if game.is_game_over() {
        return None;
    }

    let now = game.clock.now_ms();
    let x = random_spawn_x(rng, game.viewport.width, game.config.element_size);
    let element = Element::new(Position::new(x, game.spawn_y()), now);
    let id = element.id;

    game.elements.insert(id, element);
    game.order.push_back(id);

    game.clock.schedule_resolve(now.saturating_add(game.config.fall_period_ms), id);
    game.clock.schedule_spawn(now.saturating_add(game.config.spawn_period_ms));

    game.notify(SessionEvent::Spawned { id, x });
    Some(id)
}
