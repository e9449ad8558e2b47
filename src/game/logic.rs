//! Game loop controller for the falling-target game.
//!
//! Taps and fall resolutions both consult the element's `tapped` flag, and
//! each element is removed from the active set exactly once, so the two can
//! arrive in either order without double counting.

use super::clock::{spawn_tick, ClockEvent};
use super::observer::SessionEvent;
use super::types::{ElementId, FallOutcome, FallingGame, GamePhase, Position, TapPolicy};
use rand::Rng;

/// Input actions for the falling-target game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FallingInput {
    /// Tap whatever is under a point in world units (mouse click).
    TapAt(Position),
    /// Tap the untapped element closest to the bottom (keyboard).
    TapLowest,
    /// Start over from scratch.
    Restart,
    /// Any other key.
    Other,
}

/// Process player input. Returns true if the input changed the session.
pub fn process_input(game: &mut FallingGame, input: FallingInput) -> bool {
    match input {
        FallingInput::TapAt(point) => tap_at(game, point).is_some(),
        FallingInput::TapLowest => tap_lowest(game).is_some(),
        FallingInput::Restart => {
            restart(game);
            true
        }
        FallingInput::Other => false,
    }
}

/// Tap an element. Scores one point and marks it tapped.
///
/// Unknown ids, already tapped elements and taps after game over are
/// ignored and return false.
pub fn tap(game: &mut FallingGame, id: ElementId) -> bool {
    if game.is_game_over() {
        return false;
    }
    let Some(element) = game.elements.get_mut(&id) else {
        return false;
    };
    if element.tapped {
        return false;
    }

    element.tapped = true;
    game.score += 1;

    if game.config.tap_policy == TapPolicy::Pop {
        remove_element(game, id);
    }

    let score = game.score;
    game.notify(SessionEvent::Tapped { id, score });
    true
}

/// Tap the lowest untapped element whose circle contains `point`.
pub fn tap_at(game: &mut FallingGame, point: Position) -> Option<ElementId> {
    let size = game.config.element_size;
    let target = game
        .order
        .iter()
        .filter_map(|id| game.elements.get(id))
        .filter(|e| !e.tapped && e.contains(point, size))
        .max_by(|a, b| a.position.y.total_cmp(&b.position.y))
        .map(|e| e.id)?;

    tap(game, target).then_some(target)
}

/// Tap the untapped element closest to the bottom boundary.
pub fn tap_lowest(game: &mut FallingGame) -> Option<ElementId> {
    // Oldest untapped element is always the lowest one
    let target = game
        .order
        .iter()
        .filter_map(|id| game.elements.get(id))
        .find(|e| !e.tapped)
        .map(|e| e.id)?;

    tap(game, target).then_some(target)
}

/// Resolve an element whose fall period has elapsed.
///
/// Counts a miss if it was never tapped, a touched-bottom otherwise, then
/// checks the termination thresholds. No-op once the session is over or if
/// the element already left the active set.
pub fn resolve_fall(game: &mut FallingGame, id: ElementId) -> Option<FallOutcome> {
    if game.is_game_over() {
        return None;
    }

    let bottom_y = game.bottom_y();
    let element = game.elements.get_mut(&id)?;
    element.position.y = bottom_y;

    let outcome = if element.tapped {
        game.touched_bottom_count += 1;
        FallOutcome::TouchedBottom
    } else {
        game.missed_count += 1;
        FallOutcome::Missed
    };

    remove_element(game, id);
    game.notify(SessionEvent::Resolved { id, outcome });

    if should_end(game) {
        end_game(game);
    }
    Some(outcome)
}

fn should_end(game: &FallingGame) -> bool {
    game.missed_count >= game.config.max_missed
        || game.touched_bottom_count >= game.config.max_touched_bottom
}

/// Enter the game-over state: clear the board and record the final score.
/// Pending clock events stay queued and no-op when they fire.
fn end_game(game: &mut FallingGame) {
    let final_score = game.score;
    game.phase = GamePhase::GameOver { final_score };
    game.best_score = game.best_score.max(final_score);
    game.elements.clear();
    game.order.clear();
    game.notify(SessionEvent::GameOver { final_score });
}

/// Full reset: scores, counters and the board are cleared, stale clock events
/// are dropped, and the spawner fires again immediately.
pub fn restart(game: &mut FallingGame) {
    game.score = 0;
    game.missed_count = 0;
    game.touched_bottom_count = 0;
    game.elements.clear();
    game.order.clear();
    game.phase = GamePhase::Playing;

    game.clock.clear();
    let now = game.clock.now_ms();
    game.clock.schedule_spawn(now);

    game.notify(SessionEvent::Restarted);
}

/// Advance the session by `dt_ms`, firing every due clock event in order.
pub fn advance<R: Rng>(game: &mut FallingGame, dt_ms: u64, rng: &mut R) {
    let target = game.clock.now_ms().saturating_add(dt_ms);

    while let Some(scheduled) = game.clock.pop_due(target) {
        update_positions(game);
        match scheduled.event {
            ClockEvent::SpawnTick => {
                spawn_tick(game, rng);
            }
            ClockEvent::ResolveFall(id) => {
                resolve_fall(game, id);
            }
        }
    }

    game.clock.set_now(target);
    update_positions(game);
}

/// Fraction of the fall completed by an element spawned at `spawned_at_ms`.
fn progress_at(now_ms: u64, spawned_at_ms: u64, period_ms: u64) -> f64 {
    if period_ms == 0 {
        return 1.0;
    }
    let elapsed = now_ms.saturating_sub(spawned_at_ms);
    (elapsed as f64 / period_ms as f64).min(1.0)
}

/// Move every active element along its linear fall path.
fn update_positions(game: &mut FallingGame) {
    let start = game.spawn_y();
    let end = game.bottom_y();
    let now = game.clock.now_ms();
    let period = game.config.fall_period_ms;

    for element in game.elements.values_mut() {
        let progress = progress_at(now, element.spawned_at_ms, period);
        element.position.y = start + (end - start) * progress;
    }
}

fn remove_element(game: &mut FallingGame, id: ElementId) {
    if game.elements.remove(&id).is_none() {
        return;
    }
    if game.order.front() == Some(&id) {
        game.order.pop_front();
    } else {
        game.order.retain(|e| *e != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::game::observer::EventLog;
    use crate::game::types::Viewport;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn new_game(policy: TapPolicy) -> FallingGame {
        let config = GameConfig {
            tap_policy: policy,
            ..GameConfig::default()
        };
        FallingGame::new(config, Viewport::new(400.0, 800.0))
    }

    /// Fire the initial spawn tick and return the new element.
    fn spawn_first(game: &mut FallingGame, rng: &mut ChaCha8Rng) -> ElementId {
        advance(game, 0, rng);
        game.snapshot().last().map(|e| e.id).unwrap()
    }

    #[test]
    fn test_first_spawn_happens_immediately() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        advance(&mut game, 0, &mut rng);
        assert_eq!(game.active_count(), 1);
    }

    #[test]
    fn test_spawn_cadence() {
        let mut game = new_game(TapPolicy::CountAtBoundary);
        let mut rng = create_test_rng();
        advance(&mut game, 1999, &mut rng);
        assert_eq!(game.active_count(), 1);
        // t=2000: first resolves, second spawns
        advance(&mut game, 1, &mut rng);
        assert_eq!(game.active_count(), 1);
        assert_eq!(game.missed_count(), 1);
    }

    #[test]
    fn test_tap_scores_once() {
        let mut game = new_game(TapPolicy::CountAtBoundary);
        let mut rng = create_test_rng();
        let id = spawn_first(&mut game, &mut rng);

        assert!(tap(&mut game, id));
        assert_eq!(game.score(), 1);
        assert!(game.element(id).unwrap().tapped);

        assert!(!tap(&mut game, id));
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn test_tap_unknown_is_noop() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        spawn_first(&mut game, &mut rng);
        assert!(!tap(&mut game, ElementId::new()));
        assert_eq!(game.score(), 0);
        assert_eq!(game.active_count(), 1);
    }

    #[test]
    fn test_pop_policy_removes_on_tap() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        let id = spawn_first(&mut game, &mut rng);

        assert!(tap(&mut game, id));
        assert_eq!(game.active_count(), 0);

        // Pending resolution is a no-op
        assert!(resolve_fall(&mut game, id).is_none());
        assert_eq!(game.missed_count(), 0);
        assert_eq!(game.touched_bottom_count(), 0);
    }

    #[test]
    fn test_count_at_boundary_policy_counts_touched() {
        let mut game = new_game(TapPolicy::CountAtBoundary);
        let mut rng = create_test_rng();
        let id = spawn_first(&mut game, &mut rng);
        tap(&mut game, id);

        assert_eq!(resolve_fall(&mut game, id), Some(FallOutcome::TouchedBottom));
        assert_eq!(game.score(), 1);
        assert_eq!(game.missed_count(), 0);
        assert_eq!(game.touched_bottom_count(), 1);
        assert!(game.element(id).is_none());
    }

    #[test]
    fn test_resolve_untapped_counts_miss() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        let id = spawn_first(&mut game, &mut rng);

        assert_eq!(resolve_fall(&mut game, id), Some(FallOutcome::Missed));
        assert_eq!(game.missed_count(), 1);
        assert_eq!(game.active_count(), 0);
        // Second resolution of the same element counts nothing
        assert!(resolve_fall(&mut game, id).is_none());
        assert_eq!(game.missed_count(), 1);
    }

    #[test]
    fn test_three_misses_end_game() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();

        advance(&mut game, 4000, &mut rng);
        assert_eq!(game.missed_count(), 2);
        assert!(!game.is_game_over());

        advance(&mut game, 2000, &mut rng);
        assert_eq!(game.missed_count(), 3);
        assert!(game.is_game_over());
        assert_eq!(game.phase(), GamePhase::GameOver { final_score: 0 });
        assert_eq!(game.active_count(), 0);
    }

    #[test]
    fn test_three_touched_bottom_end_game() {
        let mut game = new_game(TapPolicy::CountAtBoundary);
        let mut rng = create_test_rng();

        for _ in 0..3 {
            advance(&mut game, 0, &mut rng);
            assert!(tap_lowest(&mut game).is_some());
            advance(&mut game, 2000, &mut rng);
        }
        // The third tapped element resolved at t=6000
        assert_eq!(game.touched_bottom_count(), 3);
        assert_eq!(game.missed_count(), 0);
        assert_eq!(game.phase(), GamePhase::GameOver { final_score: 3 });
    }

    #[test]
    fn test_no_spawns_after_game_over() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        advance(&mut game, 6000, &mut rng);
        assert!(game.is_game_over());

        advance(&mut game, 20_000, &mut rng);
        assert_eq!(game.active_count(), 0);
        assert_eq!(game.missed_count(), 3);
        assert_eq!(game.clock.pending(), 0);
    }

    #[test]
    fn test_tap_after_game_over_is_noop() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        advance(&mut game, 6000, &mut rng);
        assert!(tap_lowest(&mut game).is_none());
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        advance(&mut game, 0, &mut rng);
        tap_lowest(&mut game);
        advance(&mut game, 8000, &mut rng);
        assert!(game.is_game_over());
        assert_eq!(game.best_score(), 1);

        restart(&mut game);
        assert!(!game.is_game_over());
        assert_eq!(game.score(), 0);
        assert_eq!(game.missed_count(), 0);
        assert_eq!(game.touched_bottom_count(), 0);
        assert_eq!(game.active_count(), 0);
        assert_eq!(game.best_score(), 1);

        // Spawner is running again
        advance(&mut game, 0, &mut rng);
        assert_eq!(game.active_count(), 1);
    }

    #[test]
    fn test_restart_drops_stale_resolutions() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        advance(&mut game, 1000, &mut rng);
        restart(&mut game);

        // Old element would have resolved at t=2000
        advance(&mut game, 1500, &mut rng);
        assert_eq!(game.missed_count(), 0);
        assert_eq!(game.active_count(), 1);
    }

    #[test]
    fn test_positions_fall_linearly() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        let id = spawn_first(&mut game, &mut rng);
        let start = game.spawn_y();
        let end = game.bottom_y();

        advance(&mut game, 1000, &mut rng);
        let y = game.element(id).unwrap().position.y;
        assert!((y - (start + end) / 2.0).abs() < 1e-9);
        assert!((progress_at(1000, 0, 2000) - 0.5).abs() < 1e-9);
        assert!((progress_at(5000, 0, 2000) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tap_at_hits_circle() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        let id = spawn_first(&mut game, &mut rng);
        advance(&mut game, 1000, &mut rng);
        let element = game.element(id).unwrap().clone();

        assert!(tap_at(&mut game, Position::new(element.position.x - 40.0, element.position.y)).is_none());
        assert_eq!(game.score(), 0);

        let center = Position::new(element.position.x + 25.0, element.position.y);
        assert_eq!(tap_at(&mut game, center), Some(id));
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn test_process_input_dispatch() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        advance(&mut game, 0, &mut rng);

        assert!(!process_input(&mut game, FallingInput::Other));
        assert!(process_input(&mut game, FallingInput::TapLowest));
        assert_eq!(game.score(), 1);
        assert!(process_input(&mut game, FallingInput::Restart));
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_events_reported_to_observers() {
        let mut game = new_game(TapPolicy::Pop);
        let mut rng = create_test_rng();
        let log = EventLog::new();
        game.subscribe(Box::new(log.clone()));

        let id = spawn_first(&mut game, &mut rng);
        tap(&mut game, id);

        let events = log.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SessionEvent::Spawned { id: spawned, .. } if spawned == id));
        assert_eq!(events[1], SessionEvent::Tapped { id, score: 1 });
    }
}
