pub mod falling_scene;
pub mod game_common;
pub mod rules_scene;
pub mod title_scene;

use olympus::game::FallingGame;
use ratatui::Frame;
use title_scene::TitleScreen;

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Title,
    Rules,
    Game,
}

/// Draw the current screen.
pub fn draw_ui(frame: &mut Frame, screen: Screen, title: &TitleScreen, game: Option<&FallingGame>) {
    let area = frame.area();
    match (screen, game) {
        (Screen::Game, Some(game)) => falling_scene::render_falling(frame, area, game),
        (Screen::Rules, _) => rules_scene::render_rules(frame, area),
        _ => title.draw(frame, area),
    }
}
