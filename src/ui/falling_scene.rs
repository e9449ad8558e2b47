//! UI rendering for the falling-target game.

use crate::ui::game_common::{
    compute_game_layout, create_game_layout, render_game_over_overlay, render_info_panel_frame,
    render_status_bar, GameLayout,
};
use olympus::core::constants::{CELL_HEIGHT_UNITS, CELL_WIDTH_UNITS};
use olympus::game::{FallingGame, GamePhase, Position, TapPolicy, Viewport};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const TITLE: &str = " Gates of Olympus ";
const CONTENT_MIN_HEIGHT: u16 = 10;
const INFO_PANEL_WIDTH: u16 = 22;

/// Layout of the game screen for a terminal area.
pub fn layout(area: Rect) -> GameLayout {
    compute_game_layout(area, CONTENT_MIN_HEIGHT, INFO_PANEL_WIDTH)
}

/// World-unit size of a play area.
pub fn viewport_for(play_area: Rect) -> Viewport {
    Viewport::new(
        play_area.width as f64 * CELL_WIDTH_UNITS,
        play_area.height as f64 * CELL_HEIGHT_UNITS,
    )
}

/// World point at the center of a terminal cell, or None outside the play area.
pub fn cell_to_world(play_area: Rect, column: u16, row: u16) -> Option<Position> {
    let inside = column >= play_area.x
        && column < play_area.x + play_area.width
        && row >= play_area.y
        && row < play_area.y + play_area.height;
    if !inside {
        return None;
    }
    Some(Position::new(
        ((column - play_area.x) as f64 + 0.5) * CELL_WIDTH_UNITS,
        ((row - play_area.y) as f64 + 0.5) * CELL_HEIGHT_UNITS,
    ))
}

/// Render the game scene.
pub fn render_falling(frame: &mut Frame, area: Rect, game: &FallingGame) {
    let layout = create_game_layout(
        frame,
        area,
        TITLE,
        Color::Yellow,
        CONTENT_MIN_HEIGHT,
        INFO_PANEL_WIDTH,
    );

    render_play_area(frame, layout.content, game);
    render_status_bar_content(frame, layout.status_bar, game);
    render_info_panel(frame, layout.info_panel, game);

    if let GamePhase::GameOver { final_score } = game.phase() {
        let detail = if final_score > 0 && final_score >= game.best_score() {
            "New best!".to_string()
        } else {
            format!("Best: {}", game.best_score())
        };
        render_game_over_overlay(
            frame,
            layout.content,
            "GAME OVER",
            &format!("Score: {}", final_score),
            &detail,
            "[R] Restart  [Esc] Menu",
        );
    }
}

/// Render the play area cell by cell. A cell is filled when its center lies
/// inside an untapped element.
fn render_play_area(frame: &mut Frame, area: Rect, game: &FallingGame) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let size = game.config().element_size;
    let visible: Vec<_> = game
        .snapshot()
        .into_iter()
        .filter(|e| !e.tapped)
        .collect();

    let mut lines = Vec::with_capacity(area.height as usize);
    for row in 0..area.height {
        let mut spans = Vec::with_capacity(area.width as usize);
        for col in 0..area.width {
            let point = Position::new(
                (col as f64 + 0.5) * CELL_WIDTH_UNITS,
                (row as f64 + 0.5) * CELL_HEIGHT_UNITS,
            );
            let hit = visible.iter().any(|e| e.contains(point, size));

            if hit {
                spans.push(Span::styled("█", Style::default().fg(Color::Red)));
            } else {
                spans.push(Span::raw(" "));
            }
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_status_bar_content(frame: &mut Frame, area: Rect, game: &FallingGame) {
    if game.is_game_over() {
        render_status_bar(
            frame,
            area,
            &format!("Final score: {}", game.score()),
            Color::Red,
            &[("[R]", "Restart"), ("[Esc]", "Menu")],
        );
        return;
    }

    let hearts = "♥".repeat(game.lives_left() as usize);
    render_status_bar(
        frame,
        area,
        &format!("Score: {}   {}", game.score(), hearts),
        Color::Green,
        &[("[Click]", "Tap"), ("[Space]", "Tap lowest"), ("[Esc]", "Menu")],
    );
}

fn render_info_panel(frame: &mut Frame, area: Rect, game: &FallingGame) {
    let inner = render_info_panel_frame(frame, area);

    if inner.height < 2 || inner.width < 4 {
        return;
    }

    let config = game.config();
    let stat = |label: &str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!(" {}: ", label), Style::default().fg(Color::DarkGray)),
            Span::styled(value, Style::default().fg(color)),
        ])
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Score: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", game.score()),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        stat("Best", game.best_score().to_string(), Color::Yellow),
        Line::from(""),
        stat(
            "Missed",
            format!("{} / {}", game.missed_count(), config.max_missed),
            Color::Red,
        ),
    ];

    if config.tap_policy == TapPolicy::CountAtBoundary {
        lines.push(stat(
            "Bottom",
            format!(
                "{} / {}",
                game.touched_bottom_count(),
                config.max_touched_bottom
            ),
            Color::Magenta,
        ));
    }

    lines.push(Line::from(""));
    lines.push(stat("Falling", game.active_count().to_string(), Color::Cyan));

    frame.render_widget(Paragraph::new(lines), inner);
}
