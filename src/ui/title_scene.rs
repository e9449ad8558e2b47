//! Title screen with the main menu.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Main menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOption {
    StartGame,
    GameRules,
    Quit,
}

impl TitleOption {
    pub const ALL: [TitleOption; 3] = [
        TitleOption::StartGame,
        TitleOption::GameRules,
        TitleOption::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::StartGame => "Start Game",
            Self::GameRules => "Game Rules",
            Self::Quit => "Quit",
        }
    }
}

pub struct TitleScreen {
    pub selected_index: usize,
}

impl TitleScreen {
    pub fn new() -> Self {
        Self { selected_index: 0 }
    }

    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < TitleOption::ALL.len() {
            self.selected_index += 1;
        }
    }

    pub fn selected(&self) -> TitleOption {
        TitleOption::ALL[self.selected_index.min(TitleOption::ALL.len() - 1)]
    }

    pub fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(0),    // Menu
                Constraint::Length(2), // Controls
            ])
            .split(area);

        let title = Paragraph::new("GATES OF OLYMPUS")
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        let mut lines = vec![Line::from("")];
        for (i, option) in TitleOption::ALL.iter().enumerate() {
            let line = if i == self.selected_index {
                Line::from(Span::styled(
                    format!("◆ {} ◆", option.label()),
                    Style::default()
                        .fg(Color::Yellow)
                        .bg(Color::Blue)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(
                    format!("  {}  ", option.label()),
                    Style::default().fg(Color::White),
                ))
            };
            lines.push(line);
            lines.push(Line::from(""));
        }

        let menu = Paragraph::new(lines).alignment(Alignment::Center);
        f.render_widget(menu, chunks[1]);

        let controls = Paragraph::new("[↑/↓] Navigate  [Enter] Select  [Q] Quit")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(controls, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_clamps() {
        let mut screen = TitleScreen::new();
        assert_eq!(screen.selected(), TitleOption::StartGame);
        screen.move_up();
        assert_eq!(screen.selected(), TitleOption::StartGame);
        screen.move_down();
        screen.move_down();
        screen.move_down();
        assert_eq!(screen.selected(), TitleOption::Quit);
        screen.move_up();
        assert_eq!(screen.selected(), TitleOption::GameRules);
    }
}
