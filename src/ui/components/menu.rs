use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::config::DifficultyLevel;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Play,
    Difficulty,
    Stats,
    Achievements,
    Quit,
}

pub struct MenuItem {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub action: MenuAction,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub difficulty: DifficultyLevel,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme, difficulty: DifficultyLevel) -> Self {
        Self {
            items: vec![
                MenuItem {
                    key: "Enter",
                    label: "Play",
                    description: "Follow the instruction before time runs out",
                    action: MenuAction::Play,
                },
                MenuItem {
                    key: "d",
                    label: "Difficulty",
                    description: "Scales the time allowed for every round",
                    action: MenuAction::Difficulty,
                },
                MenuItem {
                    key: "s",
                    label: "Statistics",
                    description: "Totals and best games",
                    action: MenuAction::Stats,
                },
                MenuItem {
                    key: "a",
                    label: "Achievements",
                    description: "What you have unlocked so far",
                    action: MenuAction::Achievements,
                },
                MenuItem {
                    key: "q",
                    label: "Quit",
                    description: "",
                    action: MenuAction::Quit,
                },
            ],
            selected: 0,
            difficulty,
            theme,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> MenuAction {
        self.items
            .get(self.selected)
            .map_or(MenuAction::Play, |item| item.action)
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    "PRESSING ",
                    Style::default()
                        .fg(colors.red_button())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "UNDER PRESSURE",
                    Style::default()
                        .fg(colors.blue_button())
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                "Read fast. Press right.",
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = if item.action == MenuAction::Difficulty {
                format!(
                    " {indicator} [{}] {}: < {} >",
                    item.key,
                    item.label,
                    self.difficulty.as_str()
                )
            } else {
                format!(" {indicator} [{}] {}", item.key, item.label)
            };
            let label_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };

            let lines = vec![
                Line::from(Span::styled(label_text, label_style)),
                Line::from(Span::styled(
                    format!("     {}", item.description),
                    Style::default().fg(colors.text_dim()),
                )),
            ];
            if i < menu_layout.len() {
                Paragraph::new(lines).render(menu_layout[i], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_wraps() {
        let theme = Theme::default();
        let mut menu = Menu::new(&theme, DifficultyLevel::Normal);
        assert_eq!(menu.selected_action(), MenuAction::Play);
        menu.prev();
        assert_eq!(menu.selected_action(), MenuAction::Quit);
        menu.next();
        menu.next();
        assert_eq!(menu.selected_action(), MenuAction::Difficulty);
    }
}
