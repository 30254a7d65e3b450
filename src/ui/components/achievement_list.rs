use chrono::Local;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::achievements::AchievementBook;
use crate::ui::theme::Theme;

const BAR_WIDTH: usize = 16;

pub struct AchievementList<'a> {
    pub book: &'a AchievementBook,
    pub theme: &'a Theme,
}

impl<'a> AchievementList<'a> {
    pub fn new(book: &'a AchievementBook, theme: &'a Theme) -> Self {
        Self { book, theme }
    }
}

impl Widget for AchievementList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let unlocked = self.book.unlocked().count();
        let total = self.book.achievements.len();

        let block = Block::bordered()
            .title(format!(" Achievements {unlocked}/{total} "))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        for achievement in &self.book.achievements {
            let Some(kind) = achievement.kind() else {
                continue;
            };
            let (icon, name_style) = if achievement.unlocked {
                (
                    Span::styled(" \u{2605} ", Style::default().fg(colors.warning())),
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                )
            } else {
                (
                    Span::styled(" \u{00b7} ", Style::default().fg(colors.text_dim())),
                    Style::default().fg(colors.text_dim()),
                )
            };
            let (filled, empty) = bar_parts(achievement.progress, BAR_WIDTH);
            let status = match achievement.unlocked_date {
                Some(date) if achievement.unlocked => {
                    date.with_timezone(&Local).format(" %Y-%m-%d").to_string()
                }
                _ => format!(" {:>3.0}%", achievement.progress),
            };
            lines.push(Line::from(vec![
                icon,
                Span::styled(format!("{:<15}", kind.name()), name_style),
                Span::styled(filled, Style::default().fg(colors.success())),
                Span::styled(empty, Style::default().fg(colors.bar_empty())),
                Span::styled(status, Style::default().fg(colors.text_dim())),
                Span::styled(
                    format!("  {}", kind.description()),
                    Style::default().fg(colors.text_dim()),
                ),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " [s] Stats  [q] Menu",
            Style::default().fg(colors.accent()),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

fn bar_parts(progress: f64, width: usize) -> (String, String) {
    let filled = ((progress.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    (
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(width - filled),
    )
}
