use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::GameOutcome;
use crate::session::achievements::AchievementKind;
use crate::session::summary::SessionOutcome;
use crate::ui::theme::Theme;

/// Result screen for a finished game.
pub struct Dashboard<'a> {
    pub outcome: &'a GameOutcome,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(outcome: &'a GameOutcome, theme: &'a Theme) -> Self {
        Self { outcome, theme }
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let summary = &self.outcome.summary;
        let victory = self.outcome.outcome == SessionOutcome::Victory;

        let (title, title_color) = if victory {
            (" Victory! ", colors.success())
        } else {
            (" Game Over ", colors.error())
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(title_color))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(6),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let mut headline = vec![Span::styled(
            if victory {
                format!("You beat all {} rounds", self.outcome.final_round)
            } else {
                let reason = self.outcome.reason.map_or("Time's up", |r| r.message());
                format!("{reason} in round {}", self.outcome.final_round)
            },
            Style::default().fg(title_color).add_modifier(Modifier::BOLD),
        )];
        if self.outcome.new_high_score {
            headline.push(Span::styled(
                "  New high score!",
                Style::default().fg(colors.warning()).add_modifier(Modifier::BOLD),
            ));
        }
        Paragraph::new(Line::from(headline))
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let acc_color = if summary.accuracy_percent >= 95.0 {
            colors.success()
        } else if summary.accuracy_percent >= 75.0 {
            colors.warning()
        } else {
            colors.error()
        };
        let row = |label: &str, value: String, color| {
            Line::from(vec![
                Span::styled(format!("  {label:<10}"), Style::default().fg(colors.fg())),
                Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            ])
        };
        let lines = vec![
            row("Score:", summary.score.to_string(), colors.accent()),
            row("Rounds:", summary.rounds_completed.to_string(), colors.fg()),
            row("Accuracy:", format!("{:.1}%", summary.accuracy_percent), acc_color),
            row(
                "Reaction:",
                format!("{:.0} ms avg", summary.average_reaction_time_ms),
                colors.fg(),
            ),
            row("Streak:", summary.longest_streak.to_string(), colors.fg()),
            row("Time:", format!("{}s", summary.duration_secs), colors.fg()),
        ];
        Paragraph::new(lines).render(layout[1], buf);

        if !self.outcome.unlocked.is_empty() {
            let mut lines = vec![Line::from(Span::styled(
                "  Achievements unlocked:",
                Style::default().fg(colors.warning()).add_modifier(Modifier::BOLD),
            ))];
            for achievement in &self.outcome.unlocked {
                let (name, description) = achievement
                    .kind()
                    .map_or((achievement.id.as_str(), ""), |k: AchievementKind| {
                        (k.name(), k.description())
                    });
                lines.push(Line::from(vec![
                    Span::styled(format!("   \u{2605} {name}"), Style::default().fg(colors.accent())),
                    Span::styled(format!("  {description}"), Style::default().fg(colors.text_dim())),
                ]));
            }
            Paragraph::new(lines).render(layout[2], buf);
        }

        Paragraph::new(Line::from(vec![
            Span::styled("  [Enter/r] Play again  ", Style::default().fg(colors.accent())),
            Span::styled("[s] Stats  ", Style::default().fg(colors.accent())),
            Span::styled("[a] Achievements  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Menu", Style::default().fg(colors.accent())),
        ]))
        .render(layout[3], buf);
    }
}
