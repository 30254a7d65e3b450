use chrono::Local;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::stats::PlayerStats;
use crate::session::summary::{GameSessionSummary, SessionOutcome};
use crate::ui::theme::Theme;

const TOP_SCORES: usize = 10;

pub struct StatsDashboard<'a> {
    pub stats: &'a PlayerStats,
    pub scroll: usize,
    pub theme: &'a Theme,
}

impl<'a> StatsDashboard<'a> {
    pub fn new(stats: &'a PlayerStats, scroll: usize, theme: &'a Theme) -> Self {
        Self { stats, scroll, theme }
    }
}

fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else {
        format!("{m}m {s:02}s")
    }
}

impl StatsDashboard<'_> {
    fn totals(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let s = self.stats;
        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!(" {label:<16}"), Style::default().fg(colors.text_dim())),
                Span::styled(value, Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD)),
            ])
        };
        let last_played = s.last_played.map_or_else(
            || "never".to_string(),
            |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        );
        vec![
            row("Games played", s.total_games.to_string()),
            row("High score", s.high_score.to_string()),
            row("Total score", s.total_score.to_string()),
            row("Rounds played", s.total_rounds.to_string()),
            row("Accuracy", format!("{:.1}%", s.average_accuracy)),
            row("Avg reaction", format!("{:.0} ms", s.average_reaction_time_ms)),
            row("Best streak", s.longest_streak.to_string()),
            row("Time played", format_duration(s.total_play_time_secs)),
            row("Last played", last_played),
        ]
    }

    fn game_line(&self, rank: Option<usize>, game: &GameSessionSummary) -> Line<'static> {
        let colors = &self.theme.colors;
        let marker = match game.outcome {
            SessionOutcome::Victory => Span::styled(" \u{2605}", Style::default().fg(colors.warning())),
            SessionOutcome::GameOver => Span::raw("  "),
        };
        let prefix = rank.map_or_else(|| " ".to_string(), |r| format!("{r:>3}."));
        Line::from(vec![
            Span::styled(prefix, Style::default().fg(colors.text_dim())),
            Span::styled(format!(" {:>6}", game.score), Style::default().fg(colors.accent())),
            Span::styled(
                format!(
                    "  r{:<3} {:>5.1}%  {:>4.0}ms  {}",
                    game.rounds_completed,
                    game.accuracy_percent,
                    game.average_reaction_time_ms,
                    game.timestamp.with_timezone(&Local).format("%m-%d %H:%M"),
                ),
                Style::default().fg(colors.fg()),
            ),
            marker,
        ])
    }
}

impl Widget for StatsDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Statistics ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.stats.total_games == 0 {
            Paragraph::new(Line::from(Span::styled(
                " No games played yet. Press Enter on the menu to start!",
                Style::default().fg(colors.text_dim()),
            )))
            .render(inner, buf);
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(11), Constraint::Min(3), Constraint::Length(1)])
            .split(inner);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[0]);

        let totals_block = Block::bordered()
            .title(" Totals ")
            .border_style(Style::default().fg(colors.border()));
        Paragraph::new(self.totals())
            .block(totals_block)
            .render(top[0], buf);

        let best: Vec<Line> = self
            .stats
            .top_scores(TOP_SCORES)
            .into_iter()
            .enumerate()
            .map(|(i, game)| self.game_line(Some(i + 1), game))
            .collect();
        Paragraph::new(best)
            .block(
                Block::bordered()
                    .title(" Best games ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .render(top[1], buf);

        let recent: Vec<Line> = self
            .stats
            .history
            .iter()
            .skip(self.scroll)
            .map(|game| self.game_line(None, game))
            .collect();
        Paragraph::new(recent)
            .block(
                Block::bordered()
                    .title(format!(" Recent games ({}) ", self.stats.history.len()))
                    .border_style(Style::default().fg(colors.border())),
            )
            .render(rows[1], buf);

        Paragraph::new(Line::from(Span::styled(
            " [j/k] Scroll  [a] Achievements  [q] Menu",
            Style::default().fg(colors.accent()),
        )))
        .render(rows[2], buf);
    }
}
