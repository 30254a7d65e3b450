use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::engine::timer::{TimerPhase, TimerProgress};
use crate::ui::theme::Theme;

/// Segments the countdown bar is drawn with.
pub const TIMER_SEGMENTS: u16 = 20;

/// Segmented countdown bar, coloured by urgency.
pub struct TimerBar<'a> {
    pub progress: Option<TimerProgress>,
    pub theme: &'a Theme,
}

impl<'a> TimerBar<'a> {
    pub fn new(progress: Option<TimerProgress>, theme: &'a Theme) -> Self {
        Self { progress, theme }
    }
}

/// How many of `segments` are lit for `fraction` remaining. Rounds up so the
/// last segment stays lit until the time is actually gone.
pub fn lit_segments(fraction: f64, segments: u16) -> u16 {
    let lit = (fraction.clamp(0.0, 1.0) * segments as f64).ceil() as u16;
    lit.min(segments)
}

impl Widget for TimerBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let (fraction, phase, label) = match self.progress {
            Some(p) => (
                p.fraction_remaining,
                p.phase(),
                format!(" {}s ", p.remaining_secs()),
            ),
            None => (0.0, TimerPhase::Normal, " -- ".to_string()),
        };
        let bar_color = colors.timer(phase);

        let block = Block::bordered()
            .title(" Time ")
            .border_style(Style::default().fg(if phase == TimerPhase::Critical {
                bar_color
            } else {
                colors.border()
            }));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let segments = TIMER_SEGMENTS.min(inner.width);
        let lit = lit_segments(fraction, segments);
        let segment_width = inner.width / segments;
        for segment in 0..segments {
            let start = inner.x + segment * segment_width;
            let end = if segment + 1 == segments {
                inner.x + inner.width
            } else {
                start + segment_width
            };
            let fill = if segment < lit {
                Style::default().bg(bar_color)
            } else {
                Style::default().bg(colors.bar_empty())
            };
            for x in start..end {
                // One-column gap between segments when there is room for it.
                let gap = segment_width > 1 && x + 1 == end && segment + 1 != segments;
                let style = if gap { Style::default().bg(colors.bg()) } else { fill };
                buf[(x, inner.y)].set_symbol(" ").set_style(style);
            }
        }

        let label_x = inner.x + inner.width.saturating_sub(label.len() as u16) / 2;
        buf.set_string(
            label_x,
            inner.y,
            &label,
            Style::default()
                .fg(colors.bg())
                .bg(if lit > 0 { bar_color } else { colors.bar_empty() })
                .add_modifier(Modifier::BOLD),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lit_segments() {
        assert_eq!(lit_segments(1.0, 20), 20);
        assert_eq!(lit_segments(0.5, 20), 10);
        assert_eq!(lit_segments(0.01, 20), 1);
        assert_eq!(lit_segments(0.0, 20), 0);
        assert_eq!(lit_segments(1.7, 20), 20);
    }
}
