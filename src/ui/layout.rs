use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥80 cols: big challenge text, button panel beside the timer
    Narrow, // <80 cols: single column, compact buttons
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 80 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn show_button_panel(&self, height: u16) -> bool {
        height >= 16
    }
}

/// Game screen regions: header, challenge, timer bar, buttons, footer.
pub struct GameLayout {
    pub header: Rect,
    pub challenge: Rect,
    pub timer: Rect,
    pub buttons: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl GameLayout {
    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);
        let show_buttons = tier.show_button_panel(area.height);

        let mut constraints = vec![
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ];
        if show_buttons {
            constraints.push(Constraint::Length(5));
        }
        constraints.push(Constraint::Length(1));

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let (buttons, footer) = if show_buttons {
            (Some(vertical[3]), vertical[4])
        } else {
            (None, vertical[3])
        };

        Self {
            header: vertical[0],
            challenge: vertical[1],
            timer: vertical[2],
            buttons,
            footer,
            tier,
        }
    }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
        }
        has_hint = true;
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 48;
    const MIN_POPUP_HEIGHT: u16 = 16;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area.x.saturating_add(area.width.saturating_sub(target_w) / 2);
    let top = area.y.saturating_add(area.height.saturating_sub(target_h) / 2);

    Rect::new(left, top, target_w, target_h)
}
