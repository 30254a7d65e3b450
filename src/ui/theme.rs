use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::engine::timer::TimerPhase;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

pub const DEFAULT_THEME: &str = "terminal-default";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub text_dim: String,
    pub accent: String,
    pub border: String,
    pub header_bg: String,
    pub header_fg: String,
    pub red_button: String,
    pub blue_button: String,
    pub timer_normal: String,
    pub timer_warning: String,
    pub timer_danger: String,
    pub timer_critical: String,
    pub bar_empty: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    /// User themes in `<config_dir>/pressure/themes/` shadow bundled ones.
    pub fn load(name: &str) -> Option<Self> {
        let filename = format!("{name}.toml");

        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir.join("pressure").join("themes").join(&filename);
            if let Ok(content) = fs::read_to_string(&user_theme_path) {
                match toml::from_str::<Theme>(&content) {
                    Ok(theme) => return Some(theme),
                    Err(e) => log::warn!("ignoring theme {}: {e}", user_theme_path.display()),
                }
            }
        }

        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load(DEFAULT_THEME).unwrap_or_else(|| Self {
            name: "fallback".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#101010".to_string(),
            fg: "#e0e0e0".to_string(),
            text_dim: "#707070".to_string(),
            accent: "#00d7ff".to_string(),
            border: "#404040".to_string(),
            header_bg: "#202020".to_string(),
            header_fg: "#e0e0e0".to_string(),
            red_button: "#ff3b3b".to_string(),
            blue_button: "#3b8bff".to_string(),
            timer_normal: "#00e676".to_string(),
            timer_warning: "#ffd600".to_string(),
            timer_danger: "#ff9100".to_string(),
            timer_critical: "#ff1744".to_string(),
            bar_empty: "#2a2a2a".to_string(),
            error: "#ff1744".to_string(),
            warning: "#ffd600".to_string(),
            success: "#00e676".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn text_dim(&self) -> Color { Self::parse_color(&self.text_dim) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn red_button(&self) -> Color { Self::parse_color(&self.red_button) }
    pub fn blue_button(&self) -> Color { Self::parse_color(&self.blue_button) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }

    pub fn timer(&self, phase: TimerPhase) -> Color {
        match phase {
            TimerPhase::Normal => Self::parse_color(&self.timer_normal),
            TimerPhase::Warning => Self::parse_color(&self.timer_warning),
            TimerPhase::Danger => Self::parse_color(&self.timer_danger),
            TimerPhase::Critical => Self::parse_color(&self.timer_critical),
        }
    }
}
