use eframe::egui::Color32;

pub trait ColorExt {
    fn from_hex(hex: &str) -> Option<Self>
    where
        Self: Sized;
}

impl ColorExt for Color32 {
    fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Color32::from_rgb(r, g, b))
    }
}

/// Accent colours of the dashboard: one per KPI card plus the chart fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Blue,
    Green,
    Orange,
    Red,
    Chart,
}

impl Accent {
    pub fn hex(self) -> &'static str {
        match self {
            Accent::Blue => "#3b82f6",
            Accent::Green => "#10b981",
            Accent::Orange => "#f59e0b",
            Accent::Red => "#ef4444",
            Accent::Chart => "#3498db",
        }
    }

    pub fn color(self) -> Color32 {
        Color32::from_hex(self.hex()).unwrap_or(Color32::GRAY)
    }
}

pub const ERROR_RED: Color32 = Color32::from_rgb(220, 50, 50);
pub const SUCCESS_GREEN: Color32 = Color32::from_rgb(0, 160, 70);
