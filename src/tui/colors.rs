//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::{Color as TaskColor, Kind};

/// Header and status bar background for personal-task focus.
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Header and status bar background for work-task focus.
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
/// Confirmation dialogs.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Yellow tasks; native yellow is hard to read on light terminals.
pub const GOLD: Color = Color::Rgb(255, 215, 0);

/// Foreground used for a task row.
pub fn task_color(c: TaskColor) -> Color {
    match c {
        TaskColor::Red => Color::Red,
        TaskColor::Blue => Color::LightBlue,
        TaskColor::Green => Color::Green,
        TaskColor::Yellow => GOLD,
    }
}

pub fn kind_color(k: Kind) -> Color {
    match k {
        Kind::Personal => DARK_GREEN,
        Kind::Work => DARK_PURPLE,
    }
}
