//! Color constants for the status board.

use ratatui::style::Color;

/// Cards past their due date.
pub const OVERDUE_RED: Color = Color::Rgb(150, 20, 20);
/// Cards due today.
pub const TODAY_AMBER: Color = Color::Rgb(200, 120, 0);
/// Cards due within the next few days.
pub const SOON_GOLD: Color = Color::Rgb(255, 215, 0);
/// Selection and borders.
pub const ACCENT_TEAL: Color = Color::Rgb(0, 128, 128);
