use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const MAC_ADDR: Color = Color::Cyan;
pub const CHANNEL: Color = Color::BrightMagenta;
pub const SIGNAL: Color = Color::Yellow;
pub const ENCRYPTION: Color = Color::BrightBlue;
pub const UNKNOWN: Color = Color::BrightBlack;
