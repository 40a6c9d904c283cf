use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 102, g: 187, b: 106 };
pub const ACCENT: Color = Color::TrueColor { r: 79, g: 195, b: 247 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 220, g: 220, b: 220 };
pub const REACHABLE: Color = Color::Green;
pub const UNREACHABLE: Color = Color::Red;
