//! ASCII colours for catppuccin theme.

pub const MAUVE: &str = "\x1b[38;2;203;166;247m"; // #CBA6F7
pub const RED: &str = "\x1b[38;2;243;139;168m"; // #F38BA8
pub const GREEN: &str = "\x1b[38;2;166;227;161m"; // #A6E3A1
pub const TEAL: &str = "\x1b[38;2;148;226;213m"; // #94E2D5
pub const OVERLAY: &str = "\x1b[38;2;108;112;134m"; // #6C7086

pub const RESET: &str = "\x1b[0m";
