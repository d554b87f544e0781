//! ANSI palettes for the two presentation themes.

use shared::domain::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub user: &'static str,
    pub assistant: &'static str,
    pub ok: &'static str,
    pub bad: &'static str,
    pub muted: &'static str,
    pub accent: &'static str,
}

pub const RESET: &str = "\x1b[0m";

const LIGHT: Palette = Palette {
    user: "\x1b[34m",
    assistant: "\x1b[30m",
    ok: "\x1b[32m",
    bad: "\x1b[31m",
    muted: "\x1b[90m",
    accent: "\x1b[35m",
};

const DARK: Palette = Palette {
    user: "\x1b[94m",
    assistant: "\x1b[97m",
    ok: "\x1b[92m",
    bad: "\x1b[91m",
    muted: "\x1b[37m",
    accent: "\x1b[95m",
};

pub fn palette_for(theme: Theme) -> Palette {
    match theme {
        Theme::Light => LIGHT,
        Theme::Dark => DARK,
    }
}

/// Palette that emits no escape codes, for non-tty output.
pub const PLAIN: Palette = Palette {
    user: "",
    assistant: "",
    ok: "",
    bad: "",
    muted: "",
    accent: "",
};
