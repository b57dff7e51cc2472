//! Light/dark palettes for the desktop app

use std::sync::OnceLock;

/// `JOTTER_THEME=light|dark` pins the theme instead of following the OS.
pub const THEME_ENV: &str = "JOTTER_THEME";

static SYSTEM_DARK_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvedTheme {
    #[default]
    Light,
    Dark,
}

impl ResolvedTheme {
    /// Theme from `JOTTER_THEME`, falling back to the OS preference.
    #[must_use]
    pub fn detect() -> Self {
        let pinned = std::env::var(THEME_ENV).ok();
        Self::from_setting(pinned.as_deref()).unwrap_or_else(Self::from_system)
    }

    fn from_system() -> Self {
        if is_system_dark_mode() {
            Self::Dark
        } else {
            Self::Light
        }
    }

    #[must_use]
    pub fn from_setting(value: Option<&str>) -> Option<Self> {
        match value?.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// Value for the `data-theme` attribute.
    #[must_use]
    pub const fn attr(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn palette(self) -> &'static ColorPalette {
        match self {
            Self::Light => &LIGHT_PALETTE,
            Self::Dark => &DARK_PALETTE,
        }
    }
}

/// Cached after the first call; detection may spawn a subprocess.
#[must_use]
pub fn is_system_dark_mode() -> bool {
    *SYSTEM_DARK_MODE.get_or_init(|| {
        let dark = detect_dark_mode();
        tracing::debug!(dark, "detected system theme");
        dark
    })
}

fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    match std::process::Command::new(program).args(args).output() {
        Ok(output) => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
        Err(error) => {
            tracing::warn!("Could not run {program} to detect the theme: {error}");
            None
        }
    }
}

fn detect_dark_mode() -> bool {
    if cfg!(target_os = "macos") {
        command_stdout("defaults", &["read", "-g", "AppleInterfaceStyle"])
            .is_some_and(|style| style.trim().eq_ignore_ascii_case("dark"))
    } else if cfg!(target_os = "windows") {
        // AppsUseLightTheme reads 0x0 when apps use the dark theme.
        command_stdout(
            "reg",
            &[
                "query",
                r"HKCU\SOFTWARE\Microsoft\Windows\CurrentVersion\Themes\Personalize",
                "/v",
                "AppsUseLightTheme",
            ],
        )
        .is_some_and(|value| value.contains("0x0"))
    } else {
        std::env::var("GTK_THEME").is_ok_and(|theme| theme.to_ascii_lowercase().contains("dark"))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub bg_primary: &'static str,
    pub bg_secondary: &'static str,
    pub bg_tertiary: &'static str,
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub text_muted: &'static str,
    pub border: &'static str,
    pub accent: &'static str,
    pub accent_text: &'static str,
    pub error: &'static str,
    pub success: &'static str,
}

pub const LIGHT_PALETTE: ColorPalette = ColorPalette {
    bg_primary: "#ffffff",
    bg_secondary: "#f7f7f5",
    bg_tertiary: "#efeee9",
    text_primary: "#1f1f1f",
    text_secondary: "#5c5c5c",
    text_muted: "#9a9a9a",
    border: "#e2e1dc",
    accent: "#2563eb",
    accent_text: "#ffffff",
    error: "#dc2626",
    success: "#16a34a",
};

pub const DARK_PALETTE: ColorPalette = ColorPalette {
    bg_primary: "#191919",
    bg_secondary: "#202020",
    bg_tertiary: "#2b2b2b",
    text_primary: "#ebebeb",
    text_secondary: "#a3a3a3",
    text_muted: "#6b6b6b",
    border: "#363636",
    accent: "#60a5fa",
    accent_text: "#111111",
    error: "#f87171",
    success: "#4ade80",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_setting_accepts_known_values() {
        assert_eq!(ResolvedTheme::from_setting(Some(" Dark ")), Some(ResolvedTheme::Dark));
        assert_eq!(ResolvedTheme::from_setting(Some("light")), Some(ResolvedTheme::Light));
        assert_eq!(ResolvedTheme::from_setting(Some("sepia")), None);
        assert_eq!(ResolvedTheme::from_setting(None), None);
    }

    #[test]
    fn attr_matches_palette() {
        assert_eq!(ResolvedTheme::Dark.attr(), "dark");
        assert_eq!(ResolvedTheme::Light.palette().bg_primary, "#ffffff");
    }
}
