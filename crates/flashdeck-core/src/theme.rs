//! Appearance settings
//!
//! Themes are a closed set of variants, each mapped to a fixed palette.
//! Frontends translate [`Rgb`] into their own color type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Light/dark preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    /// Follow the terminal
    #[default]
    System,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 3] = [ThemeMode::Light, ThemeMode::Dark, ThemeMode::System];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown theme mode '{}'. Use light, dark or system.", s))
    }
}

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Accent color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Default,
    Violet,
    Yellow,
    Blue,
    Green,
    Orange,
    Rose,
    Red,
    Black,
}

/// Colors a frontend needs to draw a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Rgb,
    pub muted: Rgb,
    pub destructive: Rgb,
}

const MUTED: Rgb = Rgb(113, 113, 122);
const DESTRUCTIVE: Rgb = Rgb(220, 38, 38);

impl ColorTheme {
    pub const ALL: [ColorTheme; 9] = [
        ColorTheme::Default,
        ColorTheme::Violet,
        ColorTheme::Yellow,
        ColorTheme::Blue,
        ColorTheme::Green,
        ColorTheme::Orange,
        ColorTheme::Rose,
        ColorTheme::Red,
        ColorTheme::Black,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorTheme::Default => "default",
            ColorTheme::Violet => "violet",
            ColorTheme::Yellow => "yellow",
            ColorTheme::Blue => "blue",
            ColorTheme::Green => "green",
            ColorTheme::Orange => "orange",
            ColorTheme::Rose => "rose",
            ColorTheme::Red => "red",
            ColorTheme::Black => "black",
        }
    }

    /// Palette for this theme under the given mode
    pub fn palette(self, mode: ThemeMode) -> Palette {
        let primary = match self {
            ColorTheme::Default | ColorTheme::Black => match mode {
                ThemeMode::Light => Rgb(24, 24, 27),
                ThemeMode::Dark | ThemeMode::System => Rgb(250, 250, 250),
            },
            ColorTheme::Violet => Rgb(124, 58, 237),
            ColorTheme::Yellow => Rgb(250, 204, 21),
            ColorTheme::Blue => Rgb(37, 99, 235),
            ColorTheme::Green => Rgb(22, 163, 74),
            ColorTheme::Orange => Rgb(249, 115, 22),
            ColorTheme::Rose => Rgb(225, 29, 72),
            ColorTheme::Red => Rgb(220, 38, 38),
        };

        Palette {
            primary,
            muted: MUTED,
            destructive: DESTRUCTIVE,
        }
    }
}

impl fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorTheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorTheme::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<_> = ColorTheme::ALL.iter().map(|t| t.as_str()).collect();
                anyhow::anyhow!("Unknown color theme '{}'. Use one of: {}", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("Dark".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert_eq!("rose".parse::<ColorTheme>().unwrap(), ColorTheme::Rose);
        assert!("plaid".parse::<ColorTheme>().is_err());
        assert!("dusk".parse::<ThemeMode>().is_err());
    }

    #[test]
    fn test_every_theme_round_trips_its_name() {
        for theme in ColorTheme::ALL {
            assert_eq!(theme.to_string().parse::<ColorTheme>().unwrap(), theme);
        }
    }

    #[test]
    fn test_default_primary_follows_mode() {
        let light = ColorTheme::Default.palette(ThemeMode::Light);
        let dark = ColorTheme::Default.palette(ThemeMode::Dark);
        assert_ne!(light.primary, dark.primary);

        // Accent themes keep their hue in both modes
        assert_eq!(
            ColorTheme::Blue.palette(ThemeMode::Light).primary,
            ColorTheme::Blue.palette(ThemeMode::Dark).primary
        );
    }
}
