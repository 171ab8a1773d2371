/*
 * Theme Module
 *
 * Light and dark themes, the background colour of each, and the stroke colour
 * strings stored on every decorated constraint. A stroke colour keeps its
 * opacity in the string itself, so a theme change has to read it back out.
 */

use nannou::color::{rgb8, Rgb8, Rgba};
use std::str::FromStr;

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn background(self) -> Rgb8 {
        match self {
            Theme::Dark => rgb8(0x05, 0x05, 0x05),
            Theme::Light => rgb8(0xff, 0xff, 0xff),
        }
    }

    // White strokes on dark, black strokes on light
    pub fn stroke(self, opacity: f32) -> StrokeColor {
        let channel = if self.is_dark() { 255 } else { 0 };
        StrokeColor(format!("rgba({channel}, {channel}, {channel}, {opacity})"))
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(ConfigError::Invalid(format!("unknown theme {other:?}"))),
        }
    }
}

/// CSS-style colour string, either `rgba(r, g, b, a)` or `transparent`.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeColor(String);

impl StrokeColor {
    pub fn transparent() -> Self {
        StrokeColor("transparent".to_string())
    }

    pub fn from_css(css: impl Into<String>) -> Self {
        StrokeColor(css.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_transparent(&self) -> bool {
        self.0 == "transparent"
    }

    /// Trailing numeric component before the closing parenthesis.
    pub fn opacity(&self) -> Option<f32> {
        let body = self.0.trim().strip_suffix(')')?;
        let tail = body.rsplit(|c: char| !(c.is_ascii_digit() || c == '.')).next()?;
        tail.parse::<f32>().ok().filter(|opacity| *opacity != 0.0)
    }

    // Same opacity, base swapped to the given theme
    pub fn recolored(&self, theme: Theme, fallback_opacity: f32) -> StrokeColor {
        theme.stroke(self.opacity().unwrap_or(fallback_opacity))
    }

    pub fn to_rgba(&self) -> Option<Rgba> {
        if self.is_transparent() {
            return Some(Rgba::new(0.0, 0.0, 0.0, 0.0));
        }

        let inner = self.0.trim().strip_prefix("rgba(")?.strip_suffix(')')?;
        let parts: Vec<f32> = inner
            .split(',')
            .map(|part| part.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [r, g, b, a] => Some(Rgba::new(r / 255.0, g / 255.0, b / 255.0, *a)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_returns_to_start() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn theme_names_parse_case_insensitively() {
        assert_eq!("Light".parse::<Theme>().unwrap(), Theme::Light);
        assert_eq!(" dark ".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn stroke_base_follows_theme() {
        assert_eq!(Theme::Dark.stroke(0.2).as_str(), "rgba(255, 255, 255, 0.2)");
        assert_eq!(Theme::Light.stroke(0.2).as_str(), "rgba(0, 0, 0, 0.2)");
    }

    #[test]
    fn opacity_is_read_back_from_string() {
        assert_eq!(Theme::Light.stroke(0.35).opacity(), Some(0.35));
        assert_eq!(StrokeColor::from_css("rgba(1, 2, 3, .5)").opacity(), Some(0.5));
    }

    #[test]
    fn malformed_colour_has_no_opacity() {
        assert_eq!(StrokeColor::from_css("red").opacity(), None);
        assert_eq!(StrokeColor::from_css("rgba(0, 0, 0, x)").opacity(), None);
        assert_eq!(StrokeColor::transparent().opacity(), None);
    }

    #[test]
    fn recolor_keeps_opacity_and_swaps_base() {
        let dark = Theme::Dark.stroke(0.17);
        let light = dark.recolored(Theme::Light, 0.3);
        assert_eq!(light.as_str(), "rgba(0, 0, 0, 0.17)");
    }

    #[test]
    fn recolor_falls_back_on_malformed_colour() {
        let recolored = StrokeColor::from_css("garbage").recolored(Theme::Dark, 0.3);
        assert_eq!(recolored.as_str(), "rgba(255, 255, 255, 0.3)");
    }

    #[test]
    fn rgba_conversion_scales_channels() {
        let rgba = Theme::Dark.stroke(0.25).to_rgba().unwrap();
        assert_eq!((rgba.red, rgba.green, rgba.blue, rgba.alpha), (1.0, 1.0, 1.0, 0.25));
        assert!(StrokeColor::from_css("rgb(1, 2, 3)").to_rgba().is_none());
    }
}
