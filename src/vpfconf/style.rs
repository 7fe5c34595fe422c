//! Rendering attributes captured per selected feature.
//!
//! A layer reads these back as `<feature>.<key>` properties, so each selected
//! feature carries its own copy taken at the moment it was added.

use crate::error::{Result, VpfError};
use crate::properties::PropertyBag;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const LINE_COLOR: &str = "lineColor";
pub const FILL_COLOR: &str = "fillColor";
pub const SELECT_COLOR: &str = "selectColor";
pub const LINE_WIDTH: &str = "lineWidth";
pub const DASH_PATTERN: &str = "dashPattern";

/// An ARGB color, written as eight hex digits (`aarrggbb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xff00_0000);
    pub const CLEAR: Color = Color(0x0000_0000);

    pub fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }
}

impl FromStr for Color {
    type Err = VpfError;

    /// Accepts `rrggbb` (opaque) or `aarrggbb`, with an optional `#` or `0x`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .unwrap_or(trimmed);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(VpfError::InvalidColor(s.to_string()));
        }
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| VpfError::InvalidColor(s.to_string()))?;
        match hex.len() {
            6 => Ok(Color(0xff00_0000 | value)),
            8 => Ok(Color(value)),
            _ => Err(VpfError::InvalidColor(s.to_string())),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = VpfError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleAttributes {
    #[serde(default = "default_line_color")]
    pub line_color: Color,
    #[serde(default = "default_fill_color")]
    pub fill_color: Color,
    #[serde(default = "default_line_color")]
    pub select_color: Color,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
    /// Alternating dash and gap lengths; solid when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_pattern: Option<Vec<f32>>,
}

fn default_line_color() -> Color {
    Color::BLACK
}

fn default_fill_color() -> Color {
    Color::CLEAR
}

fn default_line_width() -> f32 {
    1.0
}

impl Default for StyleAttributes {
    fn default() -> Self {
        Self {
            line_color: Color::BLACK,
            fill_color: Color::CLEAR,
            select_color: Color::BLACK,
            line_width: 1.0,
            dash_pattern: None,
        }
    }
}

impl StyleAttributes {
    /// Update one attribute by its property key (`lineColor`, `line-color` and
    /// `line_color` are all accepted).
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match normalize_key(key).as_str() {
            "linecolor" => self.line_color = value.parse()?,
            "fillcolor" => self.fill_color = value.parse()?,
            "selectcolor" => self.select_color = value.parse()?,
            "linewidth" => {
                let width: f32 = value
                    .trim()
                    .parse()
                    .map_err(|_| VpfError::Config(format!("Invalid line width: {}", value)))?;
                if !(width.is_finite() && width >= 0.0) {
                    return Err(VpfError::Config(format!("Invalid line width: {}", value)));
                }
                self.line_width = width;
            }
            "dashpattern" => self.dash_pattern = parse_dash_pattern(value)?,
            _ => return Err(VpfError::Config(format!("Unknown style key: {}", key))),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match normalize_key(key).as_str() {
            "linecolor" => Some(self.line_color.to_string()),
            "fillcolor" => Some(self.fill_color.to_string()),
            "selectcolor" => Some(self.select_color.to_string()),
            "linewidth" => Some(format_number(self.line_width)),
            "dashpattern" => Some(
                self.dash_pattern
                    .as_ref()
                    .map(|p| p.iter().map(|v| format_number(*v)).collect::<Vec<_>>().join(" "))
                    .unwrap_or_else(|| "none".to_string()),
            ),
            _ => None,
        }
    }

    /// Flatten into `bag` as `<prefix>.<key>` entries.
    pub fn write_properties(&self, prefix: &str, bag: &mut PropertyBag) {
        bag.insert(scoped(prefix, LINE_COLOR), self.line_color.to_string());
        bag.insert(scoped(prefix, FILL_COLOR), self.fill_color.to_string());
        bag.insert(scoped(prefix, SELECT_COLOR), self.select_color.to_string());
        bag.insert(scoped(prefix, LINE_WIDTH), format_number(self.line_width));
        if let Some(pattern) = &self.dash_pattern {
            let joined = pattern
                .iter()
                .map(|v| format_number(*v))
                .collect::<Vec<_>>()
                .join(" ");
            bag.insert(scoped(prefix, DASH_PATTERN), joined);
        }
    }
}

fn scoped(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_dash_pattern(value: &str) -> Result<Option<Vec<f32>>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let parts = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<f32>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or_else(|| VpfError::Config(format!("Invalid dash pattern: {}", value)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(parts))
}

fn format_number(v: f32) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_rgb_as_opaque() {
        let c: Color = "ff0000".parse().unwrap();
        assert_eq!(c, Color(0xffff0000));
        assert_eq!(c.to_string(), "ffff0000");
    }

    #[test]
    fn test_parses_argb_with_prefix() {
        assert_eq!("#8000ff00".parse::<Color>().unwrap(), Color(0x8000ff00));
        assert_eq!("0x00000000".parse::<Color>().unwrap(), Color::CLEAR);
    }

    #[test]
    fn test_rejects_bad_colors() {
        assert!(matches!(
            "red".parse::<Color>(),
            Err(VpfError::InvalidColor(_))
        ));
        assert!("fff".parse::<Color>().is_err());
        assert!("+fffff".parse::<Color>().is_err());
    }

    #[test]
    fn test_set_accepts_key_spellings() {
        let mut style = StyleAttributes::default();
        style.set("line-color", "00ff00").unwrap();
        style.set("fillColor", "8000ff00").unwrap();
        style.set("line_width", "2.5").unwrap();
        style.set("dashPattern", "4 2").unwrap();
        assert_eq!(style.line_color, Color(0xff00ff00));
        assert_eq!(style.fill_color, Color(0x8000ff00));
        assert_eq!(style.line_width, 2.5);
        assert_eq!(style.dash_pattern, Some(vec![4.0, 2.0]));

        style.set("dash-pattern", "none").unwrap();
        assert_eq!(style.dash_pattern, None);
    }

    #[test]
    fn test_get_mirrors_set() {
        let mut style = StyleAttributes::default();
        assert_eq!(style.get("dash-pattern").as_deref(), Some("none"));
        style.set("line_width", "3").unwrap();
        style.set("dashPattern", "4,2.5").unwrap();
        assert_eq!(style.get("lineWidth").as_deref(), Some("3"));
        assert_eq!(style.get("dashPattern").as_deref(), Some("4 2.5"));
        assert_eq!(style.get("opacity"), None);
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let mut style = StyleAttributes::default();
        assert!(style.set("opacity", "1").is_err());
        assert!(style.set("lineWidth", "-1").is_err());
    }

    #[test]
    fn test_writes_prefixed_properties() {
        let mut style = StyleAttributes::default();
        style.set("lineColor", "ff0000").unwrap();
        let mut bag = PropertyBag::new();
        style.write_properties("road", &mut bag);

        assert_eq!(bag.get("road.lineColor"), Some("ffff0000"));
        assert_eq!(bag.get("road.fillColor"), Some("00000000"));
        assert_eq!(bag.get("road.lineWidth"), Some("1"));
        assert_eq!(bag.get("road.dashPattern"), None);
        assert_eq!(bag.len(), 4);
    }

    #[test]
    fn test_style_json_roundtrip() {
        let mut style = StyleAttributes::default();
        style.set("dashPattern", "3,1").unwrap();
        let json = serde_json::to_string(&style).unwrap();
        assert!(json.contains("\"ff000000\""));
        let parsed: StyleAttributes = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, style);
    }
}
