//! Configuration types for Trestle rendering.
//!
//! [`AppConfig`] is the configuration root. Its [`StyleConfig`] controls
//! layout direction, text metrics, spacing and colors. Both types implement
//! [`serde::Deserialize`] with defaults for every field, so an embedding
//! application can load them from TOML or any other serde format.
//!
//! A diagram may override the style for itself with directives such as
//! `#direction: right`; see [`StyleConfig::with_directives`].
//!
//! # Example
//!
//! ```
//! # use trestle::config::{AppConfig, Direction};
//! let config = AppConfig::default();
//! assert_eq!(config.style().direction(), Direction::Down);
//! assert_eq!(config.style().font_size(), 12.0);
//! ```

use std::{fmt, str::FromStr};

use log::{debug, warn};
use serde::Deserialize;

use trestle_parser::{
    diagram::Directive,
    error::{Diagnostic, ErrorCode, ParseError},
};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    pub fn new(style: StyleConfig) -> Self {
        Self { style }
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// The axis ranks are stacked along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ranks are rows, top to bottom.
    #[default]
    Down,
    /// Ranks are columns, left to right.
    Right,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "down" => Ok(Direction::Down),
            "right" => Ok(Direction::Right),
            other => Err(format!("unknown direction `{other}`")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Down => f.write_str("down"),
            Direction::Right => f.write_str("right"),
        }
    }
}

/// Visual styling for rendered diagrams.
///
/// Field names match the directive keys a diagram can use to override them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleConfig {
    direction: Direction,
    font_size: f32,
    font: String,
    padding: f32,
    spacing: f32,
    line_width: f32,
    fill: String,
    stroke: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Down,
            font_size: 12.0,
            font: "Helvetica".to_string(),
            padding: 8.0,
            spacing: 40.0,
            line_width: 3.0,
            fill: "#eee8d5".to_string(),
            stroke: "#33322E".to_string(),
        }
    }
}

impl StyleConfig {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    /// Space between a compartment's border and its text.
    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Distance between ranks and between nodes of the same rank.
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn fill(&self) -> &str {
        &self.fill
    }

    pub fn stroke(&self) -> &str {
        &self.stroke
    }

    /// Check that every numeric setting is a positive finite number.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending setting.
    pub fn validate(&self) -> Result<(), String> {
        let numbers = [
            ("fontSize", self.font_size),
            ("padding", self.padding),
            ("spacing", self.spacing),
            ("lineWidth", self.line_width),
        ];
        for (name, value) in numbers {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("`{name}` must be a positive number, got {value}"));
            }
        }
        Ok(())
    }

    /// Returns a copy of this style with the diagram's directives applied.
    ///
    /// Directives are applied in source order, so a later directive wins.
    /// Unknown keys are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] with one E202 diagnostic per invalid value.
    pub fn with_directives(&self, directives: &[Directive]) -> Result<StyleConfig, ParseError> {
        let mut style = self.clone();
        let mut diagnostics = Vec::new();

        for directive in directives {
            let key = directive.key().inner().as_str();
            let value = directive.value().inner().as_str();

            let applied = match key {
                "direction" => value
                    .parse()
                    .map(|direction| style.direction = direction)
                    .map_err(|_| "expected `down` or `right`"),
                "fontSize" => positive(value).map(|v| style.font_size = v),
                "padding" => positive(value).map(|v| style.padding = v),
                "spacing" => positive(value).map(|v| style.spacing = v),
                "lineWidth" => positive(value).map(|v| style.line_width = v),
                "font" => text(value).map(|v| style.font = v),
                "fill" => text(value).map(|v| style.fill = v),
                "stroke" => text(value).map(|v| style.stroke = v),
                _ => {
                    warn!(directive = key; "Ignoring unknown directive");
                    continue;
                }
            };

            match applied {
                Ok(()) => debug!(directive = key, value; "Applied directive"),
                Err(help) => diagnostics.push(
                    Diagnostic::error(format!("invalid value for `#{key}`"))
                        .with_code(ErrorCode::E202)
                        .with_label(directive.value().span(), ErrorCode::E202.description())
                        .with_secondary_label(directive.key().span(), "for this directive")
                        .with_help(help),
                ),
            }
        }

        if diagnostics.is_empty() {
            Ok(style)
        } else {
            Err(ParseError::new(diagnostics))
        }
    }
}

fn positive(value: &str) -> Result<f32, &'static str> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or("expected a positive number")
}

fn text(value: &str) -> Result<String, &'static str> {
    if value.is_empty() {
        Err("expected a value after `:`")
    } else {
        Ok(value.to_string())
    }
}
