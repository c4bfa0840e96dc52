//! 主题设置

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

/// 每个用户的界面主题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeSettings {
    pub mode: ThemeMode,
    /// `#RRGGBB`
    pub primary_color: String,
    pub font_family: String,
    /// 圆角 (rem)
    pub radius: f32,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            mode: ThemeMode::System,
            primary_color: "#2563EB".to_string(),
            font_family: "Inter".to_string(),
            radius: 0.5,
        }
    }
}

impl ThemeSettings {
    pub fn validate(&self) -> AppResult<()> {
        let color = self.primary_color.as_bytes();
        let is_hex_color = color.len() == 7
            && color[0] == b'#'
            && color[1..].iter().all(|b| b.is_ascii_hexdigit());
        if !is_hex_color {
            return Err(AppError::validation("primaryColor must look like #RRGGBB")
                .with_detail("field", "primaryColor"));
        }
        if self.font_family.trim().is_empty() {
            return Err(
                AppError::validation("fontFamily must not be empty").with_detail("field", "fontFamily")
            );
        }
        if !(0.0..=2.0).contains(&self.radius) {
            return Err(
                AppError::validation("radius must be within 0..=2").with_detail("field", "radius")
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(ThemeSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let theme: ThemeSettings = serde_json::from_str(r#"{"mode":"dark"}"#).unwrap();
        assert_eq!(theme.mode, ThemeMode::Dark);
        assert_eq!(theme.primary_color, "#2563EB");
    }

    #[test]
    fn test_rejects_invalid_values() {
        let theme = ThemeSettings {
            primary_color: "blue".to_string(),
            ..Default::default()
        };
        assert!(theme.validate().is_err());

        let theme = ThemeSettings {
            radius: 9.0,
            ..Default::default()
        };
        assert!(theme.validate().is_err());
    }
}
