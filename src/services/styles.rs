//! 风格目录
//!
//! Themes and room types offered to clients. `/generate` accepts any
//! non-empty text for both; these lists drive `/options` and CLI defaults.

use serde::Serialize;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// 装修风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, AsRefStr, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Theme {
    #[default]
    Modern,
    Vintage,
    Minimalist,
    Professional,
    Tropical,
}

/// 房间类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, AsRefStr, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Room {
    #[default]
    #[strum(serialize = "Living Room")]
    LivingRoom,
    #[strum(serialize = "Dining Room")]
    DiningRoom,
    Bedroom,
    Bathroom,
    Office,
    #[strum(serialize = "Gaming Room")]
    GamingRoom,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// `/options` 响应体
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleCatalog {
    pub themes: Vec<String>,
    pub rooms: Vec<String>,
    pub default_theme: String,
    pub default_room: String,
}

impl StyleCatalog {
    pub fn build() -> Self {
        Self {
            themes: Theme::iter().map(|t| t.as_ref().to_string()).collect(),
            rooms: Room::iter().map(|r| r.as_ref().to_string()).collect(),
            default_theme: Theme::default().to_string(),
            default_room: Room::default().to_string(),
        }
    }
}
