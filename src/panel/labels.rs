//! Localized labels for the panel's chips, count indicator and banner.

use serde::{Deserialize, Serialize};

use crate::types::ViewerPhase;

/// Display language for rendered labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ja,
    En,
}

/// Label set for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    locale: Locale,
    viewer_displaying: &'static str,
    viewer_closed: &'static str,
    no_part: &'static str,
}

impl Labels {
    pub const fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::Ja => Self {
                locale,
                viewer_displaying: "表示中",
                viewer_closed: "未表示",
                no_part: "未選択",
            },
            Locale::En => Self {
                locale,
                viewer_displaying: "Displaying",
                viewer_closed: "Closed",
                no_part: "No part",
            },
        }
    }

    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// State chip text for a viewer phase.
    pub const fn viewer_phase(&self, phase: ViewerPhase) -> &'static str {
        match phase {
            ViewerPhase::Viewer => self.viewer_displaying,
            ViewerPhase::Closed => self.viewer_closed,
        }
    }

    /// Placeholder for the part chip when nothing is focused.
    pub const fn no_part(&self) -> &'static str {
        self.no_part
    }

    /// Count indicator text.
    pub fn count(&self, count: usize) -> String {
        match self.locale {
            Locale::Ja => format!("{count}件"),
            Locale::En if count == 1 => "1 part".to_string(),
            Locale::En => format!("{count} parts"),
        }
    }

    /// Banner text for a pushed location update.
    pub fn announcement(&self, order_code: &str, location_code: &str) -> String {
        match self.locale {
            Locale::Ja => format!("{order_code} の所在を {location_code} に更新しました"),
            Locale::En => format!("{order_code} moved to {location_code}"),
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_japanese_viewer_label() {
        let labels = Labels::for_locale(Locale::Ja);
        assert_eq!(labels.viewer_phase(ViewerPhase::Viewer), "表示中");
        assert_eq!(labels.viewer_phase(ViewerPhase::Closed), "未表示");
    }

    #[test]
    fn test_count_contains_number() {
        assert_eq!(Labels::for_locale(Locale::Ja).count(1), "1件");
        assert_eq!(Labels::for_locale(Locale::En).count(1), "1 part");
        assert_eq!(Labels::for_locale(Locale::En).count(3), "3 parts");
    }

    #[test]
    fn test_default_locale_is_japanese() {
        assert_eq!(Labels::default().locale(), Locale::Ja);
    }
}
