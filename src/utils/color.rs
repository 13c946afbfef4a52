use eframe::egui::Color32;

pub trait ColorExt {
    fn from_hex(hex: &str) -> Option<Self>
    where
        Self: Sized;
}

impl ColorExt for Color32 {
    fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Colors shared by the upload page and the toaster.
pub struct Palette;

impl Palette {
    pub fn accent() -> Color32 {
        Color32::from_rgb(161, 89, 225)
    }

    pub fn success() -> Color32 {
        Color32::from_hex("#22c55e").unwrap_or(Color32::GREEN)
    }

    pub fn warning() -> Color32 {
        Color32::from_hex("#f59e0b").unwrap_or(Color32::YELLOW)
    }

    pub fn error() -> Color32 {
        Color32::from_hex("#ef4444").unwrap_or(Color32::RED)
    }

    pub fn toast_background() -> Color32 {
        Color32::from_hex("#363636").unwrap_or(Color32::DARK_GRAY)
    }

    pub fn muted() -> Color32 {
        Color32::from_rgb(150, 150, 150)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_or_without_hash() {
        assert_eq!(Color32::from_hex("#363636"), Some(Color32::from_rgb(0x36, 0x36, 0x36)));
        assert_eq!(Color32::from_hex("ff0000"), Some(Color32::from_rgb(255, 0, 0)));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Color32::from_hex("#fff"), None);
        assert_eq!(Color32::from_hex("#zzzzzz"), None);
        assert_eq!(Color32::from_hex("#ééé"), None);
    }
}
