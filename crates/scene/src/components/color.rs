/// Linear RGBA color, components in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([1.0, 1.0, 1.0, 1.0]);
    pub const RED: Rgba = Rgba([1.0, 0.0, 0.0, 1.0]);
    /// CSS green (`#008000`), not lime.
    pub const GREEN: Rgba = Rgba([0.0, 128.0 / 255.0, 0.0, 1.0]);
    pub const BLUE: Rgba = Rgba([0.0, 0.0, 1.0, 1.0]);
    pub const TRANSPARENT: Rgba = Rgba([0.0, 0.0, 0.0, 0.0]);

    pub const fn with_alpha(self, alpha: f32) -> Rgba {
        let [r, g, b, _] = self.0;
        Rgba([r, g, b, alpha])
    }

    pub fn alpha(&self) -> f32 {
        self.0[3]
    }

    /// Quantized channels, usable as a map key.
    pub fn to_rgba8(self) -> [u8; 4] {
        self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(code: &str) -> Option<Rgba> {
        let hex = code.strip_prefix('#')?;
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| -> Option<f32> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Some(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
    }
}
