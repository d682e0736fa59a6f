use eframe::egui::Color32;
use palette::{Srgb, Srgba};

// ---------------------------------------------------------------------------
// Dashboard palette
// ---------------------------------------------------------------------------

pub const PRIMARY: &str = "#1e40af";
pub const SECONDARY: &str = "#0891b2";
pub const ACCENT: &str = "#ea580c";
pub const NEUTRAL: &str = "#374151";

// ---------------------------------------------------------------------------
// CSS-style colour strings ↔ palette / egui colours
// ---------------------------------------------------------------------------

/// Parse `#rgb`, `#rrggbb` or `rgba(r, g, b, a)` (alpha in 0..=1).
pub fn parse_css_color(s: &str) -> Option<Srgba<u8>> {
    let s = s.trim();
    if let Some(inner) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        let channel = |i: usize| parts.get(i)?.parse::<u8>().ok();
        let alpha = match parts.get(3) {
            Some(a) => (a.parse::<f32>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
            None => 255,
        };
        return Some(Srgba::new(channel(0)?, channel(1)?, channel(2)?, alpha));
    }
    let rgb: Srgb<u8> = s.parse().ok()?;
    Some(Srgba::new(rgb.red, rgb.green, rgb.blue, 255))
}

/// `rgba(...)` string of `color` with the given opacity.
pub fn with_alpha(color: &str, alpha: f32) -> String {
    let c = parse_css_color(color).unwrap_or(Srgba::new(0, 0, 0, 255));
    format!("rgba({}, {}, {}, {})", c.red, c.green, c.blue, alpha)
}

/// Convert a CSS colour string to an egui colour; grey when unparseable.
pub fn to_color32(color: &str) -> Color32 {
    parse_css_color(color)
        .map(|c| Color32::from_rgba_unmultiplied(c.red, c.green, c.blue, c.alpha))
        .unwrap_or(Color32::GRAY)
}

/// Linear blend between two colours, `t` in 0..=1.
pub fn mix(a: Srgba<u8>, b: Srgba<u8>, t: f32) -> Srgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let lerp = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
    Srgba::new(
        lerp(a.red, b.red),
        lerp(a.green, b.green),
        lerp(a.blue, b.blue),
        lerp(a.alpha, b.alpha),
    )
}
