use palette::{Hsl, IntoColor, Srgb, Srgba};

const BASE_HUES: [f64; 8] = [15.0, 28.0, 42.0, 120.0, 190.0, 220.0, 270.0, 330.0];

/// Fill color for a sector. Depends only on the layer and sector indices, so
/// neighbouring sectors differ and the same wheel always looks the same.
pub fn sector_fill(layer: usize, sector: usize) -> Srgba<f64> {
    let i = layer + sector;
    let hue = BASE_HUES[i % BASE_HUES.len()] + ((i * 13) % 30) as f64;
    let rgb: Srgb<f64> = Hsl::<palette::encoding::Srgb, f64>::new(hue, 0.7, 0.6).into_color();
    Srgba::new(rgb.red, rgb.green, rgb.blue, 1.0)
}

/// Parses `#rrggbb` (or the short `#rgb`) into an opaque color.
pub fn hex(code: &str) -> Option<Srgba<f64>> {
    if !code.starts_with('#') {
        return None;
    }
    let rgb: Srgb<f64> = code.parse::<Srgb<u8>>().ok()?.into_format();
    Some(Srgba::new(rgb.red, rgb.green, rgb.blue, 1.0))
}
