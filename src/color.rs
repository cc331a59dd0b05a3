use cgmath::VectorSpace;

use crate::error::{invalid, Result};

// Linear RGB, each channel in [0, 1].
pub type Rgb = cgmath::Vector3<f32>;

// Parses a "#rrggbb" (or "#rgb") color as used by the config file.
pub fn parse_hex(name: &str, hex: &str) -> Result<Rgb> {
    match scarlet::color::RGBColor::from_hex_code(hex.trim()) {
        Ok(color) => Ok(Rgb::new(color.r as f32, color.g as f32, color.b as f32)),
        Err(e) => invalid(format!("{} is not a hex color ({:?}): {:?}", name, hex, e)),
    }
}

pub fn lerp(from: Rgb, to: Rgb, t: f32) -> Rgb {
    from.lerp(to, t)
}

pub fn to_array(color: Rgb) -> [f32; 3] {
    [color.x, color.y, color.z]
}
