//! Per-pixel conversions from canonical 8-bit RGB.
//!
//! Every function is total over the 8-bit cube: intermediate values are
//! rounded to nearest and saturated into `0..=255`. The 8-bit encodings follow
//! the usual machine-vision conventions (hue halved into `0..180`, Lab/Luv
//! lightness scaled from `0..100`, chroma axes offset around 128).

use std::sync::OnceLock;

// D65 reference white, Y normalized to 1.
const WHITE_X: f32 = 0.950_456;
const WHITE_Z: f32 = 1.088_754;

const LAB_EPSILON: f32 = 0.008_856;
const LAB_KAPPA: f32 = 903.3;

static SRGB_TO_LINEAR_LUT: OnceLock<[f32; 256]> = OnceLock::new();

#[inline]
fn to_byte(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn srgb_to_linear(channel: u8) -> f32 {
    let table = SRGB_TO_LINEAR_LUT.get_or_init(|| {
        let mut table = [0.0f32; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let c = i as f32 / 255.0;
            *entry = if c <= 0.040_45 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            };
        }
        table
    });
    table[channel as usize]
}

#[inline]
fn rgb_to_xyz(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (r, g, b) = (srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b));
    let x = 0.412_453 * r + 0.357_580 * g + 0.180_423 * b;
    let y = 0.212_671 * r + 0.715_160 * g + 0.072_169 * b;
    let z = 0.019_334 * r + 0.119_193 * g + 0.950_227 * b;
    (x, y, z)
}

// CIE lightness in 0..100 from relative luminance.
#[inline]
fn lightness(y: f32) -> f32 {
    if y > LAB_EPSILON {
        116.0 * y.cbrt() - 16.0
    } else {
        LAB_KAPPA * y
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        (LAB_KAPPA * t + 16.0) / 116.0
    }
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

// Converts an RGB triple to a single luminance value.
pub fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
    to_byte(luma(r, g, b))
}

// Converts an RGB triple to HSV with hue halved into 0..180.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = (max - min) as f32;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g as f32 - b as f32) / delta
    } else if max == g {
        120.0 + 60.0 * (b as f32 - r as f32) / delta
    } else {
        240.0 + 60.0 * (r as f32 - g as f32) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    // 359.5 degrees and up rounds onto 180, which is the same hue as 0.
    let mut h_byte = (h / 2.0).round() as u16;
    if h_byte >= 180 {
        h_byte -= 180;
    }

    let s = if max == 0 { 0.0 } else { 255.0 * delta / max as f32 };

    [h_byte as u8, to_byte(s), max]
}

// Converts an RGB triple to CIE L*a*b* scaled into bytes.
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (x, y, z) = rgb_to_xyz(r, g, b);
    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y);
    let fz = lab_f(z / WHITE_Z);

    let l = lightness(y);
    let a = 500.0 * (fx - fy);
    let b = 200.0 * (fy - fz);

    [to_byte(l * 255.0 / 100.0), to_byte(a + 128.0), to_byte(b + 128.0)]
}

// Converts an RGB triple to CIE L*u*v* scaled into bytes.
pub fn rgb_to_luv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (x, y, z) = rgb_to_xyz(r, g, b);
    let white_denominator = WHITE_X + 15.0 + 3.0 * WHITE_Z;
    let u_white = 4.0 * WHITE_X / white_denominator;
    let v_white = 9.0 / white_denominator;

    let l = lightness(y);
    let denominator = x + 15.0 * y + 3.0 * z;
    let (u, v) = if denominator <= f32::EPSILON {
        (0.0, 0.0)
    } else {
        let u_prime = 4.0 * x / denominator;
        let v_prime = 9.0 * y / denominator;
        (13.0 * l * (u_prime - u_white), 13.0 * l * (v_prime - v_white))
    };

    [
        to_byte(l * 255.0 / 100.0),
        to_byte((u + 134.0) * 255.0 / 354.0),
        to_byte((v + 140.0) * 255.0 / 262.0),
    ]
}

// Converts an RGB triple to Y, Cr, Cb (in that channel order).
pub fn rgb_to_ycrcb(r: u8, g: u8, b: u8) -> [u8; 3] {
    let y = luma(r, g, b);
    let cr = (r as f32 - y) * 0.713 + 128.0;
    let cb = (b as f32 - y) * 0.564 + 128.0;
    [to_byte(y), to_byte(cr), to_byte(cb)]
}

// Converts an RGB triple to Y, U, V.
pub fn rgb_to_yuv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let y = luma(r, g, b);
    let u = (b as f32 - y) * 0.492 + 128.0;
    let v = (r as f32 - y) * 0.877 + 128.0;
    [to_byte(y), to_byte(u), to_byte(v)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_uses_rec601_weights() {
        assert_eq!(rgb_to_gray(255, 255, 255), 255);
        assert_eq!(rgb_to_gray(0, 0, 0), 0);
        assert_eq!(rgb_to_gray(255, 0, 0), 76);
        assert_eq!(rgb_to_gray(0, 255, 0), 150);
        assert_eq!(rgb_to_gray(0, 0, 255), 29);
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 0), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 255), [120, 255, 255]);
        assert_eq!(rgb_to_hsv(128, 128, 128), [0, 0, 128]);
        assert_eq!(rgb_to_hsv(0, 0, 0), [0, 0, 0]);
    }

    #[test]
    fn hsv_hue_never_reaches_180() {
        // Hue just under 360 degrees.
        let [h, _, _] = rgb_to_hsv(255, 0, 1);
        assert!(h < 180);
    }

    #[test]
    fn lab_white_and_black() {
        assert_eq!(rgb_to_lab(255, 255, 255), [255, 128, 128]);
        assert_eq!(rgb_to_lab(0, 0, 0), [0, 128, 128]);
    }

    #[test]
    fn lab_red_leans_positive_a() {
        let [_, a, b] = rgb_to_lab(255, 0, 0);
        assert!(a > 200);
        assert!(b > 170);
    }

    #[test]
    fn luv_black_sits_at_axis_offsets() {
        assert_eq!(rgb_to_luv(0, 0, 0), [0, 97, 136]);
        assert_eq!(rgb_to_luv(255, 255, 255)[0], 255);
    }

    #[test]
    fn ycrcb_and_yuv_keep_grays_centered() {
        assert_eq!(rgb_to_ycrcb(128, 128, 128), [128, 128, 128]);
        assert_eq!(rgb_to_yuv(200, 200, 200), [200, 128, 128]);
    }

    #[test]
    fn conversions_are_total_over_extremes() {
        for &(r, g, b) in &[(255, 0, 255), (0, 255, 255), (255, 255, 0), (1, 2, 3)] {
            rgb_to_lab(r, g, b);
            rgb_to_luv(r, g, b);
            rgb_to_ycrcb(r, g, b);
            rgb_to_yuv(r, g, b);
            rgb_to_hsv(r, g, b);
        }
    }
}
