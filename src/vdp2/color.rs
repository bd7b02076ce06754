//! Packed pixel helpers. Colors are `u32` with red in bits 0-7, green in
//! 8-15, blue in 16-23 and alpha in 24-31.

pub const TRANSPARENT: u32 = 0;

#[inline]
pub fn alpha(color: u32) -> u8 {
    (color >> 24) as u8
}

/// Expand a 5:5:5 word (bit 15 ignored).
#[inline]
pub fn rgb555(alpha: u8, word: u16) -> u32 {
    let w = word as u32;
    ((alpha as u32) << 24) | ((w & 0x1F) << 3) | ((w & 0x3E0) << 6) | ((w & 0x7C00) << 9)
}

/// Expand an 8:8:8 color stored as two words: blue in the low byte of
/// `hi`, green and red in `lo`.
#[inline]
pub fn rgb888(alpha: u8, hi: u16, lo: u16) -> u32 {
    ((alpha as u32) << 24) | ((hi as u32 & 0xFF) << 16) | lo as u32
}

/// Alpha derived from a 5-bit color calculation ratio.
#[inline]
pub fn ratio_to_alpha(ratio: u16) -> u8 {
    (((!ratio & 0x1F) << 3) + 7) as u8
}

/// Sign-extend a 9-bit color offset register.
#[inline]
pub fn color_offset_value(reg: u16) -> i16 {
    ((reg << 7) as i16) >> 7
}

/// Add a signed per-channel offset, saturating each channel; alpha is kept.
pub fn apply_color_offset(color: u32, offset: [i16; 3]) -> u32 {
    if offset == [0, 0, 0] {
        return color;
    }
    let mut out = color & 0xFF00_0000;
    for (i, delta) in offset.iter().enumerate() {
        let shift = i * 8;
        let channel = ((color >> shift) & 0xFF) as i16;
        let value = (channel + delta).clamp(0, 255) as u32;
        out |= value << shift;
    }
    out
}

/// Source-over composite of `src` onto an opaque `dst`.
pub fn blend_over(dst: u32, src: u32) -> u32 {
    match alpha(src) {
        0 => dst,
        0xFF => src,
        a => {
            let a = a as u32;
            let mut out = 0xFF00_0000;
            for shift in [0, 8, 16] {
                let s = (src >> shift) & 0xFF;
                let d = (dst >> shift) & 0xFF;
                out |= ((s * a + d * (255 - a)) / 255) << shift;
            }
            out
        }
    }
}
