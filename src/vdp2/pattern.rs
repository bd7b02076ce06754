//! Pattern name decoding: the one- or two-word map entries that point a
//! pattern at its character data, palette and flip state.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternDataSize {
    OneWord,
    TwoWords,
}

impl PatternDataSize {
    pub fn bytes(self) -> u32 {
        match self {
            PatternDataSize::OneWord => 2,
            PatternDataSize::TwoWords => 4,
        }
    }
}

/// Decoded PNCNx / PNCR register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternNameControl {
    pub data_size: PatternDataSize,
    /// 0: 10-bit character number with flip bits, 1: 12-bit character number.
    pub aux_mode: u8,
    /// Bits merged into one-word names (supplementary character/palette
    /// number and the special function bits).
    pub supplement: u16,
}

impl PatternNameControl {
    pub fn from_register(word: u16) -> Self {
        PatternNameControl {
            data_size: if word & 0x8000 != 0 {
                PatternDataSize::OneWord
            } else {
                PatternDataSize::TwoWords
            },
            aux_mode: ((word >> 14) & 1) as u8,
            supplement: word & 0x3FF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternName {
    /// Byte address of the first cell in VRAM.
    pub character: u32,
    /// Palette number; combined as `palette << 4 | dot` for paletted depths.
    pub palette: u16,
    pub h_flip: bool,
    pub v_flip: bool,
    /// Special priority (bit 1) and special color calculation (bit 0).
    /// Decoded but not consumed by the compositor.
    pub special: u8,
}

/// Decode one map entry. `second` is ignored for one-word names.
/// `cell_wh` is the character size in cells (1 or 2).
pub fn decode(
    first: u16,
    second: u16,
    ctl: PatternNameControl,
    cell_wh: u8,
    sixteen_colors: bool,
    extended_characters: bool,
) -> PatternName {
    let supp = ctl.supplement as u32;
    let tmp = first as u32;

    let (mut character, palette, flip, special) = match ctl.data_size {
        PatternDataSize::TwoWords => {
            let character = second as u32 & 0x7FFF;
            let flip = (tmp & 0xC000) >> 14;
            let palette = (tmp & 0x7F) as u16;
            let special = ((tmp & 0x3000) >> 12) as u8;
            (character, palette, flip, special)
        }
        PatternDataSize::OneWord => {
            let palette = if sixteen_colors {
                (((tmp & 0xF000) >> 12) | ((supp & 0xE0) >> 1)) as u16
            } else {
                ((tmp & 0x7000) >> 8) as u16
            };
            let special = ((supp & 0x300) >> 8) as u8;
            let (character, flip) = match (ctl.aux_mode, cell_wh) {
                (0, 1) => ((tmp & 0x3FF) | ((supp & 0x1F) << 10), (tmp & 0xC00) >> 10),
                (0, _) => (
                    ((tmp & 0x3FF) << 2) | (supp & 0x3) | ((supp & 0x1C) << 10),
                    (tmp & 0xC00) >> 10,
                ),
                (_, 1) => ((tmp & 0xFFF) | ((supp & 0x1C) << 10), 0),
                (_, _) => (
                    ((tmp & 0xFFF) << 2) | (supp & 0x3) | ((supp & 0x10) << 10),
                    0,
                ),
            };
            (character, palette, flip, special)
        }
    };

    if !extended_characters {
        character &= 0x3FFF;
    }

    PatternName {
        character: character * 0x20,
        palette,
        h_flip: flip & 1 != 0,
        v_flip: flip & 2 != 0,
        special,
    }
}
