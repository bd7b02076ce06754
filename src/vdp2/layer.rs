//! Background layers. The four scroll layers and the rotation layer share
//! one decoder; each is described by a static `LayerSpec` naming where its
//! fields live in the register bank.

use std::fmt;
use std::fmt::Write as _;

use super::color::{color_offset_value, ratio_to_alpha, rgb555, rgb888, TRANSPARENT};
use super::cram::ColorLookup;
use super::pattern::{self, PatternDataSize, PatternName, PatternNameControl};
use super::registers::*;
use super::rotation::{RotationParamMode, RotationParams};
use super::vram::Vram;
use crate::error::VdpError;

/// Page edge in pixels (64x64 cells).
pub const PAGE_PIXELS: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    Nbg0,
    Nbg1,
    Nbg2,
    Nbg3,
    Rbg0,
    Sprite,
}

impl LayerId {
    pub const ALL: [LayerId; 6] = [
        LayerId::Nbg0,
        LayerId::Nbg1,
        LayerId::Nbg2,
        LayerId::Nbg3,
        LayerId::Rbg0,
        LayerId::Sprite,
    ];

    pub const BACKGROUNDS: [LayerId; 5] = [
        LayerId::Nbg0,
        LayerId::Nbg1,
        LayerId::Nbg2,
        LayerId::Nbg3,
        LayerId::Rbg0,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> LayerId {
        assert!(index < Self::ALL.len(), "layer index {} out of range", index);
        Self::ALL[index]
    }

    /// Tie-break rank between layers of equal priority; lower draws first.
    pub fn inner_priority(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            LayerId::Nbg0 => "NBG0",
            LayerId::Nbg1 => "NBG1",
            LayerId::Nbg2 => "NBG2",
            LayerId::Nbg3 => "NBG3",
            LayerId::Rbg0 => "RBG0",
            LayerId::Sprite => "SPRITE",
        }
    }

    pub fn from_name(name: &str) -> Option<LayerId> {
        Self::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(name))
    }

    /// Register layout of a background layer. Panics for the sprite layer.
    pub fn spec(self) -> &'static LayerSpec {
        match self {
            LayerId::Nbg0 => &NBG0,
            LayerId::Nbg1 => &NBG1,
            LayerId::Nbg2 => &NBG2,
            LayerId::Nbg3 => &NBG3,
            LayerId::Rbg0 => &RBG0,
            LayerId::Sprite => panic!("the sprite layer has no VDP2 register layout"),
        }
    }

    /// CLOFEN/CLOFSL bit.
    pub fn color_offset_bit(self) -> u16 {
        match self {
            LayerId::Sprite => 1 << 6,
            other => 1 << other.index(),
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    Palette16,
    Palette256,
    Palette2048,
    Rgb32K,
    Rgb16M,
}

impl ColorDepth {
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0 => Some(ColorDepth::Palette16),
            1 => Some(ColorDepth::Palette256),
            2 => Some(ColorDepth::Palette2048),
            3 => Some(ColorDepth::Rgb32K),
            4 => Some(ColorDepth::Rgb16M),
            _ => None,
        }
    }

    pub fn bits_per_pixel(self) -> u32 {
        match self {
            ColorDepth::Palette16 => 4,
            ColorDepth::Palette256 => 8,
            ColorDepth::Palette2048 | ColorDepth::Rgb32K => 16,
            ColorDepth::Rgb16M => 32,
        }
    }

    /// Bytes in one 8x8 cell.
    pub fn cell_bytes(self) -> u32 {
        64 * self.bits_per_pixel() / 8
    }
}

/// A bit field inside one register word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub reg: u32,
    pub shift: u8,
    pub mask: u16,
}

impl Field {
    pub const fn new(reg: u32, shift: u8, mask: u16) -> Self {
        Field { reg, shift, mask }
    }

    pub fn read(&self, regs: &RegisterBank) -> u16 {
        (regs.read_word(self.reg) >> self.shift) & self.mask
    }

    pub fn is_set(&self, regs: &RegisterBank) -> bool {
        self.read(regs) != 0
    }
}

/// Where the map of planes lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapFields {
    pub plane_size: Field,
    pub map_offset: Field,
    /// First plane selector byte; plane `i` is at `+ (i ^ 1)`.
    pub plane_selectors: u32,
    /// Planes per map edge.
    pub map_wh: u8,
}

impl MapFields {
    /// Pages per plane as (width, height). The prohibited value 3 reads as 2x2.
    pub fn plane_size(&self, regs: &RegisterBank) -> (u8, u8) {
        match self.plane_size.read(regs) {
            0 => (1, 1),
            1 => (2, 1),
            _ => (2, 2),
        }
    }

    /// VRAM byte address of plane `index` of the map.
    pub fn plane_address(
        &self,
        regs: &RegisterBank,
        index: usize,
        control: PatternNameControl,
        cell_wh: u8,
    ) -> u32 {
        let (plane_w, plane_h) = self.plane_size(regs);
        let deca = (plane_w + plane_h - 2) as u32;
        let multi = (plane_w * plane_h) as u32;
        let offset = (self.map_offset.read(regs) as u32) << 6;
        let selector = regs.read_byte(self.plane_selectors + (index as u32 ^ 1)) as u32;
        let tmp = offset | selector;

        match (control.data_size, cell_wh) {
            (PatternDataSize::OneWord, 1) => ((tmp & 0x3F) >> deca) * (multi * 0x2000),
            (PatternDataSize::OneWord, _) => (tmp >> deca) * (multi * 0x800),
            (PatternDataSize::TwoWords, 1) => ((tmp & 0x1F) >> deca) * (multi * 0x4000),
            (PatternDataSize::TwoWords, _) => ((tmp & 0x7F) >> deca) * (multi * 0x1000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapFields {
    pub enable: Field,
    pub size: Field,
    /// Width and height for each value of `size`.
    pub sizes: &'static [(u16, u16)],
    pub palette: Field,
}

/// How a layer generates source coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollFields {
    /// 11.8 scroll plus 3.8 coordinate increment (NBG0/NBG1).
    Fine {
        x: u32,
        y: u32,
        zoom_x: u32,
        zoom_y: u32,
    },
    /// Integer scroll only (NBG2/NBG3).
    Integer { x: u32, y: u32 },
    /// Rotation parameter table; `map_b` is used when parameter B is active.
    Rotation { map_b: MapFields },
}

/// Static description of one background layer's registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSpec {
    pub id: LayerId,
    pub enable: ScreenDisplay,
    pub transparency_off: ScreenDisplay,
    pub depth: Field,
    pub char_size: Field,
    pub bitmap: Option<BitmapFields>,
    pub pattern_control: u32,
    pub map: MapFields,
    pub scroll: ScrollFields,
    pub priority: Field,
    pub color_calc: Field,
    pub ratio: Field,
    pub color_ram_offset: Field,
}

const NBG_BITMAP_SIZES: &[(u16, u16)] = &[(512, 256), (512, 512), (1024, 256), (1024, 512)];
const RBG_BITMAP_SIZES: &[(u16, u16)] = &[(512, 256), (512, 512)];

pub static NBG0: LayerSpec = LayerSpec {
    id: LayerId::Nbg0,
    enable: ScreenDisplay::N0ON,
    transparency_off: ScreenDisplay::N0TPON,
    depth: Field::new(CHCTLA, 4, 0x7),
    char_size: Field::new(CHCTLA, 0, 0x1),
    bitmap: Some(BitmapFields {
        enable: Field::new(CHCTLA, 1, 0x1),
        size: Field::new(CHCTLA, 2, 0x3),
        sizes: NBG_BITMAP_SIZES,
        palette: Field::new(BMPNA, 0, 0x7),
    }),
    pattern_control: PNCN0,
    map: MapFields {
        plane_size: Field::new(PLSZ, 0, 0x3),
        map_offset: Field::new(MPOFN, 0, 0x7),
        plane_selectors: MPABN0,
        map_wh: 2,
    },
    scroll: ScrollFields::Fine {
        x: SCXIN0,
        y: SCYIN0,
        zoom_x: ZMXIN0,
        zoom_y: ZMYIN0,
    },
    priority: Field::new(PRINA, 0, 0x7),
    color_calc: Field::new(CCCTL, 0, 0x1),
    ratio: Field::new(CCRNA, 0, 0x1F),
    color_ram_offset: Field::new(CRAOFA, 0, 0x7),
};

pub static NBG1: LayerSpec = LayerSpec {
    id: LayerId::Nbg1,
    enable: ScreenDisplay::N1ON,
    transparency_off: ScreenDisplay::N1TPON,
    depth: Field::new(CHCTLA, 12, 0x3),
    char_size: Field::new(CHCTLA, 8, 0x1),
    bitmap: Some(BitmapFields {
        enable: Field::new(CHCTLA, 9, 0x1),
        size: Field::new(CHCTLA, 10, 0x3),
        sizes: NBG_BITMAP_SIZES,
        palette: Field::new(BMPNA, 8, 0x7),
    }),
    pattern_control: PNCN1,
    map: MapFields {
        plane_size: Field::new(PLSZ, 2, 0x3),
        map_offset: Field::new(MPOFN, 4, 0x7),
        plane_selectors: MPABN1,
        map_wh: 2,
    },
    scroll: ScrollFields::Fine {
        x: SCXIN1,
        y: SCYIN1,
        zoom_x: ZMXIN1,
        zoom_y: ZMYIN1,
    },
    priority: Field::new(PRINA, 8, 0x7),
    color_calc: Field::new(CCCTL, 1, 0x1),
    ratio: Field::new(CCRNA, 8, 0x1F),
    color_ram_offset: Field::new(CRAOFA, 4, 0x7),
};

pub static NBG2: LayerSpec = LayerSpec {
    id: LayerId::Nbg2,
    enable: ScreenDisplay::N2ON,
    transparency_off: ScreenDisplay::N2TPON,
    depth: Field::new(CHCTLB, 1, 0x1),
    char_size: Field::new(CHCTLB, 0, 0x1),
    bitmap: None,
    pattern_control: PNCN2,
    map: MapFields {
        plane_size: Field::new(PLSZ, 4, 0x3),
        map_offset: Field::new(MPOFN, 8, 0x7),
        plane_selectors: MPABN2,
        map_wh: 2,
    },
    scroll: ScrollFields::Integer { x: SCXN2, y: SCYN2 },
    priority: Field::new(PRINB, 0, 0x7),
    color_calc: Field::new(CCCTL, 2, 0x1),
    ratio: Field::new(CCRNB, 0, 0x1F),
    color_ram_offset: Field::new(CRAOFA, 8, 0x7),
};

pub static NBG3: LayerSpec = LayerSpec {
    id: LayerId::Nbg3,
    enable: ScreenDisplay::N3ON,
    transparency_off: ScreenDisplay::N3TPON,
    depth: Field::new(CHCTLB, 5, 0x1),
    char_size: Field::new(CHCTLB, 4, 0x1),
    bitmap: None,
    pattern_control: PNCN3,
    map: MapFields {
        plane_size: Field::new(PLSZ, 6, 0x3),
        map_offset: Field::new(MPOFN, 12, 0x7),
        plane_selectors: MPABN3,
        map_wh: 2,
    },
    scroll: ScrollFields::Integer { x: SCXN3, y: SCYN3 },
    priority: Field::new(PRINB, 8, 0x7),
    color_calc: Field::new(CCCTL, 3, 0x1),
    ratio: Field::new(CCRNB, 8, 0x1F),
    color_ram_offset: Field::new(CRAOFA, 12, 0x7),
};

pub static RBG0: LayerSpec = LayerSpec {
    id: LayerId::Rbg0,
    enable: ScreenDisplay::R0ON,
    transparency_off: ScreenDisplay::R0TPON,
    depth: Field::new(CHCTLB, 12, 0x7),
    char_size: Field::new(CHCTLB, 8, 0x1),
    bitmap: Some(BitmapFields {
        enable: Field::new(CHCTLB, 9, 0x1),
        size: Field::new(CHCTLB, 10, 0x1),
        sizes: RBG_BITMAP_SIZES,
        palette: Field::new(BMPNB, 0, 0x7),
    }),
    pattern_control: PNCR,
    map: MapFields {
        plane_size: Field::new(PLSZ, 8, 0x3),
        map_offset: Field::new(MPOFR, 0, 0x7),
        plane_selectors: MPABRA,
        map_wh: 4,
    },
    scroll: ScrollFields::Rotation {
        map_b: MapFields {
            plane_size: Field::new(PLSZ, 12, 0x3),
            map_offset: Field::new(MPOFR, 4, 0x7),
            plane_selectors: MPABRB,
            map_wh: 4,
        },
    },
    priority: Field::new(PRIR, 0, 0x7),
    color_calc: Field::new(CCCTL, 4, 0x1),
    ratio: Field::new(CCRR, 0, 0x1F),
    color_ram_offset: Field::new(CRAOFB, 0, 0x7),
};

impl LayerSpec {
    pub fn is_enabled(&self, regs: &RegisterBank) -> bool {
        regs.screen_display().contains(self.enable)
    }

    pub fn priority(&self, regs: &RegisterBank) -> u8 {
        self.priority.read(regs) as u8
    }

    pub fn inner_priority(&self) -> u8 {
        self.id.inner_priority()
    }

    /// Derive this frame's configuration from the registers and VRAM.
    pub fn init(&self, regs: &RegisterBank, vram: &Vram) -> Result<LayerConfig, VdpError> {
        let depth_bits = self.depth.read(regs);
        let depth = ColorDepth::from_bits(depth_bits).ok_or(VdpError::ReservedColorDepth {
            layer: self.id,
            bits: depth_bits as u8,
        })?;

        let (map, coords) = match self.scroll {
            ScrollFields::Fine { x, y, zoom_x, zoom_y } => {
                let coords = Coords::Scroll {
                    x: fine_scroll(regs, x),
                    y: fine_scroll(regs, y),
                    inc_x: coordinate_increment(regs, zoom_x),
                    inc_y: coordinate_increment(regs, zoom_y),
                };
                (self.map, coords)
            }
            ScrollFields::Integer { x, y } => {
                let coords = Coords::Scroll {
                    x: (regs.read_word(x) & 0x7FF) as f32,
                    y: (regs.read_word(y) & 0x7FF) as f32,
                    inc_x: 1.0,
                    inc_y: 1.0,
                };
                (self.map, coords)
            }
            ScrollFields::Rotation { map_b } => {
                let mode = RotationParamMode::read(regs);
                mode.check_supported(regs)
                    .map_err(|feature| VdpError::Unimplemented { layer: self.id, feature })?;
                let params = RotationParams::read(vram, mode.table_address(regs));
                let map = if mode == RotationParamMode::TableB { map_b } else { self.map };
                (map, Coords::Rotation(params))
            }
        };

        let bitmap = self
            .bitmap
            .filter(|fields| fields.enable.is_set(regs))
            .map(|fields| {
                let (width, height) = fields.sizes[fields.size.read(regs) as usize];
                BitmapConfig {
                    width: width as u32,
                    height: height as u32,
                    address: map.map_offset.read(regs) as u32 * 0x2_0000,
                    palette: fields.palette.read(regs) << 8,
                }
            });

        let source = match bitmap {
            Some(bitmap) => Source::Bitmap(bitmap),
            None => {
                let control = PatternNameControl::from_register(regs.read_word(self.pattern_control));
                let cell_wh = if self.char_size.is_set(regs) { 2 } else { 1 };
                let (plane_w, plane_h) = map.plane_size(regs);
                let planes = (map.map_wh as usize).pow(2);
                Source::Tiles(TileConfig {
                    control,
                    cell_wh,
                    plane_w,
                    plane_h,
                    map_wh: map.map_wh,
                    plane_addresses: (0..planes)
                        .map(|i| map.plane_address(regs, i, control, cell_wh))
                        .collect(),
                    extended_characters: regs.extended_characters(),
                })
            }
        };

        let alpha = if self.color_calc.is_set(regs) {
            ratio_to_alpha(self.ratio.read(regs))
        } else {
            0xFF
        };

        Ok(LayerConfig {
            id: self.id,
            enabled: self.is_enabled(regs),
            transparency: !regs.screen_display().contains(self.transparency_off),
            depth,
            source,
            coords,
            alpha,
            color_ram_bank: self.color_ram_offset.read(regs) as u8,
            color_offset: color_offset(regs, self.id),
            priority: self.priority(regs),
            inner_priority: self.inner_priority(),
        })
    }
}

// 11-bit integer part plus the upper byte of the fraction word
fn fine_scroll(regs: &RegisterBank, offset: u32) -> f32 {
    let int = (regs.read_word(offset) & 0x7FF) as f32;
    let frac = (regs.read_word(offset + 2) >> 8) as f32 / 256.0;
    int + frac
}

// 3.8 fixed point; zero would collapse the layer so it means 1.0
fn coordinate_increment(regs: &RegisterBank, offset: u32) -> f32 {
    let raw = regs.read_long(offset) & 0x7_FF00;
    if raw == 0 {
        1.0
    } else {
        raw as f32 / 65536.0
    }
}

/// CLOFEN/CLOFSL-selected color offset for `layer`, or zeros when disabled.
pub fn color_offset(regs: &RegisterBank, layer: LayerId) -> [i16; 3] {
    let bit = layer.color_offset_bit();
    if regs.read_word(CLOFEN) & bit == 0 {
        return [0; 3];
    }
    let base = if regs.read_word(CLOFSL) & bit != 0 { COBR } else { COAR };
    [0, 2, 4].map(|i| color_offset_value(regs.read_word(base + i)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coords {
    Scroll { x: f32, y: f32, inc_x: f32, inc_y: f32 },
    Rotation(RotationParams),
}

impl Coords {
    pub fn source(&self, h: u32, v: u32) -> (i32, i32) {
        match self {
            Coords::Scroll { x, y, inc_x, inc_y } => (
                (x + h as f32 * inc_x).floor() as i32,
                (y + v as f32 * inc_y).floor() as i32,
            ),
            Coords::Rotation(params) => params.transform(h, v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapConfig {
    pub width: u32,
    pub height: u32,
    pub address: u32,
    /// Palette number already shifted into index position.
    pub palette: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileConfig {
    pub control: PatternNameControl,
    /// Cells per pattern edge (1 or 2).
    pub cell_wh: u8,
    pub plane_w: u8,
    pub plane_h: u8,
    pub map_wh: u8,
    pub plane_addresses: Vec<u32>,
    pub extended_characters: bool,
}

impl TileConfig {
    /// Patterns per page edge.
    pub fn page_wh(&self) -> u32 {
        64 / self.cell_wh as u32
    }

    pub fn pattern_pixels(&self) -> u32 {
        8 * self.cell_wh as u32
    }

    pub fn page_bytes(&self) -> u32 {
        self.page_wh() * self.page_wh() * self.control.data_size.bytes()
    }

    pub fn map_pixels(&self) -> (u32, u32) {
        let planes = self.map_wh as u32;
        (
            planes * self.plane_w as u32 * PAGE_PIXELS,
            planes * self.plane_h as u32 * PAGE_PIXELS,
        )
    }

    /// Address of the pattern name covering map pixel (`x`, `y`), plus the
    /// pixel's position inside that pattern.
    fn locate(&self, x: u32, y: u32) -> (u32, u32, u32) {
        let plane_px_w = self.plane_w as u32 * PAGE_PIXELS;
        let plane_px_h = self.plane_h as u32 * PAGE_PIXELS;
        let plane = (y / plane_px_h) * self.map_wh as u32 + x / plane_px_w;

        let (px, py) = (x % plane_px_w, y % plane_px_h);
        let page = (py / PAGE_PIXELS) * self.plane_w as u32 + px / PAGE_PIXELS;
        let page_base = self.plane_addresses[plane as usize] + page * self.page_bytes();

        let (qx, qy) = (px % PAGE_PIXELS, py % PAGE_PIXELS);
        let size = self.pattern_pixels();
        let pattern = (qy / size) * self.page_wh() + qx / size;
        let name_addr = page_base + pattern * self.control.data_size.bytes();
        (name_addr, qx % size, qy % size)
    }

    pub fn pattern_name(&self, vram: &Vram, addr: u32, depth: ColorDepth) -> PatternName {
        let first = vram.read_u16(addr);
        let second = match self.control.data_size {
            PatternDataSize::TwoWords => vram.read_u16(addr + 2),
            PatternDataSize::OneWord => 0,
        };
        pattern::decode(
            first,
            second,
            self.control,
            self.cell_wh,
            depth == ColorDepth::Palette16,
            self.extended_characters,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Bitmap(BitmapConfig),
    Tiles(TileConfig),
}

/// One layer's state for the frame being drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    pub id: LayerId,
    pub enabled: bool,
    pub transparency: bool,
    pub depth: ColorDepth,
    pub source: Source,
    pub coords: Coords,
    pub alpha: u8,
    pub color_ram_bank: u8,
    pub color_offset: [i16; 3],
    pub priority: u8,
    pub inner_priority: u8,
}

impl LayerConfig {
    /// Color of screen pixel (`h`, `v`), before the color offset.
    /// Transparent pixels come back with alpha 0.
    pub fn sample<C: ColorLookup>(&self, vram: &Vram, colors: &C, h: u32, v: u32) -> u32 {
        let (sx, sy) = self.coords.source(h, v);
        match &self.source {
            Source::Bitmap(bitmap) => {
                let x = sx.rem_euclid(bitmap.width as i32) as u32;
                let y = sy.rem_euclid(bitmap.height as i32) as u32;
                self.fetch_dot(vram, colors, bitmap.address, y * bitmap.width + x, bitmap.palette)
            }
            Source::Tiles(tiles) => {
                let (map_w, map_h) = tiles.map_pixels();
                let x = sx.rem_euclid(map_w as i32) as u32;
                let y = sy.rem_euclid(map_h as i32) as u32;
                let (name_addr, mut lx, mut ly) = tiles.locate(x, y);
                let name = tiles.pattern_name(vram, name_addr, self.depth);

                let size = tiles.pattern_pixels();
                if name.h_flip {
                    lx = size - 1 - lx;
                }
                if name.v_flip {
                    ly = size - 1 - ly;
                }
                let cell = (ly / 8) * tiles.cell_wh as u32 + lx / 8;
                let base = name.character + cell * self.depth.cell_bytes();
                self.fetch_dot(vram, colors, base, (ly % 8) * 8 + lx % 8, name.palette << 4)
            }
        }
    }

    /// Decode dot `index` of the pixel run starting at `base`.
    /// `palette` is already shifted into index position.
    pub fn fetch_dot<C: ColorLookup>(
        &self,
        vram: &Vram,
        colors: &C,
        base: u32,
        index: u32,
        palette: u16,
    ) -> u32 {
        let palette = palette as u32;
        match self.depth {
            ColorDepth::Palette16 => {
                let word = vram.read_u16(base + (index / 4) * 2);
                let dot = (word >> (12 - 4 * (index % 4))) as u32 & 0xF;
                if dot == 0 && self.transparency {
                    return TRANSPARENT;
                }
                colors.resolve(palette | dot, self.alpha, self.color_ram_bank)
            }
            ColorDepth::Palette256 => {
                let word = vram.read_u16(base + (index / 2) * 2);
                let dot = (if index % 2 == 0 { word >> 8 } else { word & 0xFF }) as u32;
                if dot == 0 && self.transparency {
                    return TRANSPARENT;
                }
                colors.resolve(palette | dot, self.alpha, self.color_ram_bank)
            }
            ColorDepth::Palette2048 => {
                let dot = vram.read_u16(base + index * 2) as u32;
                if dot == 0 && self.transparency {
                    return TRANSPARENT;
                }
                colors.resolve(dot & 0x7FF, self.alpha, self.color_ram_bank)
            }
            ColorDepth::Rgb32K => {
                let dot = vram.read_u16(base + index * 2);
                if dot & 0x8000 == 0 && self.transparency {
                    return TRANSPARENT;
                }
                rgb555(0xFF, dot)
            }
            ColorDepth::Rgb16M => {
                let hi = vram.read_u16(base + index * 4);
                let lo = vram.read_u16(base + index * 4 + 2);
                if hi & 0x8000 == 0 && self.transparency {
                    return TRANSPARENT;
                }
                rgb888(self.alpha, hi, lo)
            }
        }
    }

    /// Multi-line description of the configuration for debugger views.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {:?}", self.id, self.depth);
        match &self.source {
            Source::Bitmap(bitmap) => {
                let _ = writeln!(out, "Bitmap {}x{}", bitmap.width, bitmap.height);
                let _ = writeln!(out, "Bitmap address: {:#07X}", bitmap.address);
                let _ = writeln!(out, "Bitmap palette: {:#05X}", bitmap.palette);
            }
            Source::Tiles(tiles) => {
                let _ = writeln!(out, "Tile {0}x{0} cells", tiles.cell_wh);
                let _ = writeln!(
                    out,
                    "Pattern name {} word(s), aux mode {}, supplement {:#05X}",
                    tiles.control.data_size.bytes() / 2,
                    tiles.control.aux_mode,
                    tiles.control.supplement
                );
                let _ = writeln!(out, "Plane size {}x{} pages", tiles.plane_w, tiles.plane_h);
                for (i, addr) in tiles.plane_addresses.iter().enumerate() {
                    let _ = writeln!(out, "Plane {:X} address: {:#07X}", i, addr);
                }
            }
        }
        match &self.coords {
            Coords::Scroll { x, y, inc_x, inc_y } => {
                let _ = writeln!(out, "Scroll: {:.2}, {:.2}", x, y);
                if (*inc_x, *inc_y) != (1.0, 1.0) {
                    let _ = writeln!(out, "Coordinate increment: {:.4}, {:.4}", inc_x, inc_y);
                }
            }
            Coords::Rotation(p) => {
                let _ = writeln!(out, "Start: {:.2}, {:.2}, {:.2}", p.xst, p.yst, p.zst);
                let _ = writeln!(
                    out,
                    "Matrix: [{:.4} {:.4} {:.4}] [{:.4} {:.4} {:.4}]",
                    p.a, p.b, p.c, p.d, p.e, p.f
                );
                let _ = writeln!(out, "Scale: {:.4}, {:.4}", p.kx, p.ky);
            }
        }
        if !self.transparency {
            let _ = writeln!(out, "Transparency disabled");
        }
        if self.alpha != 0xFF {
            let _ = writeln!(out, "Alpha: {:#04X}", self.alpha);
        }
        if self.color_offset != [0; 3] {
            let [r, g, b] = self.color_offset;
            let _ = writeln!(out, "Color offset: {}, {}, {}", r, g, b);
        }
        let _ = writeln!(out, "Color RAM offset: {:#05X}", (self.color_ram_bank as u32) << 8);
        let _ = write!(out, "Priority: {}", self.priority);
        out
    }
}
