use super::color::{apply_color_offset, blend_over, rgb555};
use super::cram::ColorLookup;
use super::layer::{LayerConfig, LayerId};
use super::registers::{RegisterBank, Resolution, BKTAL, BKTAU};
use super::vram::Vram;

const CLEAR_COLOR: u32 = 0xFF00_0000;

/// Packed-RGBA frame at the current display resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(resolution: Resolution) -> Self {
        FrameBuffer {
            width: resolution.width,
            height: resolution.height,
            pixels: vec![CLEAR_COLOR; resolution.pixel_count()],
        }
    }

    /// Match `resolution` and fill with opaque black.
    pub fn reset(&mut self, resolution: Resolution) {
        self.width = resolution.width;
        self.height = resolution.height;
        self.pixels.clear();
        self.pixels.resize(resolution.pixel_count(), CLEAR_COLOR);
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn pixel(&self, x: u16, y: u16) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn row_mut(&mut self, y: u16) -> &mut [u32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &mut self.pixels[start..start + w]
    }

    /// Bytes in R, G, B, A order.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_le_bytes()).collect()
    }
}

/// Pre-rendered sprite plane supplied by the sprite processor.
pub trait SpriteLayer {
    fn priority(&self) -> u8;
    /// Packed color of pixel (`x`, `y`); alpha 0 is transparent.
    fn pixel(&self, x: u32, y: u32) -> u32;
}

/// Everything one frame's composition reads.
pub struct Scene<'a, C: ColorLookup> {
    pub vram: &'a Vram,
    pub colors: &'a C,
    /// Per-layer priority, indexed by `LayerId::index`.
    pub priorities: [u8; 6],
    /// Configurations of the background layers that can be drawn this frame.
    pub layers: &'a [LayerConfig],
    pub sprite: Option<&'a dyn SpriteLayer>,
    pub sprite_offset: [i16; 3],
    pub hidden: &'a [LayerId],
}

/// Sort the six drawable layers by (priority, inner rank).
pub fn sort_layers(priorities: [u8; 6]) -> [LayerId; 6] {
    let mut order = LayerId::ALL;
    order.sort_by_key(|id| (priorities[id.index()], id.inner_priority()));
    order
}

/// Back-to-front layer merge. The draw order is cached and only re-sorted
/// when priorities change.
#[derive(Debug, Clone)]
pub struct Compositor {
    order: [LayerId; 6],
    keys: [u8; 6],
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Compositor {
            order: sort_layers([0; 6]),
            keys: [0; 6],
        }
    }

    pub fn resort(&mut self, priorities: [u8; 6]) {
        self.keys = priorities;
        self.order = sort_layers(priorities);
    }

    pub fn order(&self) -> [LayerId; 6] {
        self.order
    }

    /// Draw every visible layer into `target` and return them in the order
    /// they were drawn.
    pub fn draw<C: ColorLookup>(
        &mut self,
        target: &mut FrameBuffer,
        scene: &Scene<'_, C>,
    ) -> Vec<LayerId> {
        if scene.priorities != self.keys {
            self.resort(scene.priorities);
        }

        let mut drawn = Vec::with_capacity(6);
        for id in self.order {
            if scene.priorities[id.index()] == 0 || scene.hidden.contains(&id) {
                continue;
            }
            if id == LayerId::Sprite {
                if let Some(sprite) = scene.sprite {
                    draw_sprite(target, sprite, scene.sprite_offset);
                    drawn.push(id);
                }
            } else if let Some(layer) = scene.layers.iter().find(|l| l.id == id && l.enabled) {
                draw_background(target, layer, scene.vram, scene.colors);
                drawn.push(id);
            }
        }
        drawn
    }
}

fn draw_background<C: ColorLookup>(
    target: &mut FrameBuffer,
    layer: &LayerConfig,
    vram: &Vram,
    colors: &C,
) {
    for y in 0..target.height() {
        for (x, dst) in target.row_mut(y).iter_mut().enumerate() {
            let src = layer.sample(vram, colors, x as u32, y as u32);
            *dst = blend_over(*dst, apply_color_offset(src, layer.color_offset));
        }
    }
}

fn draw_sprite(target: &mut FrameBuffer, sprite: &dyn SpriteLayer, offset: [i16; 3]) {
    for y in 0..target.height() {
        for (x, dst) in target.row_mut(y).iter_mut().enumerate() {
            let src = sprite.pixel(x as u32, y as u32);
            *dst = blend_over(*dst, apply_color_offset(src, offset));
        }
    }
}

/// Fill the frame with the back screen color (one color, or one per line
/// when BKTAU bit 15 is set).
pub fn draw_back_screen(target: &mut FrameBuffer, regs: &RegisterBank, vram: &Vram) {
    let upper = regs.read_word(BKTAU);
    let bank_mask = if regs.extended_characters() { 7 } else { 3 };
    let addr = ((((upper & bank_mask) as u32) << 16) | regs.read_word(BKTAL) as u32) * 2;
    let per_line = upper & 0x8000 != 0;

    for y in 0..target.height() {
        let line_addr = if per_line { addr + y as u32 * 2 } else { addr };
        let color = rgb555(0xFF, vram.read_u16(line_addr));
        target.row_mut(y).fill(color);
    }
}
