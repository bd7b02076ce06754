pub mod color;
pub mod compositor;
pub mod cram;
pub mod layer;
pub mod pattern;
pub mod registers;
pub mod rotation;
pub mod timing;
pub mod vram;

#[cfg(test)]
mod tests;

use crate::debug_flags;
use crate::error::VdpError;
use compositor::{draw_back_screen, Compositor, FrameBuffer, Scene, SpriteLayer};
use cram::{ColorRam, ColorRamMode};
use layer::{LayerConfig, LayerId};
use registers::{
    RegisterBank, RegisterTrigger, Resolution, TvMode, TvStatus, BGON, RAMCTL, TVMD, TVSTAT,
    VRSIZE,
};
use timing::{BeamCounter, BlankEdge, FrameSink, InterruptSink};
use vram::Vram;

/// The VDP2: register bank, video and color memory, background layers and
/// the frame they composite into.
pub struct Vdp2 {
    regs: RegisterBank,
    vram: Vram,
    cram: ColorRam,
    compositor: Compositor,
    frame: FrameBuffer,
    resolution: Resolution,
    beam: BeamCounter,
    // Debug toggles, indexed by LayerId::index
    display_toggle: [bool; 5],
    sprite_priority: u8,
    frame_issues: Vec<VdpError>,
    frames_drawn: u64,
}

impl Default for Vdp2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Vdp2 {
    pub fn new() -> Self {
        let resolution = Resolution::default();
        let mut vdp2 = Vdp2 {
            regs: RegisterBank::new(),
            vram: Vram::new(),
            cram: ColorRam::new(),
            compositor: Compositor::new(),
            frame: FrameBuffer::new(resolution),
            resolution,
            beam: BeamCounter::default(),
            display_toggle: [true; 5],
            sprite_priority: 0,
            frame_issues: Vec::new(),
            frames_drawn: 0,
        };
        vdp2.reset();
        vdp2
    }

    /// Clear the display mode, status, VRAM size, RAM control and layer
    /// enable registers. Memories and other registers keep their contents.
    pub fn reset(&mut self) {
        for offset in [TVMD, TVSTAT, VRSIZE, RAMCTL, BGON] {
            self.write_register(offset, 0);
        }
        self.beam = BeamCounter::default();
    }

    pub fn read_register(&self, offset: u32) -> u16 {
        self.regs.read_word(offset)
    }

    pub fn read_register_byte(&self, offset: u32) -> u8 {
        self.regs.read_byte(offset)
    }

    pub fn write_register(&mut self, offset: u32, value: u16) {
        if debug_flags::trace_registers() {
            log::trace!("VDP2 reg[{:#05X}] <- {:#06X}", offset, value);
        }
        if let Some(trigger) = self.regs.write_word(offset, value) {
            self.apply_trigger(trigger);
        }
    }

    pub fn write_register_byte(&mut self, offset: u32, value: u8) {
        if debug_flags::trace_registers() {
            log::trace!("VDP2 reg[{:#05X}].b <- {:#04X}", offset, value);
        }
        if let Some(trigger) = self.regs.write_byte(offset, value) {
            self.apply_trigger(trigger);
        }
    }

    fn apply_trigger(&mut self, trigger: RegisterTrigger) {
        match trigger {
            RegisterTrigger::Resolution => {
                let resolution = Resolution::from_tv_mode(self.regs.tv_mode());
                if resolution != self.resolution {
                    log::debug!(
                        "VDP2 resolution {}x{} -> {}x{}{}",
                        self.resolution.width,
                        self.resolution.height,
                        resolution.width,
                        resolution.height,
                        if resolution.interlaced { " (interlaced)" } else { "" }
                    );
                }
                self.resolution = resolution;
            }
            RegisterTrigger::ColorRamMode => {
                self.cram
                    .set_mode(ColorRamMode::from_bits(self.regs.color_ram_mode_bits()));
            }
            RegisterTrigger::PriorityResort => {
                self.compositor.resort(self.priorities());
            }
        }
    }

    /// Priority of every drawable layer, indexed by `LayerId::index`.
    fn priorities(&self) -> [u8; 6] {
        let mut keys = [0; 6];
        for id in LayerId::BACKGROUNDS {
            keys[id.index()] = id.spec().priority(&self.regs);
        }
        keys[LayerId::Sprite.index()] = self.sprite_priority;
        keys
    }

    pub fn registers(&self) -> &RegisterBank {
        &self.regs
    }

    pub fn vram(&self) -> &Vram {
        &self.vram
    }

    pub fn vram_mut(&mut self) -> &mut Vram {
        &mut self.vram
    }

    pub fn cram(&self) -> &ColorRam {
        &self.cram
    }

    pub fn cram_mut(&mut self) -> &mut ColorRam {
        &mut self.cram
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn status(&self) -> TvStatus {
        self.regs.tv_status()
    }

    pub fn beam(&self) -> BeamCounter {
        self.beam
    }

    /// The last composited frame.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Current back-to-front order of the six drawable layers.
    pub fn draw_order(&self) -> [LayerId; 6] {
        self.compositor.order()
    }

    /// Problems that kept layers out of the last frame.
    pub fn frame_issues(&self) -> &[VdpError] {
        &self.frame_issues
    }

    /// Derive a background layer's configuration from the current state.
    pub fn layer_config(&self, id: LayerId) -> Result<LayerConfig, VdpError> {
        id.spec().init(&self.regs, &self.vram)
    }

    /// Human-readable state of a background layer, or `None` while it is
    /// disabled.
    pub fn describe_layer(&self, id: LayerId) -> Option<String> {
        if id == LayerId::Sprite || !id.spec().is_enabled(&self.regs) {
            return None;
        }
        Some(match self.layer_config(id) {
            Ok(config) => config.describe(),
            Err(e) => format!("{}: {}", id, e),
        })
    }

    /// Flip a background's debug visibility and return the new state.
    pub fn toggle_layer_display(&mut self, id: LayerId) -> bool {
        assert!(id != LayerId::Sprite, "the sprite layer has no display toggle");
        let shown = &mut self.display_toggle[id.index()];
        *shown = !*shown;
        *shown
    }

    /// Clear the frame and, when the display is on, draw the back screen and
    /// every visible layer back to front. Returns the layers drawn, in order.
    pub fn draw_frame(&mut self, sprite: Option<&dyn SpriteLayer>) -> Vec<LayerId> {
        self.frames_drawn += 1;
        self.frame.reset(self.resolution);

        let display_on =
            self.regs.tv_mode().contains(TvMode::DISP) || debug_flags::force_display();
        if !display_on {
            self.frame_issues.clear();
            return Vec::new();
        }
        draw_back_screen(&mut self.frame, &self.regs, &self.vram);

        let mut layers = Vec::with_capacity(5);
        let mut issues = Vec::new();
        if self.cram.mode() == ColorRamMode::Reserved {
            issues.push(VdpError::ReservedColorRamMode);
        }
        for id in LayerId::BACKGROUNDS {
            let spec = id.spec();
            if !spec.is_enabled(&self.regs) || !self.display_toggle[id.index()] {
                continue;
            }
            match spec.init(&self.regs, &self.vram) {
                Ok(config) => {
                    if debug_flags::dump_layers() {
                        log::debug!("{}", config.describe());
                    }
                    layers.push(config);
                }
                Err(e) => issues.push(e),
            }
        }
        for issue in &issues {
            if !self.frame_issues.contains(issue) {
                log::warn!("VDP2: {}", issue);
            }
        }
        self.frame_issues = issues;

        self.sprite_priority = sprite.map_or(0, |s| s.priority());
        let scene = Scene {
            vram: &self.vram,
            colors: &self.cram,
            priorities: self.priorities(),
            layers: &layers,
            sprite,
            sprite_offset: layer::color_offset(&self.regs, LayerId::Sprite),
            hidden: debug_flags::hidden_layers(),
        };
        self.compositor.draw(&mut self.frame, &scene)
    }

    pub fn h_blank_in(&mut self, irq: &mut dyn InterruptSink) {
        self.update_status(TvStatus::HBLANK, true);
        notify(BlankEdge::HBlankIn, irq);
    }

    pub fn h_blank_out(&mut self, irq: &mut dyn InterruptSink) {
        self.update_status(TvStatus::HBLANK, false);
        notify(BlankEdge::HBlankOut, irq);
    }

    pub fn v_blank_in(&mut self, irq: &mut dyn InterruptSink) {
        self.update_status(TvStatus::VBLANK, true);
        notify(BlankEdge::VBlankIn, irq);
    }

    /// End of vertical blank: the one place a frame is produced.
    pub fn v_blank_out(
        &mut self,
        sprite: Option<&dyn SpriteLayer>,
        irq: &mut dyn InterruptSink,
        sink: &mut dyn FrameSink,
    ) {
        self.update_status(TvStatus::VBLANK, false);
        self.update_status(TvStatus::ODD, true);
        self.draw_frame(sprite);
        sink.present(&self.frame);
        notify(BlankEdge::VBlankOut, irq);
    }

    /// Advance the beam by `dots` and fire each blanking edge it crosses.
    pub fn step(
        &mut self,
        dots: u32,
        sprite: Option<&dyn SpriteLayer>,
        irq: &mut dyn InterruptSink,
        sink: &mut dyn FrameSink,
    ) {
        for _ in 0..dots {
            for &edge in self.beam.tick(self.resolution) {
                match edge {
                    BlankEdge::HBlankIn => self.h_blank_in(irq),
                    BlankEdge::HBlankOut => self.h_blank_out(irq),
                    BlankEdge::VBlankIn => self.v_blank_in(irq),
                    BlankEdge::VBlankOut => self.v_blank_out(sprite, irq, sink),
                }
            }
        }
    }

    fn update_status(&mut self, bit: TvStatus, on: bool) {
        let mut status = self.regs.tv_status();
        status.set(bit, on);
        self.regs.set_tv_status(status);
    }
}

fn notify(edge: BlankEdge, irq: &mut dyn InterruptSink) {
    irq.blank_edge(edge);
    if let Some(slave) = edge.slave_interrupt() {
        if irq.slave_running() {
            irq.slave_interrupt(slave);
        }
    }
}
