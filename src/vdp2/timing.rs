//! Blanking edges and the collaborators they notify.

use super::compositor::FrameBuffer;
use super::registers::Resolution;

/// NTSC lines per field.
pub const LINES_PER_FIELD: u16 = 263;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankEdge {
    HBlankIn,
    HBlankOut,
    VBlankIn,
    VBlankOut,
}

impl BlankEdge {
    /// SCU interrupt vector raised by this edge, if any.
    pub fn scu_vector(self) -> Option<u8> {
        match self {
            BlankEdge::VBlankIn => Some(0x40),
            BlankEdge::VBlankOut => Some(0x41),
            BlankEdge::HBlankIn => Some(0x42),
            BlankEdge::HBlankOut => None,
        }
    }

    /// Interrupt delivered directly to the slave CPU, if any.
    pub fn slave_interrupt(self) -> Option<SlaveInterrupt> {
        match self {
            BlankEdge::VBlankIn => Some(SlaveInterrupt { level: 6, vector: 0x43 }),
            BlankEdge::HBlankIn => Some(SlaveInterrupt { level: 2, vector: 0x41 }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaveInterrupt {
    pub level: u8,
    pub vector: u8,
}

/// The interrupt controller side of the blanking edges. Delivery is
/// fire-and-forget.
pub trait InterruptSink {
    fn blank_edge(&mut self, edge: BlankEdge);

    fn slave_running(&self) -> bool {
        false
    }

    fn slave_interrupt(&mut self, _irq: SlaveInterrupt) {}
}

/// Consumer of finished frames.
pub trait FrameSink {
    fn present(&mut self, frame: &FrameBuffer);
}

/// Sink that ignores everything; for hosts without a display or SCU.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl InterruptSink for NullSink {
    fn blank_edge(&mut self, _edge: BlankEdge) {}
}

impl FrameSink for NullSink {
    fn present(&mut self, _frame: &FrameBuffer) {}
}

/// Dot/line position of the beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BeamCounter {
    pub dot: u16,
    pub line: u16,
    pub frame: u64,
}

impl BeamCounter {
    pub fn dots_per_line(resolution: Resolution) -> u16 {
        match resolution.width {
            352 | 704 => 455,
            _ => 427,
        }
    }

    /// Advance by one dot and report the edges crossed, in the order they
    /// fire. Every visible line's HBlankIn is closed by an HBlankOut at the
    /// start of the next line, including the first line of vertical blank.
    pub fn tick(&mut self, resolution: Resolution) -> &'static [BlankEdge] {
        let visible_lines = resolution.visible_lines();
        self.dot += 1;
        if self.dot == resolution.visible_dots() && self.line < visible_lines {
            return &[BlankEdge::HBlankIn];
        }
        if self.dot < Self::dots_per_line(resolution) {
            return &[];
        }

        self.dot = 0;
        self.line += 1;
        if self.line == visible_lines {
            &[BlankEdge::HBlankOut, BlankEdge::VBlankIn]
        } else if self.line >= LINES_PER_FIELD {
            self.line = 0;
            self.frame = self.frame.wrapping_add(1);
            &[BlankEdge::VBlankOut]
        } else if self.line < visible_lines {
            &[BlankEdge::HBlankOut]
        } else {
            &[]
        }
    }
}
