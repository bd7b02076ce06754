//! Saturn VDP2 background processor: register bank, VRAM and color RAM,
//! the four scroll layers and the rotation layer, and the compositor that
//! merges them with an externally rendered sprite layer.

pub mod debug_flags;
pub mod error;
pub mod vdp2;

pub use error::{Unsupported, VdpError};
pub use vdp2::compositor::{FrameBuffer, SpriteLayer};
pub use vdp2::layer::LayerId;
pub use vdp2::timing::{BlankEdge, FrameSink, InterruptSink, SlaveInterrupt};
pub use vdp2::Vdp2;
