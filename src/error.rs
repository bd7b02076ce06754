use thiserror::Error;

use crate::vdp2::layer::LayerId;

/// Hardware features that are decoded but not emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Unsupported {
    /// RPMD=2: parameter A/B switched per pixel through the coefficient table.
    #[error("rotation parameter switching by coefficient")]
    CoefficientParameterSwitch,
    /// RPMD=3: parameter A/B switched by the rotation window.
    #[error("rotation parameter switching by window")]
    WindowParameterSwitch,
    /// KTCTL coefficient table enabled for the active rotation parameter.
    #[error("rotation coefficient table")]
    CoefficientTable,
}

/// Problems found while preparing a frame; the affected layer is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VdpError {
    #[error("{layer} selects reserved color depth {bits}")]
    ReservedColorDepth { layer: LayerId, bits: u8 },
    #[error("{layer}: {feature} is not implemented")]
    Unimplemented { layer: LayerId, feature: Unsupported },
    #[error("color RAM mode 3 is reserved; palette lookups read as black")]
    ReservedColorRamMode,
}
