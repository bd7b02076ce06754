use super::color::{rgb555, rgb888};

/// 4 KiB of color RAM.
pub const CRAM_SIZE: usize = 0x1000;
const CRAM_MASK: u32 = CRAM_SIZE as u32 - 1;

/// RAMCTL.CRMD addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorRamMode {
    /// 1024 5:5:5 entries; writes are mirrored into the upper half.
    #[default]
    Rgb555x1024,
    /// 2048 5:5:5 entries.
    Rgb555x2048,
    /// 1024 8:8:8 entries of two words each.
    Rgb888x1024,
    /// Prohibited setting; resolves every index to 0.
    Reserved,
}

impl ColorRamMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => ColorRamMode::Rgb555x1024,
            1 => ColorRamMode::Rgb555x2048,
            2 => ColorRamMode::Rgb888x1024,
            _ => ColorRamMode::Reserved,
        }
    }

    pub fn entry_count(self) -> usize {
        match self {
            ColorRamMode::Rgb555x2048 => 2048,
            ColorRamMode::Reserved => 0,
            _ => 1024,
        }
    }
}

/// Palette storage. Mode is owned here so `resolve` always sees the mode
/// in effect at the time of the call.
#[derive(Debug, Clone)]
pub struct ColorRam {
    data: Vec<u8>,
    mode: ColorRamMode,
}

impl Default for ColorRam {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorRam {
    pub fn new() -> Self {
        Self {
            data: vec![0; CRAM_SIZE],
            mode: ColorRamMode::default(),
        }
    }

    pub fn mode(&self) -> ColorRamMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ColorRamMode) {
        if mode != self.mode {
            log::debug!("VDP2 color RAM mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    pub fn read_u8(&self, addr: u32) -> u8 {
        self.data[(addr & CRAM_MASK) as usize]
    }

    pub fn read_u16(&self, addr: u32) -> u16 {
        ((self.read_u8(addr) as u16) << 8) | self.read_u8(addr.wrapping_add(1)) as u16
    }

    pub fn write_u8(&mut self, addr: u32, value: u8) {
        self.store(addr, value);
        if self.mode == ColorRamMode::Rgb555x1024 {
            self.store(addr.wrapping_add(0x800), value);
        }
    }

    pub fn write_u16(&mut self, addr: u32, value: u16) {
        self.write_u8(addr, (value >> 8) as u8);
        self.write_u8(addr.wrapping_add(1), value as u8);
    }

    /// Copy raw bytes in without mirroring, e.g. from a memory dump.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.store(addr.wrapping_add(i as u32), b);
        }
    }

    fn store(&mut self, addr: u32, value: u8) {
        self.data[(addr & CRAM_MASK) as usize] = value;
    }

    /// Look up `index` in palette bank `bank` (the layer's color RAM
    /// address offset) and pack it with `alpha`.
    pub fn resolve(&self, index: u32, alpha: u8, bank: u8) -> u32 {
        let bank = bank as u32;
        match self.mode {
            ColorRamMode::Rgb555x1024 | ColorRamMode::Rgb555x2048 => {
                let addr = index * 2 + bank * 0x200;
                rgb555(alpha, self.read_u16(addr))
            }
            ColorRamMode::Rgb888x1024 => {
                let addr = index * 4 + bank * 0x400;
                rgb888(alpha, self.read_u16(addr), self.read_u16(addr + 2))
            }
            ColorRamMode::Reserved => 0,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Palette lookup used by layer pixel fetches.
pub trait ColorLookup {
    fn resolve(&self, index: u32, alpha: u8, bank: u8) -> u32;
}

impl ColorLookup for ColorRam {
    fn resolve(&self, index: u32, alpha: u8, bank: u8) -> u32 {
        ColorRam::resolve(self, index, alpha, bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_mode_mirrors_writes() {
        let mut cram = ColorRam::new();
        cram.write_u16(0x010, 0x7FFF);
        assert_eq!(cram.read_u16(0x810), 0x7FFF);

        cram.set_mode(ColorRamMode::Rgb555x2048);
        cram.write_u16(0x020, 0x1234);
        assert_eq!(cram.read_u16(0x020), 0x1234);
        assert_eq!(cram.read_u16(0x820), 0);
    }

    #[test]
    fn test_mode_change_switches_stride() {
        let mut cram = ColorRam::new();
        cram.set_mode(ColorRamMode::Rgb555x2048);
        cram.write_u16(0x008, 0x001F); // index 4 at stride 2
        cram.write_u16(0x010, 0x00AA); // index 4 at stride 4 (hi word)
        cram.write_u16(0x012, 0x1122); // index 4 at stride 4 (lo word)

        assert_eq!(cram.resolve(4, 0xFF, 0), 0xFF00_00F8);
        cram.set_mode(ColorRamMode::Rgb888x1024);
        assert_eq!(cram.resolve(4, 0xFF, 0), 0xFFAA_1122);
        cram.set_mode(ColorRamMode::Rgb555x2048);
        assert_eq!(cram.resolve(4, 0xFF, 0), 0xFF00_00F8);
    }

    #[test]
    fn test_bank_offset() {
        let mut cram = ColorRam::new();
        cram.set_mode(ColorRamMode::Rgb555x2048);
        cram.write_u16(0x200 * 3 + 2, 0x03E0);
        assert_eq!(cram.resolve(1, 0x40, 3), 0x4000_F800);
    }

    #[test]
    fn test_reserved_mode_resolves_to_zero() {
        let mut cram = ColorRam::new();
        cram.write_u16(0, 0x7FFF);
        cram.set_mode(ColorRamMode::from_bits(3));
        assert_eq!(cram.resolve(0, 0xFF, 0), 0);
        assert_eq!(cram.mode().entry_count(), 0);
    }
}
