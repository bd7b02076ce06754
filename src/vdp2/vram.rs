/// 512 KiB of VDP2 video RAM (banks A0/A1/B0/B1 laid out linearly).
pub const VRAM_SIZE: usize = 0x8_0000;
const VRAM_MASK: u32 = VRAM_SIZE as u32 - 1;

/// Byte-addressable video RAM. All addresses wrap at the end of the
/// region; multi-byte accesses are big-endian.
#[derive(Debug, Clone)]
pub struct Vram {
    data: Vec<u8>,
}

impl Default for Vram {
    fn default() -> Self {
        Self::new()
    }
}

impl Vram {
    pub fn new() -> Self {
        Self {
            data: vec![0; VRAM_SIZE],
        }
    }

    #[inline]
    pub fn read_u8(&self, addr: u32) -> u8 {
        self.data[(addr & VRAM_MASK) as usize]
    }

    #[inline]
    pub fn read_u16(&self, addr: u32) -> u16 {
        ((self.read_u8(addr) as u16) << 8) | self.read_u8(addr.wrapping_add(1)) as u16
    }

    #[inline]
    pub fn read_u32(&self, addr: u32) -> u32 {
        ((self.read_u16(addr) as u32) << 16) | self.read_u16(addr.wrapping_add(2)) as u32
    }

    pub fn write_u8(&mut self, addr: u32, value: u8) {
        self.data[(addr & VRAM_MASK) as usize] = value;
    }

    pub fn write_u16(&mut self, addr: u32, value: u16) {
        self.write_u8(addr, (value >> 8) as u8);
        self.write_u8(addr.wrapping_add(1), value as u8);
    }

    pub fn write_u32(&mut self, addr: u32, value: u32) {
        self.write_u16(addr, (value >> 16) as u16);
        self.write_u16(addr.wrapping_add(2), value as u16);
    }

    /// Copy a block in, e.g. from a memory dump.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.write_u8(addr.wrapping_add(i as u32), b);
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}
