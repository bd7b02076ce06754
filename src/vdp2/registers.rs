use bitflags::bitflags;

/// Size of the register window in bytes (word offsets 0x000..=0x1FE).
pub const REGISTER_SPAN: u32 = 0x200;

// Register word offsets
pub const TVMD: u32 = 0x000;
pub const TVSTAT: u32 = 0x004;
pub const VRSIZE: u32 = 0x006;
pub const RAMCTL: u32 = 0x00E;
pub const BGON: u32 = 0x020;
pub const CHCTLA: u32 = 0x028;
pub const CHCTLB: u32 = 0x02A;
pub const BMPNA: u32 = 0x02C;
pub const BMPNB: u32 = 0x02E;
pub const PNCN0: u32 = 0x030;
pub const PNCN1: u32 = 0x032;
pub const PNCN2: u32 = 0x034;
pub const PNCN3: u32 = 0x036;
pub const PNCR: u32 = 0x038;
pub const PLSZ: u32 = 0x03A;
pub const MPOFN: u32 = 0x03C;
pub const MPOFR: u32 = 0x03E;
pub const MPABN0: u32 = 0x040;
pub const MPABN1: u32 = 0x044;
pub const MPABN2: u32 = 0x048;
pub const MPABN3: u32 = 0x04C;
pub const MPABRA: u32 = 0x050;
pub const MPABRB: u32 = 0x060;
pub const SCXIN0: u32 = 0x070;
pub const SCYIN0: u32 = 0x074;
pub const ZMXIN0: u32 = 0x078;
pub const ZMYIN0: u32 = 0x07C;
pub const SCXIN1: u32 = 0x080;
pub const SCYIN1: u32 = 0x084;
pub const ZMXIN1: u32 = 0x088;
pub const ZMYIN1: u32 = 0x08C;
pub const SCXN2: u32 = 0x090;
pub const SCYN2: u32 = 0x092;
pub const SCXN3: u32 = 0x094;
pub const SCYN3: u32 = 0x096;
pub const BKTAU: u32 = 0x0AC;
pub const BKTAL: u32 = 0x0AE;
pub const RPMD: u32 = 0x0B0;
pub const KTCTL: u32 = 0x0B4;
pub const RPTAU: u32 = 0x0BC;
pub const SPCTL: u32 = 0x0E0;
pub const CRAOFA: u32 = 0x0E4;
pub const CRAOFB: u32 = 0x0E6;
pub const CCCTL: u32 = 0x0EC;
pub const PRINA: u32 = 0x0F8;
pub const PRINB: u32 = 0x0FA;
pub const PRIR: u32 = 0x0FC;
pub const CCRNA: u32 = 0x108;
pub const CCRNB: u32 = 0x10A;
pub const CCRR: u32 = 0x10C;
pub const CLOFEN: u32 = 0x110;
pub const CLOFSL: u32 = 0x112;
pub const COAR: u32 = 0x114;
pub const COBR: u32 = 0x11A;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TvMode: u16 {
        const HRESO = 0b0000_0000_0000_0111;
        const VRESO = 0b0000_0000_0011_0000;
        const LSMD = 0b0000_0000_1100_0000;
        const BDCLMD = 0b0000_0001_0000_0000;
        const DISP = 0b1000_0000_0000_0000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TvStatus: u16 {
        const PAL = 0b0000_0000_0000_0001;
        const ODD = 0b0000_0000_0000_0010;
        const HBLANK = 0b0000_0000_0000_0100;
        const VBLANK = 0b0000_0000_0000_1000;
        const EXSYFG = 0b0000_0001_0000_0000;
        const EXLTFG = 0b0000_0010_0000_0000;
    }
}

bitflags! {
    /// BGON: the low five bits enable a layer, the TPON bits *disable*
    /// transparent-pixel handling for it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ScreenDisplay: u16 {
        const N0ON = 0x0001;
        const N1ON = 0x0002;
        const N2ON = 0x0004;
        const N3ON = 0x0008;
        const R0ON = 0x0010;
        const R1ON = 0x0020;
        const N0TPON = 0x0100;
        const N1TPON = 0x0200;
        const N2TPON = 0x0400;
        const N3TPON = 0x0800;
        const R0TPON = 0x1000;
    }
}

/// Side effect attached to a register word beyond storing the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterTrigger {
    /// Output width/height must be recomputed.
    Resolution,
    /// Color RAM addressing mode changed.
    ColorRamMode,
    /// Layer draw order must be re-sorted.
    PriorityResort,
}

/// Every register word whose write carries a side effect.
pub const TRIGGERS: &[(u32, RegisterTrigger)] = &[
    (TVMD, RegisterTrigger::Resolution),
    (RAMCTL, RegisterTrigger::ColorRamMode),
    (SPCTL, RegisterTrigger::PriorityResort),
    (PRINA, RegisterTrigger::PriorityResort),
    (PRINB, RegisterTrigger::PriorityResort),
    (PRIR, RegisterTrigger::PriorityResort),
];

pub fn trigger_for(offset: u32) -> Option<RegisterTrigger> {
    let word = offset & !1;
    TRIGGERS
        .iter()
        .find(|(at, _)| *at == word)
        .map(|(_, trigger)| *trigger)
}

/// The 256-word register file. Words are big-endian as seen from the
/// byte bus: byte `n` is the high half of word `n & !1`.
#[derive(Debug, Clone)]
pub struct RegisterBank {
    words: [u16; (REGISTER_SPAN / 2) as usize],
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank {
    pub fn new() -> Self {
        Self {
            words: [0; (REGISTER_SPAN / 2) as usize],
        }
    }

    fn index(offset: u32) -> usize {
        assert!(
            offset < REGISTER_SPAN,
            "VDP2 register offset {:#05X} out of range",
            offset
        );
        (offset >> 1) as usize
    }

    pub fn read_word(&self, offset: u32) -> u16 {
        assert!(offset & 1 == 0, "unaligned VDP2 register read at {:#05X}", offset);
        self.words[Self::index(offset)]
    }

    /// Stores `value` and reports the side effect the caller must apply.
    pub fn write_word(&mut self, offset: u32, value: u16) -> Option<RegisterTrigger> {
        assert!(offset & 1 == 0, "unaligned VDP2 register write at {:#05X}", offset);
        self.words[Self::index(offset)] = value;
        trigger_for(offset)
    }

    pub fn read_byte(&self, offset: u32) -> u8 {
        let word = self.words[Self::index(offset)];
        if offset & 1 == 0 {
            (word >> 8) as u8
        } else {
            word as u8
        }
    }

    pub fn write_byte(&mut self, offset: u32, value: u8) -> Option<RegisterTrigger> {
        let slot = &mut self.words[Self::index(offset)];
        *slot = if offset & 1 == 0 {
            (*slot & 0x00FF) | ((value as u16) << 8)
        } else {
            (*slot & 0xFF00) | value as u16
        };
        trigger_for(offset)
    }

    /// Two consecutive words, the first one in the high half.
    pub fn read_long(&self, offset: u32) -> u32 {
        ((self.read_word(offset) as u32) << 16) | self.read_word(offset + 2) as u32
    }

    pub fn tv_mode(&self) -> TvMode {
        TvMode::from_bits_retain(self.read_word(TVMD))
    }

    pub fn tv_status(&self) -> TvStatus {
        TvStatus::from_bits_retain(self.read_word(TVSTAT))
    }

    pub fn set_tv_status(&mut self, status: TvStatus) {
        self.words[Self::index(TVSTAT)] = status.bits();
    }

    pub fn screen_display(&self) -> ScreenDisplay {
        ScreenDisplay::from_bits_retain(self.read_word(BGON))
    }

    /// VRSIZE.VRAMSZ: character numbers keep their top bit only when set.
    pub fn extended_characters(&self) -> bool {
        self.read_word(VRSIZE) & 0x8000 != 0
    }

    pub fn color_ram_mode_bits(&self) -> u8 {
        ((self.read_word(RAMCTL) >> 12) & 3) as u8
    }
}

/// Active display area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u16,
    pub height: u16,
    pub interlaced: bool,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::from_tv_mode(TvMode::empty())
    }
}

impl Resolution {
    pub fn from_tv_mode(mode: TvMode) -> Self {
        let bits = mode.bits();
        let width = match bits & 0x7 {
            0 | 4 => 320,
            1 | 5 => 352,
            2 | 6 => 640,
            _ => 704,
        };
        // VRESO=3 is prohibited on hardware
        let base_height = match (bits >> 4) & 0x3 {
            0 => 224,
            1 => 240,
            _ => 256,
        };
        // LSMD 2/3: double-density interlace
        let interlaced = (bits >> 6) & 0x3 >= 2;
        Resolution {
            width,
            height: if interlaced { base_height * 2 } else { base_height },
            interlaced,
        }
    }

    /// Lines scanned per field before VBlank starts.
    pub fn visible_lines(&self) -> u16 {
        if self.interlaced {
            self.height / 2
        } else {
            self.height
        }
    }

    /// Visible dots per line before HBlank starts, in the beam's own units.
    pub fn visible_dots(&self) -> u16 {
        if self.width >= 640 {
            self.width / 2
        } else {
            self.width
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
