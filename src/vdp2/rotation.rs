//! Rotation parameter tables and the per-pixel affine transform of RBG0.

use super::registers::{RegisterBank, KTCTL, RPMD, RPTAU};
use super::vram::Vram;
use crate::error::Unsupported;

/// RPMD: which parameter table drives RBG0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationParamMode {
    TableA,
    TableB,
    /// Switch A/B per pixel from the coefficient table. Not emulated.
    CoefficientSwitch,
    /// Switch A/B with the rotation parameter window. Not emulated.
    WindowSwitch,
}

impl RotationParamMode {
    pub fn from_register(rpmd: u16) -> Self {
        match rpmd & 3 {
            0 => RotationParamMode::TableA,
            1 => RotationParamMode::TableB,
            2 => RotationParamMode::CoefficientSwitch,
            _ => RotationParamMode::WindowSwitch,
        }
    }

    pub fn read(regs: &RegisterBank) -> Self {
        Self::from_register(regs.read_word(RPMD))
    }

    /// Reject modes that would need per-pixel parameter selection or
    /// coefficient data.
    pub fn check_supported(self, regs: &RegisterBank) -> Result<(), Unsupported> {
        let ktctl = regs.read_word(KTCTL);
        match self {
            RotationParamMode::CoefficientSwitch => Err(Unsupported::CoefficientParameterSwitch),
            RotationParamMode::WindowSwitch => Err(Unsupported::WindowParameterSwitch),
            RotationParamMode::TableA if ktctl & 0x0001 != 0 => Err(Unsupported::CoefficientTable),
            RotationParamMode::TableB if ktctl & 0x0100 != 0 => Err(Unsupported::CoefficientTable),
            _ => Ok(()),
        }
    }

    /// VRAM byte address of the parameter table (RPTA is a word address).
    pub fn table_address(self, regs: &RegisterBank) -> u32 {
        let base = regs.read_long(RPTAU) << 1;
        match self {
            RotationParamMode::TableB => (base & 0x000F_FFFC) | 0x80,
            _ => base & 0x000F_FF7C,
        }
    }
}

/// One rotation parameter table, converted to floating point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationParams {
    pub xst: f32,
    pub yst: f32,
    pub zst: f32,
    pub dxst: f32,
    pub dyst: f32,
    pub dx: f32,
    pub dy: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
    pub px: f32,
    pub py: f32,
    pub pz: f32,
    pub cx: f32,
    pub cy: f32,
    pub cz: f32,
    pub mx: f32,
    pub my: f32,
    pub kx: f32,
    pub ky: f32,
}

// Signed fixed point with 16 fractional bits; `sign` is the field's top bit.
fn fixed(raw: u32, mask: u32, sign: u32) -> f32 {
    let mut value = raw & mask;
    if value & sign != 0 {
        value |= !(sign.wrapping_shl(1).wrapping_sub(1));
    }
    value as i32 as f32 / 65536.0
}

// 14-bit signed integer coordinate
fn coord14(raw: u16) -> f32 {
    (((raw << 2) as i16) >> 2) as f32
}

impl RotationParams {
    pub fn read(vram: &Vram, addr: u32) -> Self {
        let long = |off: u32| vram.read_u32(addr + off);
        let word = |off: u32| vram.read_u16(addr + off);
        let start = |off| fixed(long(off), 0x1FFF_FFC0, 0x1000_0000);
        let delta = |off| fixed(long(off), 0x0007_FFC0, 0x0004_0000);
        let coeff = |off| fixed(long(off), 0x000F_FFC0, 0x0008_0000);

        RotationParams {
            xst: start(0x00),
            yst: start(0x04),
            zst: start(0x08),
            dxst: delta(0x0C),
            dyst: delta(0x10),
            dx: delta(0x14),
            dy: delta(0x18),
            a: coeff(0x1C),
            b: coeff(0x20),
            c: coeff(0x24),
            d: coeff(0x28),
            e: coeff(0x2C),
            f: coeff(0x30),
            px: coord14(word(0x34)),
            py: coord14(word(0x36)),
            pz: coord14(word(0x38)),
            cx: coord14(word(0x3C)),
            cy: coord14(word(0x3E)),
            cz: coord14(word(0x40)),
            mx: fixed(long(0x44), 0x3FFF_FFC0, 0x2000_0000),
            my: fixed(long(0x48), 0x3FFF_FFC0, 0x2000_0000),
            kx: fixed(long(0x4C), 0x00FF_FFFF, 0x0080_0000),
            ky: fixed(long(0x50), 0x00FF_FFFF, 0x0080_0000),
        }
    }

    /// Source coordinate for screen position (`h`, `v`).
    pub fn transform(&self, h: u32, v: u32) -> (i32, i32) {
        let h = h as f32;
        let v = v as f32;

        let sx = (self.xst + self.dxst * v) - self.px;
        let sy = (self.yst + self.dyst * v) - self.py;
        let sz = self.zst - self.pz;
        let xsp = self.a * sx + self.b * sy + self.c * sz;
        let ysp = self.d * sx + self.e * sy + self.f * sz;

        let (ox, oy, oz) = (self.px - self.cx, self.py - self.cy, self.pz - self.cz);
        let xp = self.a * ox + self.b * oy + self.c * oz;
        let yp = self.d * ox + self.e * oy + self.f * oz;

        let step_x = self.a * self.dx + self.b * self.dy;
        let step_y = self.d * self.dx + self.e * self.dy;

        let x = self.kx * (xsp + step_x * h) + xp;
        let y = self.ky * (ysp + step_y * h) + yp;
        (x as i32, y as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u32 = 0x0001_0000;

    fn identity_table(vram: &mut Vram, addr: u32) {
        vram.write_u32(addr + 0x10, ONE); // dYst
        vram.write_u32(addr + 0x14, ONE); // dX
        vram.write_u32(addr + 0x1C, ONE); // A
        vram.write_u32(addr + 0x2C, ONE); // E
        vram.write_u32(addr + 0x4C, ONE); // kx
        vram.write_u32(addr + 0x50, ONE); // ky
    }

    #[test]
    fn test_identity_transform() {
        let mut vram = Vram::new();
        identity_table(&mut vram, 0x1000);
        let params = RotationParams::read(&vram, 0x1000);
        for (h, v) in [(0, 0), (1, 0), (0, 1), (319, 223), (703, 511), (17, 200)] {
            assert_eq!(params.transform(h, v), (h as i32, v as i32));
        }
    }

    #[test]
    fn test_fixed_point_fields() {
        let mut vram = Vram::new();
        vram.write_u32(0x00, 0x1FFF_0000); // Xst = -1.0
        vram.write_u32(0x04, 0x0002_8000); // Yst = 2.5
        vram.write_u32(0x1C, 0x000F_C000); // A = -0.25
        vram.write_u32(0x0C, 0x0004_0000); // dXst = -4.0
        vram.write_u16(0x34, 0x3FFF); // Px = -1
        vram.write_u16(0x3C, 0x1FFF); // Cx = 8191
        vram.write_u32(0x4C, 0x00FF_0000); // kx = -1.0
        vram.write_u32(0x44, 0x2000_0000); // Mx sign bit
        // Low fractional bits below the field are ignored
        vram.write_u32(0x08, 0x0001_003F);

        let p = RotationParams::read(&vram, 0);
        assert_eq!(p.xst, -1.0);
        assert_eq!(p.yst, 2.5);
        assert_eq!(p.zst, 1.0);
        assert_eq!(p.a, -0.25);
        assert_eq!(p.dxst, -4.0);
        assert_eq!(p.px, -1.0);
        assert_eq!(p.cx, 8191.0);
        assert_eq!(p.kx, -1.0);
        assert_eq!(p.mx, -8192.0);
    }

    #[test]
    fn test_scaled_and_translated() {
        let mut vram = Vram::new();
        identity_table(&mut vram, 0);
        vram.write_u32(0x4C, 0x0002_0000); // kx = 2
        vram.write_u32(0x00, 0x000A_0000); // Xst = 10
        let p = RotationParams::read(&vram, 0);
        // X = 2 * (10 + h)
        assert_eq!(p.transform(5, 3), (30, 3));
    }

    #[test]
    fn test_parameter_mode_and_table_address() {
        let mut regs = RegisterBank::new();
        regs.write_word(RPTAU, 0x0001);
        regs.write_word(RPTAU + 2, 0x0041);
        let a = RotationParamMode::read(&regs);
        assert_eq!(a, RotationParamMode::TableA);
        assert_eq!(a.table_address(&regs), 0x0002_0000);
        assert_eq!(RotationParamMode::TableB.table_address(&regs), 0x0002_0080);

        regs.write_word(RPMD, 2);
        assert_eq!(
            RotationParamMode::read(&regs).check_supported(&regs),
            Err(Unsupported::CoefficientParameterSwitch)
        );
        regs.write_word(RPMD, 3);
        assert_eq!(
            RotationParamMode::read(&regs).check_supported(&regs),
            Err(Unsupported::WindowParameterSwitch)
        );
        regs.write_word(KTCTL, 0x0100);
        assert_eq!(RotationParamMode::TableA.check_supported(&regs), Ok(()));
        assert_eq!(
            RotationParamMode::TableB.check_supported(&regs),
            Err(Unsupported::CoefficientTable)
        );
    }
}
