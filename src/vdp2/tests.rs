use crate::error::Unsupported;
use super::registers::*;
use super::timing::{NullSink, SlaveInterrupt, LINES_PER_FIELD};
use super::*;
use pretty_assertions::assert_eq;

#[derive(Default)]
struct RecordingIrq {
    edges: Vec<BlankEdge>,
    slave: Vec<SlaveInterrupt>,
    slave_running: bool,
}

impl InterruptSink for RecordingIrq {
    fn blank_edge(&mut self, edge: BlankEdge) {
        self.edges.push(edge);
    }

    fn slave_running(&self) -> bool {
        self.slave_running
    }

    fn slave_interrupt(&mut self, irq: SlaveInterrupt) {
        self.slave.push(irq);
    }
}

#[derive(Default)]
struct RecordingSink {
    frames: Vec<(u16, u16, u32)>,
}

impl FrameSink for RecordingSink {
    fn present(&mut self, frame: &FrameBuffer) {
        self.frames.push((frame.width(), frame.height(), frame.pixel(0, 0)));
    }
}

struct SolidSprite {
    priority: u8,
    color: u32,
}

impl SpriteLayer for SolidSprite {
    fn priority(&self) -> u8 {
        self.priority
    }

    fn pixel(&self, _x: u32, _y: u32) -> u32 {
        self.color
    }
}

fn display_on(vdp2: &mut Vdp2) {
    vdp2.write_register(TVMD, TvMode::DISP.bits());
}

// Every background enabled and opaque; each layer reads palette entry 0 of
// its own color RAM bank, so the winning layer is visible in the output.
fn opaque_layers(vdp2: &mut Vdp2) {
    vdp2.write_register(BGON, 0x1F1F);
    vdp2.write_register(CRAOFA, 0x3210);
    vdp2.write_register(CRAOFB, 0x0004);
    vdp2.cram_mut().set_mode(cram::ColorRamMode::Rgb555x2048);
    for (bank, color) in [0x0001u16, 0x0002, 0x0003, 0x0004, 0x0005].into_iter().enumerate() {
        vdp2.cram_mut().write_u16(bank as u32 * 0x200, color);
    }
}

fn bank_color(bank: u16) -> u32 {
    color::rgb555(0xFF, bank + 1)
}

#[test]
fn test_vblank_sequence_draws_and_presents_once() {
    let mut vdp2 = Vdp2::new();
    let mut irq = RecordingIrq::default();
    let mut sink = RecordingSink::default();

    vdp2.v_blank_in(&mut irq);
    assert!(vdp2.status().contains(TvStatus::VBLANK));
    assert_eq!(vdp2.read_register(TVSTAT) & 0x0008, 0x0008);
    assert_eq!(vdp2.frames_drawn(), 0);

    vdp2.v_blank_out(None, &mut irq, &mut sink);
    assert!(!vdp2.status().contains(TvStatus::VBLANK));
    assert!(vdp2.status().contains(TvStatus::ODD));
    assert_eq!(vdp2.frames_drawn(), 1);
    assert_eq!(sink.frames.len(), 1);
    assert_eq!(irq.edges, vec![BlankEdge::VBlankIn, BlankEdge::VBlankOut]);
    assert!(irq.slave.is_empty());
}

#[test]
fn test_slave_interrupts_only_when_running() {
    let mut vdp2 = Vdp2::new();
    let mut irq = RecordingIrq {
        slave_running: true,
        ..Default::default()
    };
    vdp2.h_blank_in(&mut irq);
    assert!(vdp2.status().contains(TvStatus::HBLANK));
    vdp2.h_blank_out(&mut irq);
    assert!(!vdp2.status().contains(TvStatus::HBLANK));
    vdp2.v_blank_in(&mut irq);
    assert_eq!(
        irq.slave,
        vec![
            SlaveInterrupt { level: 2, vector: 0x41 },
            SlaveInterrupt { level: 6, vector: 0x43 },
        ]
    );
    assert_eq!(
        irq.edges,
        vec![BlankEdge::HBlankIn, BlankEdge::HBlankOut, BlankEdge::VBlankIn]
    );
}

#[test]
fn test_draw_order_ties_and_skips() {
    let mut vdp2 = Vdp2::new();
    display_on(&mut vdp2);
    opaque_layers(&mut vdp2);
    vdp2.write_register(PRINA, 0x0505); // NBG1=5, NBG0=5
    vdp2.write_register(PRINB, 0x0200); // NBG3=2, NBG2=0
    vdp2.write_register(PRIR, 0x0003);

    let drawn = vdp2.draw_frame(None);
    assert_eq!(
        drawn,
        vec![LayerId::Nbg3, LayerId::Rbg0, LayerId::Nbg0, LayerId::Nbg1]
    );
    // NBG1 wins the tie and is opaque
    assert_eq!(vdp2.frame().pixel(10, 10), bank_color(1));
    assert!(vdp2.frame_issues().is_empty());
}

#[test]
fn test_priority_zero_and_disabled_layers_never_draw() {
    let mut vdp2 = Vdp2::new();
    display_on(&mut vdp2);
    opaque_layers(&mut vdp2);
    // NBG0 priority 0, NBG1 priority 7 but disabled
    vdp2.write_register(PRINA, 0x0700);
    vdp2.write_register(BGON, 0x1F1D);

    assert!(vdp2.draw_frame(None).is_empty());
    assert!(vdp2.frame().pixels().iter().all(|&p| p == 0xFF00_0000));
}

#[test]
fn test_priority_registers_resort_immediately() {
    let mut vdp2 = Vdp2::new();
    vdp2.write_register(PRIR, 0x0001);
    vdp2.write_register(PRINA, 0x0002);
    let order = vdp2.draw_order();
    let pos = |id| order.iter().position(|&o| o == id).unwrap();
    assert!(pos(LayerId::Rbg0) < pos(LayerId::Nbg0));

    // Byte write to the high half (NBG1)
    vdp2.write_register_byte(PRINA, 0x07);
    assert_eq!(vdp2.draw_order()[5], LayerId::Nbg1);

    // Same value again gives the same order
    let before = vdp2.draw_order();
    vdp2.write_register(PRINA, 0x0702);
    assert_eq!(vdp2.draw_order(), before);
}

#[test]
fn test_sprite_layer_orders_with_backgrounds() {
    let mut vdp2 = Vdp2::new();
    display_on(&mut vdp2);
    opaque_layers(&mut vdp2);
    vdp2.write_register(PRINA, 0x0005);
    let sprite = SolidSprite { priority: 6, color: 0xFF12_3456 };

    let drawn = vdp2.draw_frame(Some(&sprite));
    assert_eq!(drawn, vec![LayerId::Nbg0, LayerId::Sprite]);
    assert_eq!(vdp2.frame().pixel(0, 0), 0xFF12_3456);

    let under = SolidSprite { priority: 4, color: 0xFF12_3456 };
    let drawn = vdp2.draw_frame(Some(&under));
    assert_eq!(drawn, vec![LayerId::Sprite, LayerId::Nbg0]);
    assert_eq!(vdp2.frame().pixel(0, 0), bank_color(0));
}

#[test]
fn test_color_ram_mode_register_switches_stride() {
    let mut vdp2 = Vdp2::new();
    display_on(&mut vdp2);
    vdp2.write_register(BGON, 0x0101);
    vdp2.write_register(PRINA, 0x0001);
    vdp2.write_register(RAMCTL, 0x1000);
    vdp2.cram_mut().write_u16(0, 0x001F);
    vdp2.cram_mut().write_u16(2, 0x00AB);

    vdp2.draw_frame(None);
    let first = vdp2.frame().clone();
    assert_eq!(first.pixel(0, 0), 0xFF00_00F8);

    vdp2.write_register(RAMCTL, 0x2000);
    assert_eq!(vdp2.cram().mode(), cram::ColorRamMode::Rgb888x1024);
    // Already composited pixels are untouched
    assert_eq!(first.pixel(0, 0), 0xFF00_00F8);

    vdp2.draw_frame(None);
    assert_eq!(vdp2.frame().pixel(0, 0), color::rgb888(0xFF, 0x001F, 0x00AB));
}

#[test]
fn test_reserved_color_ram_mode_is_reported() {
    let mut vdp2 = Vdp2::new();
    display_on(&mut vdp2);
    vdp2.write_register(RAMCTL, 0x3000);
    vdp2.draw_frame(None);
    assert_eq!(vdp2.frame_issues(), &[VdpError::ReservedColorRamMode]);
}

#[test]
fn test_resolution_trigger() {
    let mut vdp2 = Vdp2::new();
    vdp2.write_register(TVMD, 0x80D2);
    assert_eq!(
        vdp2.resolution(),
        Resolution { width: 640, height: 480, interlaced: true }
    );
    vdp2.draw_frame(None);
    assert_eq!((vdp2.frame().width(), vdp2.frame().height()), (640, 480));

    vdp2.reset();
    assert_eq!(vdp2.resolution(), Resolution::default());
    assert_eq!(vdp2.read_register(TVMD), 0);
}

#[test]
fn test_display_off_still_produces_a_frame() {
    let mut vdp2 = Vdp2::new();
    opaque_layers(&mut vdp2);
    vdp2.write_register(PRINA, 0x0707);
    let mut sink = RecordingSink::default();
    vdp2.v_blank_out(None, &mut NullSink, &mut sink);
    assert_eq!(sink.frames, vec![(320, 224, 0xFF00_0000)]);
    assert_eq!(vdp2.frames_drawn(), 1);
}

#[test]
fn test_unsupported_rotation_mode_skips_only_rbg0() {
    let mut vdp2 = Vdp2::new();
    display_on(&mut vdp2);
    opaque_layers(&mut vdp2);
    vdp2.write_register(PRINA, 0x0001);
    vdp2.write_register(PRIR, 0x0007);
    vdp2.write_register(RPMD, 0x0002);

    assert_eq!(vdp2.draw_frame(None), vec![LayerId::Nbg0]);
    assert_eq!(
        vdp2.frame_issues(),
        &[VdpError::Unimplemented {
            layer: LayerId::Rbg0,
            feature: Unsupported::CoefficientParameterSwitch,
        }]
    );
    assert_eq!(vdp2.frame().pixel(0, 0), bank_color(0));
}

#[test]
fn test_display_off_clears_previous_issues() {
    let mut vdp2 = Vdp2::new();
    display_on(&mut vdp2);
    vdp2.write_register(BGON, 0x0010);
    vdp2.write_register(PRIR, 0x0001);
    vdp2.write_register(RPMD, 0x0003);
    vdp2.draw_frame(None);
    assert_eq!(vdp2.frame_issues().len(), 1);

    vdp2.write_register(TVMD, 0);
    assert!(vdp2.draw_frame(None).is_empty());
    assert!(vdp2.frame_issues().is_empty());
}

#[test]
fn test_rotation_layer_identity_draw() {
    let mut vdp2 = Vdp2::new();
    display_on(&mut vdp2);
    vdp2.write_register(BGON, 0x0010);
    vdp2.write_register(PRIR, 0x0001);
    vdp2.write_register(CHCTLB, 0x3200); // RBG0 32K-color bitmap, 512x256
    vdp2.write_register(MPOFR, 0x0001); // bitmap at 0x20000
    vdp2.write_register(RPTAU, 0x0000);
    vdp2.write_register(RPTAU + 2, 0x0800); // table at 0x1000

    let one = 0x0001_0000;
    for offset in [0x10, 0x14, 0x1C, 0x2C, 0x4C, 0x50] {
        vdp2.vram_mut().write_u32(0x1000 + offset, one);
    }
    vdp2.vram_mut().write_u16(0x2_0000 + (7 * 512 + 3) * 2, 0xFC00);

    assert_eq!(vdp2.draw_frame(None), vec![LayerId::Rbg0]);
    assert_eq!(vdp2.frame().pixel(3, 7), 0xFFF8_0000);
    // Transparent neighbours show the back screen
    assert_eq!(vdp2.frame().pixel(4, 7), 0xFF00_0000);
}

#[test]
fn test_layer_display_toggle() {
    let mut vdp2 = Vdp2::new();
    display_on(&mut vdp2);
    opaque_layers(&mut vdp2);
    vdp2.write_register(PRINA, 0x0101);

    assert!(!vdp2.toggle_layer_display(LayerId::Nbg1));
    assert_eq!(vdp2.draw_frame(None), vec![LayerId::Nbg0]);
    assert!(vdp2.toggle_layer_display(LayerId::Nbg1));
    assert_eq!(vdp2.draw_frame(None), vec![LayerId::Nbg0, LayerId::Nbg1]);
}

#[test]
fn test_describe_layer() {
    let mut vdp2 = Vdp2::new();
    assert_eq!(vdp2.describe_layer(LayerId::Nbg2), None);
    assert_eq!(vdp2.describe_layer(LayerId::Sprite), None);

    vdp2.write_register(BGON, 0x0004);
    vdp2.write_register(PRINB, 0x0003);
    let text = vdp2.describe_layer(LayerId::Nbg2).unwrap();
    assert!(text.starts_with("NBG2:"));
    assert!(text.contains("Priority: 3"));

    vdp2.write_register(BGON, 0x0010);
    vdp2.write_register(RPMD, 0x0003);
    let text = vdp2.describe_layer(LayerId::Rbg0).unwrap();
    assert!(text.contains("not implemented"));
}

#[test]
fn test_step_runs_one_field() {
    let mut vdp2 = Vdp2::new();
    let mut irq = RecordingIrq::default();
    let mut sink = RecordingSink::default();
    let dots = 427 * LINES_PER_FIELD as u32;

    vdp2.step(dots - 1, None, &mut irq, &mut sink);
    assert!(vdp2.status().contains(TvStatus::VBLANK));
    assert!(sink.frames.is_empty());

    vdp2.step(1, None, &mut irq, &mut sink);
    assert!(!vdp2.status().contains(TvStatus::VBLANK));
    assert_eq!(sink.frames.len(), 1);
    assert_eq!(vdp2.beam().frame, 1);
    assert_eq!(
        irq.edges.iter().filter(|&&e| e == BlankEdge::HBlankIn).count(),
        224
    );
    assert_eq!(irq.edges.last(), Some(&BlankEdge::VBlankOut));
}

#[test]
fn test_hblank_clear_on_first_line_after_vblank() {
    let mut vdp2 = Vdp2::new();
    let mut irq = RecordingIrq::default();
    let dots = 427 * LINES_PER_FIELD as u32;

    vdp2.step(427 * 223 + 400, None, &mut irq, &mut NullSink);
    assert!(vdp2.status().contains(TvStatus::HBLANK));
    vdp2.step(27, None, &mut irq, &mut NullSink);
    assert!(!vdp2.status().contains(TvStatus::HBLANK));
    assert!(vdp2.status().contains(TvStatus::VBLANK));

    vdp2.step(dots - 427 * 224 + 10, None, &mut irq, &mut NullSink);
    assert_eq!(vdp2.beam(), BeamCounter { dot: 10, line: 0, frame: 1 });
    assert!(!vdp2.status().contains(TvStatus::HBLANK));
    assert!(!vdp2.status().contains(TvStatus::VBLANK));
    let count = |edge: BlankEdge| irq.edges.iter().filter(|&&e| e == edge).count();
    assert_eq!(count(BlankEdge::HBlankIn), 224);
    assert_eq!(count(BlankEdge::HBlankOut), 224);
}
