use saturn_vdp2::vdp2::cram::CRAM_SIZE;
use saturn_vdp2::vdp2::registers::REGISTER_SPAN;
use saturn_vdp2::vdp2::timing::NullSink;
use saturn_vdp2::vdp2::vram::VRAM_SIZE;
use saturn_vdp2::{FrameBuffer, LayerId, Vdp2};
use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

// Headless VDP2 frame renderer
// Usage:
//   cargo run --release --bin render_dump -- state.bin --out frame.ppm [--frames N] [--describe]
// The dump is the register window, VRAM and color RAM back to back:
//   0x200 bytes of registers, 0x80000 bytes of VRAM, 0x1000 bytes of color RAM.

struct Args {
    dump: PathBuf,
    out: PathBuf,
    frames: u32,
    describe: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let mut dump = None;
    let mut out = PathBuf::from("frame.ppm");
    let mut frames = 1;
    let mut describe = false;

    while let Some(a) = args.next() {
        match a.as_str() {
            "--out" | "-o" => {
                out = args.next().map(PathBuf::from).ok_or("--out needs a path")?;
            }
            "--frames" => {
                let v = args.next().ok_or("--frames needs a count")?;
                frames = v.parse().map_err(|_| format!("bad frame count: {}", v))?;
            }
            "--describe" => describe = true,
            other if dump.is_none() => dump = Some(PathBuf::from(other)),
            other => return Err(format!("unexpected argument: {}", other)),
        }
    }

    Ok(Args {
        dump: dump.ok_or("usage: render_dump <dump> [--out file.ppm] [--frames N] [--describe]")?,
        out,
        frames,
        describe,
    })
}

fn load_dump(vdp2: &mut Vdp2, bytes: &[u8]) -> Result<(), String> {
    let regs_end = REGISTER_SPAN as usize;
    let vram_end = regs_end + VRAM_SIZE;
    let expected = vram_end + CRAM_SIZE;
    if bytes.len() != expected {
        return Err(format!(
            "dump is {} bytes, expected {} (registers + VRAM + color RAM)",
            bytes.len(),
            expected
        ));
    }

    vdp2.vram_mut().load(0, &bytes[regs_end..vram_end]);
    // Registers go through the bus path so mode and priority side effects apply
    for (i, word) in bytes[..regs_end].chunks_exact(2).enumerate() {
        vdp2.write_register(i as u32 * 2, u16::from_be_bytes([word[0], word[1]]));
    }
    vdp2.cram_mut().load(0, &bytes[vram_end..]);
    Ok(())
}

fn write_ppm(path: &Path, frame: &FrameBuffer) -> std::io::Result<()> {
    let mut file = std::io::BufWriter::new(fs::File::create(path)?);
    write!(file, "P6\n{} {}\n255\n", frame.width(), frame.height())?;
    for pixel in frame.pixels() {
        let [r, g, b, _] = pixel.to_le_bytes();
        file.write_all(&[r, g, b])?;
    }
    file.flush()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = parse_args()?;

    let bytes = fs::read(&args.dump)?;
    let mut vdp2 = Vdp2::new();
    load_dump(&mut vdp2, &bytes)?;

    if args.describe {
        for id in LayerId::BACKGROUNDS {
            match vdp2.describe_layer(id) {
                Some(text) => println!("{}\n", text),
                None => println!("{}: disabled\n", id),
            }
        }
    }

    let mut irq = NullSink;
    let mut sink = NullSink;
    for _ in 0..args.frames {
        vdp2.v_blank_in(&mut irq);
        vdp2.v_blank_out(None, &mut irq, &mut sink);
    }
    for issue in vdp2.frame_issues() {
        eprintln!("warning: {}", issue);
    }

    write_ppm(&args.out, vdp2.frame())?;
    let res = vdp2.resolution();
    println!(
        "wrote {} ({}x{}, {} frame(s))",
        args.out.display(),
        res.width,
        res.height,
        vdp2.frames_drawn()
    );
    Ok(())
}
