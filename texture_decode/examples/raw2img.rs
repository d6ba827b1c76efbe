use anyhow::Context;
use texture_decode::{ByteOrder, ImageFormat, Surface};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<_> = std::env::args().collect();
    if args.len() != 6 {
        println!("Usage: raw2img <input> <unity format id> <width> <height> <output>");
        return Ok(());
    }

    let data = std::fs::read(&args[1]).with_context(|| format!("failed to read {}", args[1]))?;
    let image_format = ImageFormat::from_unity_id(args[2].parse()?)?;
    let width = args[3].parse()?;
    let height = args[4].parse()?;

    let surface = Surface {
        width,
        height,
        image_format,
        byte_order: ByteOrder::LittleEndian,
        data,
    };

    let start = std::time::Instant::now();
    let rgba = surface.decode_rgba8()?;
    println!("Decoded {image_format:?} data in {:?}", start.elapsed());

    rgba.to_image()?.save(&args[5])?;
    Ok(())
}
