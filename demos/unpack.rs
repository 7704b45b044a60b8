use std::env;
use std::fs;

use lz4kit::Result;
use lz4kit::compression::lz4::decompress_lz4;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "data.lz4".into());
    let output = args.next().unwrap_or_else(|| "data.bin".into());

    let packed = fs::read(&input)?;
    let plain = decompress_lz4(&packed)?;
    fs::write(&output, &plain)?;

    println!("{input}: {} -> {} bytes", packed.len(), plain.len());

    Ok(())
}
