//! Basic synchronous pipeline example.
//!
//! Run with:
//!     cargo run --example sync_basic

use bytes::Bytes;
use segrs::{Block, ByteSink, BytePipeline, transform};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create some sample data
    let data: Vec<u8> = (0..100_000).map(|i| (i % 251) as u8).collect();

    // XOR "cipher" working on exact 16-byte blocks
    let mut blocks = 0;
    let cipher = transform::from_fn(|data: &mut Bytes, end| {
        blocks += 1;
        if end {
            println!("final block: {} bytes", data.len());
        }
        let out: Vec<u8> = data.take_all().iter().map(|b| b ^ 0x5A).collect();
        Ok(Some(Bytes::from(out)))
    });

    let mut encrypted = Vec::new();
    let count = BytePipeline::from_read(&data[..])
        .block_size(1000)?
        .stage_fixed_size(cipher, 16)?
        .process_to(ByteSink::from(&mut encrypted))?;

    println!("Read {} bytes", count.unwrap_or(0));
    println!("Cipher saw {} blocks", blocks);

    // Reverse it through the lazy view, pulling 4 KiB at a time
    let mut stream = BytePipeline::from_bytes(encrypted)
        .stage(transform::from_fn(|data: &mut Bytes, _end| {
            let out: Vec<u8> = data.take_all().iter().map(|b| b ^ 0x5A).collect();
            Ok(Some(Bytes::from(out)))
        }))
        .into_stream();

    let mut decrypted = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read_units(&mut buf)?;
        if n == 0 {
            break;
        }
        decrypted.extend_from_slice(&buf[..n]);
    }

    assert_eq!(decrypted, data);
    println!("Round trip OK: {} bytes", decrypted.len());

    Ok(())
}
