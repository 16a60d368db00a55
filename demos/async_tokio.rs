//! Async pipeline example with tokio.
//!
//! A producer task writes into one end of an in-memory duplex pipe while the
//! pipeline pulls 4 KiB blocks from the other end.
//!
//! Run with:
//!     cargo run --example async_tokio --features async-io

use bytes::Bytes;
use futures_util::StreamExt;
use segrs::{Block, Chain, ReadConfig, pipe_async, transform};
use tokio::io::AsyncWriteExt;
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (reader, mut writer) = tokio::io::duplex(1024);

    // Simulate data trickling in from the network
    let producer = tokio::spawn(async move {
        for i in 0..64u8 {
            writer.write_all(&[b'a' + i % 26; 1000]).await?;
            tokio::task::yield_now().await;
        }
        writer.shutdown().await
    });

    let mut seen = 0;
    let chain = Chain::new().stage(transform::from_fn(|data: &mut Bytes, end| {
        seen += data.len();
        if end {
            println!("final block seen after {} bytes", seen);
        }
        Ok(Some(Bytes::from(data.take_all().to_ascii_uppercase())))
    }));

    let config = ReadConfig::new(4096)?.with_read_limit(50_000);
    let mut stream = pipe_async(reader.compat(), config, chain);

    let mut blocks = 0;
    let mut total = 0;
    while let Some(block) = stream.next().await {
        let block = block?;
        blocks += 1;
        total += block.len();
    }
    drop(stream);

    println!("Received {} blocks, {} bytes", blocks, total);
    // The producer may fail once the pipeline stops reading at the limit.
    let _ = producer.await?;

    Ok(())
}
