//! Charset bridge example.
//!
//! Decodes Shift_JIS bytes into chars, transforms the text line by line and
//! encodes the result as windows-1252 with numeric character references for
//! anything that charset cannot represent.
//!
//! Run with:
//!     cargo run --example charset_bridge

use encoding_rs::{SHIFT_JIS, WINDOWS_1252};
use segrs::{Block, BytePipeline, CharBlock, transform};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let text = "first line: ascii\nsecond line: 日本語\nthird line: café\n";
    let (sjis, _, _) = SHIFT_JIS.encode(text);
    println!("Source: {} Shift_JIS bytes", sjis.len());

    // Numbers each complete line; partial lines wait for the next block
    let mut line_no = 0;
    let number = transform::from_fn(|data: &mut CharBlock, end| {
        let cut = match data.as_slice().iter().rposition(|&c| c == '\n') {
            Some(i) => i + 1,
            None if end => data.len(),
            None => return Ok(None),
        };
        let mut out = String::new();
        for line in data.split_to(cut).to_string().split_inclusive('\n') {
            line_no += 1;
            out.push_str(&format!("{:>3} | {}", line_no, line));
        }
        Ok(Some(CharBlock::from_str(&out)))
    });

    let bytes = BytePipeline::from_bytes(sjis.into_owned())
        .block_size(7)?
        .decode(SHIFT_JIS)
        .stage_buffered(number)
        .encode(WINDOWS_1252)
        .to_vec()?;

    println!("Output: {} windows-1252 bytes\n", bytes.len());
    let (shown, _, _) = WINDOWS_1252.decode(&bytes);
    print!("{}", shown);

    Ok(())
}
