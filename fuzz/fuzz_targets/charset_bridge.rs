#![no_main]

use libfuzzer_sys::fuzz_target;
use segrs::BytePipeline;

fuzz_target!(|input: (u8, Vec<u8>)| {
    let (block, data) = input;
    let block = usize::from(block) + 1;

    let encodings = [
        encoding_rs::UTF_8,
        encoding_rs::WINDOWS_1252,
        encoding_rs::SHIFT_JIS,
        encoding_rs::UTF_16LE,
    ];

    for encoding in encodings {
        // Verify: block size never changes the decoded text
        let small = BytePipeline::from_bytes(data.clone())
            .block_size(block)
            .unwrap()
            .decode(encoding)
            .to_string()
            .unwrap();
        let (whole, _) = encoding.decode_with_bom_removal(&data);
        assert_eq!(small, whole);

        // Verify: re-encoding valid UTF-8 text is lossless
        if encoding == encoding_rs::UTF_8 {
            let bytes = BytePipeline::from_bytes(data.clone())
                .decode(encoding)
                .encode(encoding)
                .to_vec()
                .unwrap();
            assert_eq!(bytes, small.as_bytes());
        }
    }
});
