#![no_main]

use std::cell::RefCell;

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use segrs::{Block, BytePipeline, Transform, transform};

fn record(calls: &RefCell<Vec<(usize, bool)>>) -> impl Transform<Bytes> + '_ {
    transform::from_fn(move |data: &mut Bytes, end| {
        calls.borrow_mut().push((data.len(), end));
        Ok(Some(data.take_all()))
    })
}

fuzz_target!(|input: (u8, u8, Vec<u8>)| {
    let (block, k, data) = input;
    let block = usize::from(block) + 1;
    let k = usize::from(k % 64) + 1;

    let fixed = RefCell::new(Vec::new());
    let rounding = RefCell::new(Vec::new());

    let out = BytePipeline::from_read(&data[..])
        .block_size(block)
        .unwrap()
        .stage_fixed_size(record(&fixed), k)
        .unwrap()
        .stage_rounding_size(record(&rounding), k)
        .unwrap()
        .to_vec()
        .unwrap();

    // Verify: output matches input
    assert_eq!(out, data);

    // Verify: fixed stage sees exact blocks, short only at the end
    let fixed = fixed.into_inner();
    let (last, rest) = fixed.split_last().unwrap();
    assert!(rest.iter().all(|&(n, end)| n == k && !end));
    assert!(last.1 && last.0 <= k);

    // Verify: rounding stage sees positive multiples, remainder only at the end
    let rounding = rounding.into_inner();
    let (last, rest) = rounding.split_last().unwrap();
    assert!(rest.iter().all(|&(n, end)| n > 0 && n % k == 0 && !end));
    assert!(last.1);
});
