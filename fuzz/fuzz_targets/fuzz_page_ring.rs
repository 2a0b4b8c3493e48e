#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rewind_store::PageRing;

#[derive(Arbitrary, Debug)]
enum Op {
    Push(Vec<u8>),
    Pop,
    Peek,
    Clear,
}

fuzz_target!(|ops: Vec<Op>| {
    // Sized so no sequence can wrap the ring: the Vec model and the ring
    // must then agree exactly.
    let num_pages = 16;
    let page_size = 512;
    let mut ring = PageRing::new(num_pages, page_size);
    let mut model: Vec<Vec<u8>> = Vec::new();
    let mut stored = 0usize;

    for op in ops {
        match op {
            Op::Push(block) => {
                // Cap block size and total bytes so even worst-case page
                // packing cannot reach the last ring slot.
                let cost = (block.len() + 3) / 4 * 4 + 4;
                if block.len() > 64 || stored + cost > (num_pages - 2) * (page_size - 72) {
                    continue;
                }
                stored += cost;
                ring.push(&block);
                model.push(block);
            }
            Op::Pop => {
                let got = ring.pop();
                match model.pop() {
                    Some(block) => assert_eq!(got.as_bytes(), block.as_slice()),
                    None => assert!(got.is_empty()),
                }
            }
            Op::Peek => {
                let got = ring.peek();
                match model.last() {
                    Some(block) => assert_eq!(got.as_bytes(), block.as_slice()),
                    None => assert!(got.is_empty()),
                }
            }
            Op::Clear => {
                ring.clear();
                model.clear();
                stored = 0;
            }
        }
        assert_eq!(ring.len(), model.len());
    }
});
