#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rewind_store::PatchStack;

#[derive(Arbitrary, Debug)]
enum Op {
    Push(Vec<u8>),
    PushEmpty,
    Pop,
    Clear,
}

fuzz_target!(|ops: Vec<Op>| {
    let num_pages = 16;
    let page_size = 512;
    let mut stack = PatchStack::new(num_pages, page_size);
    let mut model: Vec<Vec<u8>> = Vec::new();
    let mut stored = 0usize;

    for op in ops {
        match op {
            Op::Push(patch) => {
                if patch.is_empty() {
                    // Folded into the run counter; modeled separately.
                    stack.push(&patch);
                    model.push(Vec::new());
                    continue;
                }
                // Cap patch size and total bytes so even worst-case page
                // packing cannot reach the last ring slot.
                let cost = (patch.len() + 4 + 3) / 4 * 4 + 4;
                if patch.len() > 64 || stored + cost > (num_pages - 2) * (page_size - 72) {
                    continue;
                }
                stored += cost;
                stack.push(&patch);
                model.push(patch);
            }
            Op::PushEmpty => {
                stack.push(&[]);
                model.push(Vec::new());
            }
            Op::Pop => {
                if model.is_empty() {
                    assert!(stack.is_empty());
                    continue;
                }
                let expected = model.pop().unwrap();
                let got = stack.pop();
                assert_eq!(got.as_bytes(), expected.as_slice());
            }
            Op::Clear => {
                stack.clear();
                model.clear();
                stored = 0;
            }
        }
        assert_eq!(stack.is_empty(), model.is_empty());
    }
});
