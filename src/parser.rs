//! Bits → lambda tree (spec §4.4).
//!
//! ```text
//! term := '1' unary-index    -- variable; de Bruijn index counted in unary
//!       | '01' term term     -- application
//!       | '00' term          -- abstraction
//! ```
//!
//! Variables are `Integer` cells; applications are pairs whose `car` is
//! not `LAMBDA`; abstractions are `(LAMBDA, body)` pairs.

use crate::cell::Cell;
use crate::common::error::Result;
use crate::heap::Heap;
use crate::input::BitReader;
use crate::spine::Spine;

pub fn parse(heap: &mut Heap, spine: &mut Spine, input: &mut BitReader) -> Result<Cell> {
    if input.read_bit()? {
        return parse_variable(input);
    }
    if input.read_bit()? {
        // '01': application. `f` must be rooted on the spine while `a`
        // recurses, since any `pair` call nested in that recursion may
        // trigger a collection (spec §4.4).
        let f = parse(heap, spine, input)?;
        spine.push(f)?;
        let a = parse(heap, spine, input)?;
        let f = spine.pop().expect("just pushed");
        heap.pair(f, a, spine)
    } else {
        // '00': abstraction.
        let body = parse(heap, spine, input)?;
        heap.pair(Cell::lambda(), body, spine)
    }
}

fn parse_variable(input: &mut BitReader) -> Result<Cell> {
    let mut index: i64 = 0;
    while input.read_bit()? {
        index += 1;
    }
    Ok(Cell::int(index))
}
