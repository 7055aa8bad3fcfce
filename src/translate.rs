//! Bracket abstraction (spec §4.5): lambda tree → SKI-with-optimized-
//! combinators expression.
//!
//! `translate` walks the lambda tree top-down, peeling off `LAMBDA` nodes
//! by calling `unabstract` on the already-translated body; `unabstract`
//! removes exactly one de Bruijn index-0 binder from whatever tree it is
//! given, recursing through `Pair` nodes and bottoming out on `Integer`
//! variable references, applying the B/C/S'/B*/C' peephole rewrites at
//! each application node per the table in §4.5.
//!
//! GC safety here follows the same discipline as the parser: any value
//! that must survive a `pair`/`alloc` call it is not a direct argument of
//! is rooted on the spine stack first (spec §9).

use crate::cell::{Cell, CellKind, Combinator};
use crate::common::error::Result;
use crate::heap::Heap;
use crate::spine::Spine;

pub fn translate(heap: &mut Heap, spine: &mut Spine, t: Cell) -> Result<Cell> {
    let CellKind::Pair(idx) = t.kind() else {
        // Non-pair → return unchanged (spec §4.5): a de Bruijn variable.
        return Ok(t);
    };
    let car = heap.car(idx);
    let cdr = heap.cdr(idx);
    if car.is_lambda() {
        let body = translate(heap, spine, cdr)?;
        spine.push(body)?;
        let body = spine.pop().expect("just pushed");
        unabstract(heap, spine, body)
    } else {
        let f = translate(heap, spine, car)?;
        spine.push(f)?;
        let a = translate(heap, spine, cdr)?;
        let f = spine.pop().expect("just pushed");
        heap.pair(f, a, spine)
    }
}

fn unabstract(heap: &mut Heap, spine: &mut Spine, t: Cell) -> Result<Cell> {
    match t.kind() {
        CellKind::Int(0) => Ok(Cell::combinator(Combinator::I)),
        CellKind::Int(n) if n > 0 => heap.pair(Cell::combinator(Combinator::K), Cell::int(n - 1), spine),
        CellKind::Pair(idx) => {
            let u = heap.car(idx);
            let v = heap.cdr(idx);
            let f = unabstract(heap, spine, u)?;
            spine.push(f)?;
            let g = unabstract(heap, spine, v)?;
            let f = spine.pop().expect("just pushed");
            combine(heap, spine, f, g)
        }
        // Non-pair, non-integer: a primitive combinator surviving from an
        // already-abstracted sibling (spec §4.5's last row).
        _ => heap.pair(Cell::combinator(Combinator::K), t, spine),
    }
}

/// Combine `f` and `g` (the abstracted function and argument halves of an
/// application) per the peephole table in spec §4.5.
fn combine(heap: &mut Heap, spine: &mut Spine, f: Cell, g: Cell) -> Result<Cell> {
    if let Some(x) = as_k1(heap, f) {
        if g == Cell::combinator(Combinator::I) {
            return Ok(x);
        }
        if let Some(y) = as_k1(heap, g) {
            let xy = heap.pair(x, y, spine)?;
            return heap.pair(Cell::combinator(Combinator::K), xy, spine);
        }
        if let Some((y, z)) = as_b2(heap, g) {
            return build_app(heap, spine, &[Cell::combinator(Combinator::BStar), x, y, z]);
        }
        return build_app(heap, spine, &[Cell::combinator(Combinator::B), x, g]);
    }
    if let Some(y) = as_k1(heap, g) {
        if let Some((x, y_prime)) = as_b2(heap, f) {
            return build_app(heap, spine, &[Cell::combinator(Combinator::CPrime), x, y_prime, y]);
        }
        return build_app(heap, spine, &[Cell::combinator(Combinator::C), f, y]);
    }
    if let Some((x, y)) = as_b2(heap, f) {
        return build_app(heap, spine, &[Cell::combinator(Combinator::SPrime), x, y, g]);
    }
    build_app(heap, spine, &[Cell::combinator(Combinator::S), f, g])
}

/// `K1(x) = (K, x)`: match a pair whose head is the bare `K` combinator.
fn as_k1(heap: &Heap, c: Cell) -> Option<Cell> {
    let CellKind::Pair(idx) = c.kind() else { return None };
    if heap.car(idx).as_combinator() == Some(Combinator::K) {
        Some(heap.cdr(idx))
    } else {
        None
    }
}

/// `B2(x, y) = ((B, x), y)`: match a pair whose head is `(B, x)`.
fn as_b2(heap: &Heap, c: Cell) -> Option<(Cell, Cell)> {
    let CellKind::Pair(idx) = c.kind() else { return None };
    let inner = heap.car(idx);
    let y = heap.cdr(idx);
    let CellKind::Pair(inner_idx) = inner.kind() else { return None };
    if heap.car(inner_idx).as_combinator() == Some(Combinator::B) {
        Some((heap.cdr(inner_idx), y))
    } else {
        None
    }
}

/// Build the left-nested application `parts[0] parts[1] ... parts[k]`,
/// i.e. `(...((parts[0], parts[1]), parts[2])..., parts[k])`. Parts not
/// yet consumed are rooted on the spine across each intermediate
/// allocation (spec §9).
fn build_app(heap: &mut Heap, spine: &mut Spine, parts: &[Cell]) -> Result<Cell> {
    debug_assert!(parts.len() >= 2);
    for p in parts[2..].iter().rev() {
        spine.push(*p)?;
    }
    let mut acc = heap.pair(parts[0], parts[1], spine)?;
    for _ in 2..parts.len() {
        let next = spine.pop().expect("pushed above");
        acc = heap.pair(acc, next, spine)?;
    }
    Ok(acc)
}
