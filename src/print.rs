//! `-p` bracketed-prefix printer (spec §6, §11): prints the translated
//! combinator graph without evaluating it.
//!
//! Output grammar: `` ` `` prefixes an application, combinators print by
//! name (`S K I B C`, `` S' ``, `` B* ``, `` C' ``, `IOTA`, and the
//! two-node `K I` special case as `` `ki ``), and anything else prints as
//! `?` — spec §11 notes this can only be reached by a stray non-pair,
//! non-combinator cell (an `Integer` or `Character`), which a well-formed
//! pre-evaluation graph never contains but which the printer must not
//! panic on, since `-p` runs before any evaluation-time invariant check.

use std::io::{self, Write};

use crate::cell::{Cell, CellKind, Combinator};
use crate::heap::Heap;

/// Write `t`'s bracketed prefix form to `out` (no trailing newline).
pub fn print_combinator(out: &mut impl Write, heap: &Heap, t: Cell) -> io::Result<()> {
    match t.kind() {
        CellKind::Pair(idx) => {
            let car = heap.car(idx);
            let cdr = heap.cdr(idx);
            if car.as_combinator() == Some(Combinator::K) && cdr.as_combinator() == Some(Combinator::I)
            {
                return write!(out, "`ki");
            }
            write!(out, "`")?;
            print_combinator(out, heap, car)?;
            print_combinator(out, heap, cdr)
        }
        CellKind::Combinator(c) => write!(out, "{}", c.name()),
        _ => write!(out, "?"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::spine::Spine;
    use crate::translate::translate;

    fn print_bits(bits: &str) -> String {
        let path = crate::input::testing::write_temp_bits(bits);
        let mut input = crate::input::BitReader::new(vec![path]);
        let mut heap = Heap::with_initial_size(4096);
        let mut spine = Spine::new(1024);
        let tree = parse(&mut heap, &mut spine, &mut input).unwrap();
        let combinator = translate(&mut heap, &mut spine, tree).unwrap();
        let mut buf = Vec::new();
        print_combinator(&mut buf, &heap, combinator).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn identity_prints_as_bare_i() {
        assert_eq!(print_bits("0010"), "I");
    }

    #[test]
    fn self_application_prints_nested_backticks() {
        // lambda x. x x => `S I I` after the peephole rewrites collapse
        // the two K1(I)-free B/C/S' cases down to plain S.
        assert_eq!(print_bits("00011010"), "``SII");
    }

    #[test]
    fn ki_pair_collapses_to_shorthand() {
        // lambda x. lambda y. y = "00" "00" "10" translates to `(K, I)`,
        // which prints as the `ki` shorthand rather than `` `KI ``.
        assert_eq!(print_bits("0000100"), "`ki");
    }
}
