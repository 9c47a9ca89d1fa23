use std::io::Write;

use crate::stack::StackCounter;

/// Write one `stack count` line per stack, sorted by stack.
///
/// This is the input format of `flamegraph.pl` and `inferno`.
pub fn write_folded<W: Write + ?Sized>(w: &mut W, stacks: &StackCounter) -> std::io::Result<()> {
    for (stack, count) in stacks {
        writeln!(w, "{stack} {count}")?;
    }
    Ok(())
}
