use std::{io::Write, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::Display;

use crate::{error::Error, folded::write_folded, pprof::to_pprof, stack::StackCounter};

/// Output encoding of a stack profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, SerializeDisplay, DeserializeFromStr)]
pub enum Format {
    /// One `frame;frame;frame count` line per stack.
    #[strum(serialize = "folded")]
    Folded,
    /// Gzipped protobuf readable by `go tool pprof`.
    #[strum(serialize = "pprof")]
    Pprof,
}

// Not `strum::EnumString`: the error has to carry the rejected name.
impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folded" => Ok(Format::Folded),
            "pprof" => Ok(Format::Pprof),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Encode `stacks` to `w` in `format`.
///
/// `hz` is the sampling rate and only affects [`Format::Pprof`].
pub fn write_format<W: Write + ?Sized>(
    w: &mut W,
    stacks: &StackCounter,
    format: Format,
    hz: u32,
) -> Result<(), Error> {
    tracing::debug!(%format, hz, stacks = stacks.len(), "writing profile");
    match format {
        Format::Folded => write_folded(w, stacks)?,
        Format::Pprof => to_pprof(stacks, hz)?.write(w)?,
    }
    Ok(())
}
