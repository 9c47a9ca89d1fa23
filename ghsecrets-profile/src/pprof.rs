//! Minimal pprof encoder.
//!
//! Only the parts of `profile.proto` that a wall-clock stack profile needs
//! are modelled. Output is gzip compressed, the way `go tool pprof` expects it.

use std::{collections::HashMap, io::Write};

use flate2::{write::GzEncoder, Compression};
use prost::Message;

use crate::{
    error::Error,
    stack::{StackCounter, FRAME_SEPARATOR},
};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

#[derive(Clone, PartialEq, Message)]
pub struct Profile {
    #[prost(message, repeated, tag = "1")]
    pub sample_type: Vec<ValueType>,
    #[prost(message, repeated, tag = "2")]
    pub sample: Vec<Sample>,
    #[prost(message, repeated, tag = "3")]
    pub mapping: Vec<Mapping>,
    #[prost(message, repeated, tag = "4")]
    pub location: Vec<Location>,
    #[prost(message, repeated, tag = "5")]
    pub function: Vec<Function>,
    #[prost(string, repeated, tag = "6")]
    pub string_table: Vec<String>,
    #[prost(message, optional, tag = "11")]
    pub period_type: Option<ValueType>,
    #[prost(int64, tag = "12")]
    pub period: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ValueType {
    #[prost(int64, tag = "1")]
    pub r#type: i64,
    #[prost(int64, tag = "2")]
    pub unit: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Sample {
    /// Leaf first.
    #[prost(uint64, repeated, tag = "1")]
    pub location_id: Vec<u64>,
    #[prost(int64, repeated, tag = "2")]
    pub value: Vec<i64>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Mapping {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(bool, tag = "7")]
    pub has_functions: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct Location {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(uint64, tag = "2")]
    pub mapping_id: u64,
    #[prost(message, repeated, tag = "4")]
    pub line: Vec<Line>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Line {
    #[prost(uint64, tag = "1")]
    pub function_id: u64,
    #[prost(int64, tag = "2")]
    pub line: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Function {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(int64, tag = "2")]
    pub name: i64,
}

impl Profile {
    /// Resolve an index into the string table.
    #[must_use]
    pub fn string(&self, index: i64) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.string_table.get(i))
            .map(String::as_str)
    }

    /// Write the gzip compressed protobuf encoding of the profile.
    pub fn write<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        let mut encoder = GzEncoder::new(w, Compression::default());
        encoder.write_all(&self.encode_to_vec())?;
        encoder.finish()?;
        Ok(())
    }
}

#[derive(Default)]
struct Builder {
    profile: Profile,
    strings: HashMap<String, i64>,
    locations: HashMap<String, u64>,
}

impl Builder {
    fn new() -> Self {
        let mut builder = Self::default();
        // Index 0 of the string table is always the empty string.
        builder.string("");
        builder
    }

    fn string(&mut self, s: &str) -> i64 {
        if let Some(index) = self.strings.get(s) {
            return *index;
        }
        let index = i64::try_from(self.profile.string_table.len()).unwrap_or(i64::MAX);
        self.profile.string_table.push(s.to_string());
        self.strings.insert(s.to_string(), index);
        index
    }

    fn value_type(&mut self, r#type: &str, unit: &str) -> ValueType {
        ValueType {
            r#type: self.string(r#type),
            unit: self.string(unit),
        }
    }

    /// Location id for a frame, creating its function and location on first
    /// use.
    fn location(&mut self, frame: &str) -> u64 {
        if let Some(id) = self.locations.get(frame) {
            return *id;
        }
        let id = u64::try_from(self.profile.location.len()).unwrap_or(u64::MAX) + 1;
        let name = self.string(frame);
        self.profile.function.push(Function { id, name });
        self.profile.location.push(Location {
            id,
            mapping_id: 1,
            line: vec![Line {
                function_id: id,
                line: 0,
            }],
        });
        self.locations.insert(frame.to_string(), id);
        id
    }
}

/// Build a wall-clock profile from `stacks` sampled at `hz` samples per
/// second.
pub fn to_pprof(stacks: &StackCounter, hz: u32) -> Result<Profile, Error> {
    if hz == 0 {
        return Err(Error::InvalidSampleRate(hz));
    }
    let period = NANOS_PER_SECOND / i64::from(hz);

    let mut builder = Builder::new();
    builder.profile.sample_type = vec![
        builder.value_type("samples", "count"),
        builder.value_type("time", "nanoseconds"),
    ];
    builder.profile.period_type = Some(builder.value_type("wallclock", "nanoseconds"));
    builder.profile.period = period;
    builder.profile.mapping = vec![Mapping {
        id: 1,
        has_functions: true,
    }];

    for (stack, count) in stacks {
        let mut location_id: Vec<u64> = stack
            .split(FRAME_SEPARATOR)
            .map(|frame| builder.location(frame))
            .collect();
        location_id.reverse();

        let count = i64::try_from(*count).unwrap_or(i64::MAX);
        builder.profile.sample.push(Sample {
            location_id,
            value: vec![count, count.saturating_mul(period)],
        });
    }

    Ok(builder.profile)
}
