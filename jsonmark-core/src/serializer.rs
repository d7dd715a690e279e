// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Record encoders used to build the corpus.
//!
//! Each variant produces one line of JSON per record with no embedded newline.

use std::fmt;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::ser::Error as _;
use serde::Serialize;
use serde_json::ser::Formatter;

use crate::dataset::Record;

/// Encoder used to serialize the corpus.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq, Hash)]
pub enum SerializerKind {
    /// Compact UTF-8 output straight from the record type.
    #[default]
    Compact,
    /// Compact output with every non-ASCII character escaped as `\uXXXX`.
    Ascii,
    /// Encode through an intermediate `serde_json::Value` tree.
    Value,
}

impl SerializerKind {
    /// Stable identifier, also used in corpus cache file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SerializerKind::Compact => "compact",
            SerializerKind::Ascii => "ascii",
            SerializerKind::Value => "value",
        }
    }

    fn write_record<W: Write>(&self, writer: &mut W, record: &Record) -> serde_json::Result<()> {
        match self {
            SerializerKind::Compact => serde_json::to_writer(writer, record),
            SerializerKind::Ascii => {
                let mut serializer = serde_json::Serializer::with_formatter(writer, AsciiFormatter);
                record.serialize(&mut serializer)
            }
            SerializerKind::Value => {
                let value = serde_json::to_value(record)?;
                serde_json::to_writer(writer, &value)
            }
        }
    }

    /// Encode one record as a single line of JSON text (without the newline).
    pub fn encode(&self, record: &Record) -> serde_json::Result<String> {
        let mut buf = Vec::with_capacity(256);
        self.write_record(&mut buf, record)?;
        String::from_utf8(buf).map_err(serde_json::Error::custom)
    }

    /// Write one record followed by `\n`.
    pub fn write_line<W: Write>(&self, writer: &mut W, record: &Record) -> serde_json::Result<()> {
        self.write_record(writer, record)?;
        writer.write_all(b"\n").map_err(serde_json::Error::io)
    }
}

impl fmt::Display for SerializerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compact formatter that escapes non-ASCII characters.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{generate, simple_schema, Coordinates};

    const ALL: [SerializerKind; 3] = [
        SerializerKind::Compact,
        SerializerKind::Ascii,
        SerializerKind::Value,
    ];

    fn sample_record() -> Record {
        Record {
            integer_1: -12,
            integer_2: 900,
            float_1: 0.1,
            float_2: -123.456789012345,
            flag: true,
            words: vec!["café".to_string(), "naïve".to_string()],
            sentence: "Snow ☃ and 𝄞 music.".to_string(),
            datetime: "2021-03-04T05:06:07 UTC".to_string(),
            coordinates: Coordinates {
                longitude: 12.5,
                latitude: -45.25,
            },
            null: (),
        }
    }

    #[test]
    fn test_round_trip_all_variants() {
        let records: Vec<Record> = generate(simple_schema, 50, 42)
            .chain(std::iter::once(sample_record()))
            .collect();

        for kind in ALL {
            for record in &records {
                let line = kind.encode(record).unwrap();
                assert!(!line.contains('\n'), "{kind} produced a newline");
                let decoded: Record = serde_json::from_str(&line).unwrap();
                assert_eq!(&decoded, record, "{kind} round trip");
            }
        }
    }

    #[test]
    fn test_field_order_is_declaration_order() {
        let expected = [
            "integer_1",
            "integer_2",
            "float_1",
            "float_2",
            "bool",
            "words",
            "str",
            "datetime",
            "coordinates",
            "null",
        ];
        for kind in ALL {
            let line = kind.encode(&sample_record()).unwrap();
            let positions: Vec<usize> = expected
                .iter()
                .map(|key| line.find(&format!("\"{key}\":")).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "{kind}: {line}");
            assert!(line.ends_with("\"null\":null}"));
        }
    }

    #[test]
    fn test_ascii_escapes_non_ascii() {
        let line = SerializerKind::Ascii.encode(&sample_record()).unwrap();
        assert!(line.is_ascii());
        assert!(line.contains("caf\\u00e9"));
        assert!(line.contains("\\u2603"));
        assert!(line.contains("\\ud834\\udd1e"));
    }

    #[test]
    fn test_compact_and_value_agree() {
        for record in generate(simple_schema, 20, 3) {
            assert_eq!(
                SerializerKind::Compact.encode(&record).unwrap(),
                SerializerKind::Value.encode(&record).unwrap()
            );
        }
    }

    #[test]
    fn test_write_line_appends_newline() {
        let mut buf = Vec::new();
        SerializerKind::Compact
            .write_line(&mut buf, &sample_record())
            .unwrap();
        assert_eq!(buf.last(), Some(&b'\n'));
        assert_eq!(buf.iter().filter(|b| **b == b'\n').count(), 1);
    }

    #[test]
    fn test_names() {
        assert_eq!(SerializerKind::default(), SerializerKind::Compact);
        assert_eq!(SerializerKind::Ascii.to_string(), "ascii");
        assert_eq!(
            SerializerKind::from_str("value", true).unwrap(),
            SerializerKind::Value
        );
        assert!(SerializerKind::from_str("orjson", true).is_err());
    }
}
