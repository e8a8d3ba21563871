use std::io::{self, Read, Write};

use super::{Envelope, Mixed, sample_envelope, sample_reading};
use crate::{Encoding, Error, Marshal, PlanBuilder, PlanNode, Plannable, Result};

/// Writes two bytes but claims four.
#[derive(Default)]
struct Overclaims;

impl Marshal for Overclaims {
    fn marshal_to(&self, sink: &mut dyn Write) -> io::Result<usize> {
        sink.write_all(&[1, 2])?;
        Ok(4)
    }

    fn unmarshal_from(&mut self, source: &mut dyn Read) -> io::Result<usize> {
        let mut buf = [0u8; 2];
        source.read_exact(&mut buf)?;
        Ok(4)
    }
}

impl Plannable for Overclaims {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        Ok(PlanNode::custom::<Self>())
    }
}

/// Declares three bytes, moves four.
#[derive(Default)]
struct WrongWidth(u32);

impl Marshal for WrongWidth {
    const WIDTH: Option<usize> = Some(3);

    fn marshal_to(&self, sink: &mut dyn Write) -> io::Result<usize> {
        sink.write_all(&self.0.to_be_bytes())?;
        Ok(4)
    }

    fn unmarshal_from(&mut self, source: &mut dyn Read) -> io::Result<usize> {
        let mut buf = [0u8; 4];
        source.read_exact(&mut buf)?;
        self.0 = u32::from_be_bytes(buf);
        Ok(4)
    }
}

impl Plannable for WrongWidth {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        Ok(PlanNode::custom::<Self>())
    }
}

/// Always fails, after writing a partial byte.
#[derive(Default)]
struct Refuses;

impl Marshal for Refuses {
    fn marshal_to(&self, sink: &mut dyn Write) -> io::Result<usize> {
        sink.write_all(&[0xFF])?;
        Err(io::Error::other("refused"))
    }

    fn unmarshal_from(&mut self, _source: &mut dyn Read) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::InvalidData, "refused"))
    }
}

impl Plannable for Refuses {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        Ok(PlanNode::custom::<Self>())
    }
}

/// Unmarshals into a copy of itself and drops it.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct CopyMixed([i16; 2]);

impl Marshal for CopyMixed {
    const WIDTH: Option<usize> = Some(4);

    fn marshal_to(&self, sink: &mut dyn Write) -> io::Result<usize> {
        Mixed(self.0).marshal_to(sink)
    }

    fn unmarshal_from(&mut self, source: &mut dyn Read) -> io::Result<usize> {
        let mut copy = Mixed(self.0);
        copy.unmarshal_from(source)
    }
}

impl Plannable for CopyMixed {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        Ok(PlanNode::custom::<Self>())
    }
}

// =============================================================================
// Dispatch
// =============================================================================

#[test]
fn test_custom_leaf_owns_its_layout() {
    let enc = Encoding::default();
    let bytes = enc.encode_to_vec(&[&Mixed([2, 2])]).unwrap();
    assert_eq!(bytes, [0x02, 0x00, 0x00, 0x02]);

    let bytes = enc.encode_to_vec(&[&Mixed([0x0102, -1])]).unwrap();
    assert_eq!(bytes, [0x02, 0x01, 0xFF, 0xFF]);
}

#[test]
fn test_unmarshal_writes_through_destination() {
    let enc = Encoding::default();
    let original = sample_envelope();
    let bytes = enc.encode_to_vec(&[&original]).unwrap();

    let mut decoded = Envelope::default();
    enc.decode_from_slice(&bytes, &mut [&mut decoded]).unwrap();
    assert_eq!(decoded.trailer, Mixed([2, 2]));
    assert_eq!(enc.encode_to_vec(&[&decoded]).unwrap(), bytes);
}

#[test]
fn test_copy_mutation_breaks_roundtrip() {
    let enc = Encoding::default();
    let original = CopyMixed([2, 2]);
    let bytes = enc.encode_to_vec(&[&original]).unwrap();

    let mut decoded = CopyMixed::default();
    let read = enc.decode_from_slice(&bytes, &mut [&mut decoded]).unwrap();

    // The bytes were consumed, but the destination never saw them.
    assert_eq!(read, 4);
    assert_eq!(decoded, CopyMixed([0, 0]));
    assert_ne!(decoded, original);
    assert_ne!(enc.encode_to_vec(&[&decoded]).unwrap(), bytes);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_marshal_failure_stops_the_write() {
    let enc = Encoding::default();
    let reading = sample_reading();
    let mut sink = Vec::new();

    let err = enc
        .write(&mut sink, &[&reading, &Refuses, &reading])
        .unwrap_err();
    assert_eq!(err.bytes(), 8);
    // The partial byte from the failing leaf never reached the sink.
    assert_eq!(sink.len(), 8);
    assert!(matches!(err.error(), Error::Marshal { type_name, .. } if type_name.ends_with("Refuses")));
}

#[test]
fn test_unmarshal_failure_stops_the_read() {
    let enc = Encoding::default();
    let mut first = 0u8;
    let mut refuses = Refuses;
    let mut last = 0u8;

    let err = enc
        .decode_from_slice(&[7, 8, 9], &mut [&mut first, &mut refuses, &mut last])
        .unwrap_err();
    assert!(matches!(err, Error::Unmarshal { .. }));
    assert!(!err.is_truncation());
    assert_eq!(first, 7);
    assert_eq!(last, 0);
}

#[test]
fn test_reported_count_must_match_stream() {
    let enc = Encoding::default();
    let err = enc.encode_to_vec(&[&Overclaims]).unwrap_err();
    match err {
        Error::Marshal { source, .. } => {
            assert_eq!(source.kind(), io::ErrorKind::InvalidData);
            assert!(source.to_string().contains("reported 4 bytes but moved 2"));
        }
        other => panic!("expected Marshal, got {other:?}"),
    }

    let mut target = Overclaims;
    let err = enc
        .decode_from_slice(&[1, 2, 3, 4], &mut [&mut target])
        .unwrap_err();
    assert!(matches!(err, Error::Unmarshal { .. }));
}

#[test]
fn test_reported_count_must_match_declared_width() {
    let enc = Encoding::default();
    assert_eq!(enc.width_of::<WrongWidth>().unwrap(), Some(3));

    let err = enc.encode_to_vec(&[&WrongWidth(1)]).unwrap_err();
    assert!(matches!(err, Error::Marshal { .. }));

    let mut target = WrongWidth::default();
    let err = enc
        .decode_from_slice(&[0, 0, 0, 1], &mut [&mut target])
        .unwrap_err();
    assert!(matches!(err, Error::Unmarshal { .. }));
}

#[test]
fn test_truncated_custom_leaf() {
    let enc = Encoding::default();
    let mut target = Mixed::default();
    let err = enc
        .read(&mut &[0x02u8, 0x00, 0x00][..], &mut [&mut target])
        .unwrap_err();
    assert_eq!(err.bytes(), 3);
    assert!(err.error().is_truncation());
    match err.into_error() {
        Error::Unmarshal { source, .. } => assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("expected Unmarshal, got {other:?}"),
    }
    // The first element was complete and stays decoded.
    assert_eq!(target.0[0], 2);
}
