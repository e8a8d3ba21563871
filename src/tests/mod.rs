mod marshal;

use std::io::{self, Read, Write};

use crate::{Marshal, PlanBuilder, PlanNode, Plannable, Result};

// =============================================================================
// Fixtures (hand-written plans, the same shape the derive emits)
// =============================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct Reading {
    pub sensor: u16,
    pub value: i32,
    pub flags: [u8; 2],
}

impl Plannable for Reading {
    fn build_plan(builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        let mut fields = builder.composite::<Self>();
        fields.field::<u16>("sensor", |v| &v.sensor, |v| &mut v.sensor)?;
        fields.field::<i32>("value", |v| &v.value, |v| &mut v.value)?;
        fields.field::<[u8; 2]>("flags", |v| &v.flags, |v| &mut v.flags)?;
        Ok(fields.finish())
    }
}

/// Element 0 little-endian, element 1 big-endian.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct Mixed(pub [i16; 2]);

impl Marshal for Mixed {
    const WIDTH: Option<usize> = Some(4);

    fn marshal_to(&self, sink: &mut dyn Write) -> io::Result<usize> {
        sink.write_all(&self.0[0].to_le_bytes())?;
        sink.write_all(&self.0[1].to_be_bytes())?;
        Ok(4)
    }

    fn unmarshal_from(&mut self, source: &mut dyn Read) -> io::Result<usize> {
        let mut buf = [0u8; 2];
        source.read_exact(&mut buf)?;
        self.0[0] = i16::from_le_bytes(buf);
        source.read_exact(&mut buf)?;
        self.0[1] = i16::from_be_bytes(buf);
        Ok(4)
    }
}

impl Plannable for Mixed {
    fn build_plan(_builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        Ok(PlanNode::custom::<Self>())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct Envelope {
    pub seq: u32,
    pub reading: Reading,
    pub trailer: Mixed,
}

impl Plannable for Envelope {
    fn build_plan(builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        let mut fields = builder.composite::<Self>();
        fields.field::<u32>("seq", |v| &v.seq, |v| &mut v.seq)?;
        fields.field::<Reading>("reading", |v| &v.reading, |v| &mut v.reading)?;
        fields.field::<Mixed>("trailer", |v| &v.trailer, |v| &mut v.trailer)?;
        Ok(fields.finish())
    }
}

pub(super) struct WithVec {
    pub id: u32,
    pub items: Vec<u8>,
}

impl Plannable for WithVec {
    fn build_plan(builder: &mut PlanBuilder<'_>) -> Result<PlanNode> {
        let mut fields = builder.composite::<Self>();
        fields.field::<u32>("id", |v| &v.id, |v| &mut v.id)?;
        fields.field::<Vec<u8>>("items", |v| &v.items, |v| &mut v.items)?;
        Ok(fields.finish())
    }
}

pub(super) fn sample_reading() -> Reading {
    Reading {
        sensor: 0x0102,
        value: -2,
        flags: [0xAA, 0x55],
    }
}

pub(super) fn sample_envelope() -> Envelope {
    Envelope {
        seq: 7,
        reading: sample_reading(),
        trailer: Mixed([2, 2]),
    }
}
