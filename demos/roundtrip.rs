//! Write a few records to a file and read them back.
//!
//! Run: cargo run --example roundtrip -- [big|little] [path]

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use fixbuf::{ByteOrder, Encoding, Marshal, Plannable};

/// Packed major/minor, one byte, independent of the configured order.
#[derive(Plannable, Debug, Default, Clone, Copy, PartialEq)]
#[fixbuf(marshal)]
struct Version {
    major: u8,
    minor: u8,
}

impl Marshal for Version {
    const WIDTH: Option<usize> = Some(1);

    fn marshal_to(&self, sink: &mut dyn Write) -> io::Result<usize> {
        sink.write_all(&[self.major << 4 | self.minor & 0x0f])?;
        Ok(1)
    }

    fn unmarshal_from(&mut self, source: &mut dyn Read) -> io::Result<usize> {
        let mut byte = [0u8; 1];
        source.read_exact(&mut byte)?;
        self.major = byte[0] >> 4;
        self.minor = byte[0] & 0x0f;
        Ok(1)
    }
}

#[derive(Plannable, Debug, Default, Clone, Copy, PartialEq)]
struct Record {
    version: Version,
    id: u32,
    position: [f32; 3],
    active: bool,
}

fn main() {
    let mut args = std::env::args().skip(1);
    let order: ByteOrder = match args.next().map(|s| s.parse()) {
        Some(Ok(order)) => order,
        Some(Err(e)) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        None => ByteOrder::default(),
    };
    let path = args
        .next()
        .map(Into::into)
        .unwrap_or_else(|| std::env::temp_dir().join("fixbuf-demo.bin"));

    let encoding = Encoding::from(order);
    let records: Vec<Record> = (0..4)
        .map(|i| Record {
            version: Version { major: 1, minor: i as u8 },
            id: 1000 + i,
            position: [i as f32, -(i as f32), 0.5],
            active: i % 2 == 0,
        })
        .collect();

    let width = encoding.width_of::<Record>().expect("plan");
    println!("{order}: {width:?} bytes per record");

    let mut out = BufWriter::new(File::create(&path).expect("create output"));
    let values: Vec<&dyn fixbuf::Value> = records.iter().map(|r| r as &dyn fixbuf::Value).collect();
    let written = encoding.write(&mut out, &values).expect("write records");
    out.flush().expect("flush");
    println!("wrote {written} bytes to {}", path.display());

    let mut input = BufReader::new(File::open(&path).expect("open input"));
    let mut decoded = [Record::default(); 4];
    let mut dests: Vec<&mut dyn fixbuf::Value> =
        decoded.iter_mut().map(|r| r as &mut dyn fixbuf::Value).collect();
    let read = encoding.read(&mut input, &mut dests).expect("read records");
    println!("read {read} bytes");

    for record in &decoded {
        println!("{record:?}");
    }
    assert_eq!(decoded.as_slice(), records.as_slice());
}
