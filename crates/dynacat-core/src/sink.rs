use crate::types::DatabaseAndTable;
use std::io::{self, Write};

/// Downstream receiver of ingested records
pub trait Sink {
    fn write_record(&mut self, record: &DatabaseAndTable) -> io::Result<()>;

    /// Flush anything buffered; called once after the last record
    fn close(&mut self) -> io::Result<()>;
}

/// Writes one JSON document per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for JsonLinesSink<W> {
    fn write_record(&mut self, record: &DatabaseAndTable) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
