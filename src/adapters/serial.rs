//! Line-oriented telemetry over any byte sink.
//!
//! On the device the sink is the serial port opened as a file; on a host
//! it is usually stdout.  Each record is written as one line and flushed
//! immediately so a reader on the other end never sees half a record.

use std::io::{self, Write};

use log::debug;

use crate::app::ports::TelemetryPort;
use crate::app::telemetry::StatusRecord;
use crate::error::TelemetryError;

pub struct SerialTelemetry<W> {
    out: W,
    /// Records written so far.
    sent: u64,
}

impl<W: Write> SerialTelemetry<W> {
    pub fn new(out: W) -> Self {
        Self { out, sent: 0 }
    }
}

impl<W: Write> TelemetryPort for SerialTelemetry<W> {
    fn emit(&mut self, record: &StatusRecord) -> Result<(), TelemetryError> {
        writeln!(self.out, "{record}")
            .and_then(|()| self.out.flush())
            .map_err(classify)?;
        self.sent += 1;
        debug!("Telemetry #{}: {record}", self.sent);
        Ok(())
    }
}

fn classify(err: io::Error) -> TelemetryError {
    match err.kind() {
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted => TelemetryError::Disconnected,
        _ => TelemetryError::WriteFailed,
    }
}
