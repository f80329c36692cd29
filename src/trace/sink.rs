use std::io::{self, Write};
use std::sync::mpsc;

use super::HopResult;
use crate::{TraceError, TraceResult};

/// Receives every [`HopResult`] of a trace, in increasing TTL order, as soon
/// as it is known.
///
/// An error from the sink aborts the trace.
pub trait HopSink {
    fn accept(&mut self, hop: HopResult) -> TraceResult<()>;
}

/// Accumulates the hops; the full route is available once the trace ends.
impl HopSink for Vec<HopResult> {
    fn accept(&mut self, hop: HopResult) -> TraceResult<()> {
        self.push(hop);
        Ok(())
    }
}

/// Prints one line per hop as it is produced.
pub struct StreamingSink<W> {
    writer: W,
}

impl<W: Write> StreamingSink<W> {
    pub fn new(writer: W) -> Self {
        StreamingSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HopSink for StreamingSink<W> {
    fn accept(&mut self, hop: HopResult) -> TraceResult<()> {
        writeln!(self.writer, "{hop}").map_err(TraceError::Sink)?;
        self.writer.flush().map_err(TraceError::Sink)
    }
}

/// Calls a closure per hop.
pub struct FnSink<F>(pub F);

impl<F: FnMut(&HopResult)> HopSink for FnSink<F> {
    fn accept(&mut self, hop: HopResult) -> TraceResult<()> {
        (self.0)(&hop);
        Ok(())
    }
}

/// Hands hops to another thread. A closed receiver aborts the trace.
impl HopSink for mpsc::SyncSender<HopResult> {
    fn accept(&mut self, hop: HopResult) -> TraceResult<()> {
        self.send(hop)
            .map_err(|_| TraceError::Sink(io::Error::new(io::ErrorKind::BrokenPipe, "hop receiver closed")))
    }
}
