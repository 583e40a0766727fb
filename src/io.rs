//! I/O utilities.
use std::io::{Read, Result, Write};

/// Glues a read half and a write half into one bidirectional stream, so a
/// [`StreamServer`](crate::server::StreamServer) can be fed from plain
/// in-memory buffers. The end-to-end tests and doc examples run the whole
/// request path this way, no sockets involved.
pub struct ReadWriteAdapter<R: Read, W: Write> {
    input: R,
    output: W,
}

impl<R: Read, W: Write> ReadWriteAdapter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: Read, W: Write> Read for ReadWriteAdapter<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.input.read(buf)
    }
}

impl<R: Read, W: Write> Write for ReadWriteAdapter<R, W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.output.write(buf)
    }
    fn flush(&mut self) -> Result<()> {
        self.output.flush()
    }
}
