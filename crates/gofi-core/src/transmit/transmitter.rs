use super::frame::{FrameHeader, CHUNK_SIZE};
use crate::error::Error;
use crate::progress::ProgressReporter;
use std::io::{self, Read, Write};
use tracing::{debug, error};

/// Transfer lifecycle. Every failed write moves to `Failed`, which is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Connected,
    HeaderSent,
    BodyStreaming,
    Done,
    Failed,
}

/// How the last, partial chunk goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkPolicy {
    /// Stop at the declared length.
    #[default]
    Exact,
    /// Always write the whole 2048-byte buffer. Bytes past the declared
    /// length are left over from the previous chunk; receivers must truncate
    /// by the header's size field.
    FullBuffer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub declared_len: u64,
    pub payload_sent: u64,
    /// Header plus body bytes, padding included.
    pub bytes_written: u64,
    pub chunks: u64,
}

/// Client side of the framed transfer over any byte sink. No acknowledgement
/// is read; success means every local write returned.
pub struct Transmitter<W: Write> {
    out: W,
    state: TransferState,
    policy: ChunkPolicy,
    declared_len: u64,
    payload_sent: u64,
    bytes_written: u64,
    chunks: u64,
}

impl<W: Write> Transmitter<W> {
    pub fn new(out: W, policy: ChunkPolicy) -> Self {
        Self {
            out,
            state: TransferState::Connected,
            policy,
            declared_len: 0,
            payload_sent: 0,
            bytes_written: 0,
            chunks: 0,
        }
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn send_header(&mut self, header: &FrameHeader) -> Result<(), Error> {
        self.require_state(TransferState::Connected, "header already sent")?;
        let encoded = match header.encode() {
            Ok(encoded) => encoded,
            Err(err) => return self.fail(err),
        };
        debug!("Sending name and size of {} ({} bytes)", header.name, header.payload_len);
        if let Err(err) = self.out.write_all(&encoded) {
            return self.fail(err.into());
        }
        self.bytes_written += encoded.len() as u64;
        self.declared_len = header.payload_len;
        self.state = TransferState::HeaderSent;
        Ok(())
    }

    /// Stream exactly the declared number of bytes from `payload`.
    pub fn stream_body<R: Read>(
        &mut self,
        payload: R,
        reporter: &dyn ProgressReporter,
    ) -> Result<(), Error> {
        self.require_state(TransferState::HeaderSent, "body requires a sent header")?;
        self.state = TransferState::BodyStreaming;

        let mut reader = payload.take(self.declared_len);
        let mut buffer = [0u8; CHUNK_SIZE];
        loop {
            let n = match fill_chunk(&mut reader, &mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) => return self.fail(err.into()),
            };
            let wire = match self.policy {
                ChunkPolicy::Exact => &buffer[..n],
                ChunkPolicy::FullBuffer => &buffer[..],
            };
            if let Err(err) = self.out.write_all(wire) {
                return self.fail(err.into());
            }
            self.payload_sent += n as u64;
            self.bytes_written += wire.len() as u64;
            self.chunks += 1;
            reporter.on_transmit_progress(self.payload_sent, self.declared_len);
        }

        if self.payload_sent != self.declared_len {
            return self.fail(Error::Transfer("payload ended before the declared length"));
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<TransferReport, Error> {
        self.require_state(TransferState::BodyStreaming, "nothing to finish")?;
        if let Err(err) = self.out.flush() {
            return self.fail(err.into());
        }
        self.state = TransferState::Done;
        Ok(TransferReport {
            declared_len: self.declared_len,
            payload_sent: self.payload_sent,
            bytes_written: self.bytes_written,
            chunks: self.chunks,
        })
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn require_state(&mut self, state: TransferState, msg: &'static str) -> Result<(), Error> {
        if self.state == state {
            Ok(())
        } else {
            self.fail(Error::Transfer(msg))
        }
    }

    fn fail<T>(&mut self, err: Error) -> Result<T, Error> {
        error!("Transfer failed in state {:?}: {}", self.state, err);
        self.state = TransferState::Failed;
        Err(err)
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn fill_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
