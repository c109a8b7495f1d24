pub mod frame;
pub mod transmitter;

pub use frame::{chunk_count, pad_field, FrameHeader, CHUNK_SIZE, HEADER_LEN};
pub use transmitter::{ChunkPolicy, TransferReport, TransferState, Transmitter};

use crate::error::Error;
use crate::progress::ProgressReporter;
use std::fs::File;
use std::io::BufReader;
use std::net::TcpStream;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Open the single connection used for a transfer. No timeout is set.
pub fn connect(endpoint: &str) -> Result<TcpStream, Error> {
    let stream = TcpStream::connect(endpoint)?;
    info!("Connected to {}", endpoint);
    Ok(stream)
}

/// Send the file at `path` as one framed transfer named `name`.
pub fn send_file(
    stream: TcpStream,
    path: &Path,
    name: &str,
    policy: ChunkPolicy,
    reporter: &dyn ProgressReporter,
) -> Result<TransferReport, Error> {
    let file = File::open(path)?;
    let payload_len = file.metadata()?.len();
    let header = FrameHeader::new(payload_len, name);

    reporter.on_transmit_start(payload_len);
    let start = Instant::now();

    let mut transmitter = Transmitter::new(stream, policy);
    transmitter.send_header(&header)?;
    info!("Sending {} ...", name);
    transmitter.stream_body(BufReader::new(file), reporter)?;
    let report = transmitter.finish()?;

    reporter.on_transmit_complete(report.payload_sent, start.elapsed().as_secs_f64());
    info!(
        "{} has been sent: {} in {} chunks",
        name,
        crate::utils::byte_count_si(report.payload_sent),
        report.chunks
    );
    Ok(report)
}
