use gofi_core::progress::SilentReporter;
use gofi_core::transmit::{
    self, chunk_count, ChunkPolicy, FrameHeader, Transmitter, CHUNK_SIZE, HEADER_LEN,
};
use proptest::prelude::*;
use std::fs;
use std::io::Read;
use std::net::TcpListener;
use std::thread;
use tempfile::tempdir;

/// Accept one connection and return the decoded header and the raw body.
fn spawn_receiver() -> (String, thread::JoinHandle<(FrameHeader, Vec<u8>)>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let handle = thread::spawn(move || {
        let (mut conn, _) = listener.accept().unwrap();
        let mut header = [0u8; HEADER_LEN];
        conn.read_exact(&mut header).unwrap();
        let mut body = Vec::new();
        conn.read_to_end(&mut body).unwrap();
        (FrameHeader::decode(&header).unwrap(), body)
    });
    (addr, handle)
}

#[test]
fn test_send_file_over_loopback() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("payload.db");
    let payload: Vec<u8> = (0..7000u32).map(|i| (i * 7) as u8).collect();
    fs::write(&path, &payload).unwrap();

    let (addr, receiver) = spawn_receiver();
    let stream = transmit::connect(&addr).unwrap();
    let report = transmit::send_file(
        stream,
        &path,
        "gofi_loopback.db",
        ChunkPolicy::Exact,
        &SilentReporter,
    )
    .unwrap();

    let (header, body) = receiver.join().unwrap();
    assert_eq!(header.name, "gofi_loopback.db");
    assert_eq!(header.payload_len, 7000);
    assert_eq!(body, payload);
    assert_eq!(report.chunks, 4);
    assert_eq!(report.bytes_written, (HEADER_LEN + 7000) as u64);
}

#[test]
fn test_full_buffer_receiver_truncates_to_declared_size() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("payload.db");
    fs::write(&path, vec![b'x'; 3000]).unwrap();

    let (addr, receiver) = spawn_receiver();
    let stream = transmit::connect(&addr).unwrap();
    transmit::send_file(stream, &path, "pad.db", ChunkPolicy::FullBuffer, &SilentReporter)
        .unwrap();

    let (header, body) = receiver.join().unwrap();
    assert_eq!(body.len(), 2 * CHUNK_SIZE);
    let declared = header.payload_len as usize;
    assert!(body[..declared].iter().all(|b| *b == b'x'));
}

#[test]
fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    assert!(transmit::connect(&addr).is_err());
}

#[test]
fn test_name_longer_than_field_is_rejected_before_writing() {
    let mut tx = Transmitter::new(Vec::new(), ChunkPolicy::Exact);
    let name = "n".repeat(65);
    assert!(tx.send_header(&FrameHeader::new(1, name)).is_err());
    assert!(tx.into_inner().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_wire_length_matches_policy(
        len in 0usize..9000,
        name in "[a-z0-9_.]{1,64}",
        full in any::<bool>(),
    ) {
        let payload = vec![0xA5u8; len];
        let policy = if full { ChunkPolicy::FullBuffer } else { ChunkPolicy::Exact };
        let mut tx = Transmitter::new(Vec::new(), policy);
        tx.send_header(&FrameHeader::new(len as u64, name.clone())).unwrap();
        tx.stream_body(&payload[..], &SilentReporter).unwrap();
        let report = tx.finish().unwrap();
        let wire = tx.into_inner();

        let chunks = chunk_count(len as u64);
        prop_assert_eq!(report.chunks, chunks);
        let expected_body = if full { chunks as usize * CHUNK_SIZE } else { len };
        prop_assert_eq!(wire.len(), HEADER_LEN + expected_body);

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&wire[..HEADER_LEN]);
        let decoded = FrameHeader::decode(&header).unwrap();
        prop_assert_eq!(decoded.payload_len, len as u64);
        prop_assert_eq!(decoded.name, name);
        prop_assert_eq!(&wire[HEADER_LEN..HEADER_LEN + len], &payload[..]);
    }
}
