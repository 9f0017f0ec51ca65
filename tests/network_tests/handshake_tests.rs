//! Handshake Tests
//!
//! Byte-exact checks of the ack / no-ack sub-protocol, driven over a raw
//! socket so every `+` the server sends is visible.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use gdbmock::network::{Connection, Handshake};
use gdbmock::protocol::frame;
use gdbmock::{Config, Responder, Server};

// =============================================================================
// Helper Functions
// =============================================================================

fn start_server() -> (Server, SocketAddr) {
    let mut server = Server::new(Config::default());
    let addr = server.start().unwrap();
    (server, addr)
}

fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream
}

fn send(stream: &mut TcpStream, bytes: &[u8]) {
    stream.write_all(bytes).unwrap();
}

fn send_packet(stream: &mut TcpStream, payload: &str) {
    send(stream, &frame(payload.as_bytes()));
}

fn expect(stream: &mut TcpStream, expected: &[u8]) {
    let mut buf = vec![0u8; expected.len()];
    stream.read_exact(&mut buf).unwrap();
    assert_eq!(
        String::from_utf8_lossy(&buf),
        String::from_utf8_lossy(expected)
    );
}

/// Nothing further arrives within a short window
fn expect_silence(stream: &mut TcpStream) {
    stream
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    let mut buf = [0u8; 1];
    match stream.read(&mut buf) {
        Ok(n) => panic!("Expected silence, got {:?}", &buf[..n]),
        Err(e) => assert!(
            matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            "unexpected error: {}",
            e
        ),
    }
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
}

// =============================================================================
// Initial Ack Tests
// =============================================================================

#[test]
fn test_initial_ack_is_answered_once() {
    let (mut server, addr) = start_server();
    let mut stream = connect(addr);

    send(&mut stream, b"+");
    expect(&mut stream, b"+");
    expect_silence(&mut stream);

    server.stop().unwrap();
}

// =============================================================================
// Ack Mode Tests
// =============================================================================

#[test]
fn test_replies_preceded_by_ack_in_ack_mode() {
    let (mut server, addr) = start_server();
    let mut stream = connect(addr);

    send_packet(&mut stream, "?");
    expect(&mut stream, b"+$S02#b5");

    // Ack the reply; it was expected, so nothing is echoed
    send(&mut stream, b"+");
    send_packet(&mut stream, "qC");
    expect(&mut stream, b"+$QC0#c4");

    server.stop().unwrap();
}

#[test]
fn test_unexpected_ack_after_expected_one_is_echoed() {
    let (mut server, addr) = start_server();
    let mut stream = connect(addr);

    send_packet(&mut stream, "?");
    expect(&mut stream, b"+$S02#b5");

    send(&mut stream, b"+");
    expect_silence(&mut stream);

    send(&mut stream, b"+");
    expect(&mut stream, b"+");

    server.stop().unwrap();
}

// =============================================================================
// No-Ack Negotiation Tests
// =============================================================================

#[test]
fn test_full_handshake_sequence() {
    let (mut server, addr) = start_server();
    let mut stream = connect(addr);

    send(&mut stream, b"+");
    expect(&mut stream, b"+");

    send_packet(&mut stream, "QStartNoAckMode");
    expect(&mut stream, b"+$OK#9a");
    send(&mut stream, b"+");

    send_packet(&mut stream, "qC");
    expect(&mut stream, b"$QC0#c4");

    send_packet(&mut stream, "?");
    expect(&mut stream, b"$S02#b5");

    server.stop().unwrap();

    // The server answers QStartNoAckMode itself
    assert_eq!(server.packet_log().entries(), vec!["qC", "?"]);
}

#[test]
fn test_pipelined_commands_answered_in_order() {
    let (mut server, addr) = start_server();
    let mut stream = connect(addr);

    send_packet(&mut stream, "QStartNoAckMode");
    expect(&mut stream, b"+$OK#9a");
    send(&mut stream, b"+");

    // Three commands in a single write
    let mut batch = frame(b"qC");
    batch.extend_from_slice(&frame(b"?"));
    batch.extend_from_slice(&frame(b"qfThreadInfo"));
    send(&mut stream, &batch);

    expect(&mut stream, b"$QC0#c4$S02#b5$l#6c");

    server.stop().unwrap();
    assert_eq!(
        server.packet_log().entries(),
        vec!["qC", "?", "qfThreadInfo"]
    );
}

#[test]
fn test_ack_and_packet_in_one_write() {
    let (mut server, addr) = start_server();
    let mut stream = connect(addr);

    let mut batch = b"+".to_vec();
    batch.extend_from_slice(&frame(b"qC"));
    send(&mut stream, &batch);

    // Echoed initial ack, then the ack-prefixed reply
    expect(&mut stream, b"++$QC0#c4");

    server.stop().unwrap();
}

// =============================================================================
// Connection State Tests
// =============================================================================

#[test]
fn test_connection_handshake_state() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let session = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut connection = Connection::new(stream, Responder::default(), &Config::default()).unwrap();
        assert_eq!(connection.handshake(), Handshake::default());
        connection.handle().unwrap();
        connection.handshake()
    });

    let mut stream = connect(addr);
    send_packet(&mut stream, "QStartNoAckMode");
    expect(&mut stream, b"+$OK#9a");
    send(&mut stream, b"+");
    send_packet(&mut stream, "qC");
    expect(&mut stream, b"$QC0#c4");
    drop(stream);

    let handshake = session.join().unwrap();
    assert!(!handshake.send_acks);
    assert!(!handshake.expecting_ack);
}
