//! End-to-end tests against a loopback frame receiver

use remote_array::config::MirrorConfig;
use remote_array::frame::{self, FrameHeader};
use remote_array::{Error, LinkState, MirroredArray, NeoPixel, RemoteLed};
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Frame received by the test device: (connection number, header, records)
type Received = (usize, FrameHeader, Vec<u32>);

/// Read whole frames from one connection until EOF or `limit` frames
fn read_frames(
    stream: &mut TcpStream,
    conn: usize,
    limit: Option<usize>,
    tx: &mpsc::Sender<Received>,
) {
    let mut pending = Vec::new();
    let mut chunk = [0u8; 4096];
    let mut frames = 0;

    loop {
        while let Ok((header, records, used)) = frame::decode_one::<u32>(&pending) {
            pending.drain(..used);
            frames += 1;
            if tx.send((conn, header, records)).is_err() {
                return;
            }
            if limit == Some(frames) {
                return;
            }
        }

        match stream.read(&mut chunk) {
            Ok(0) => return,
            Ok(n) => pending.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => return,
        }
    }
}

/// Test device: accepts connections one after another
///
/// The first connection is dropped after `first_conn_limit` frames when set.
fn spawn_device(first_conn_limit: Option<usize>) -> (u16, Receiver<Received>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (conn, stream) in listener.incoming().enumerate() {
            let Ok(mut stream) = stream else { return };
            let limit = if conn == 0 { first_conn_limit } else { None };
            read_frames(&mut stream, conn, limit, &tx);
            // Dropping the stream closes the connection
        }
    });

    (port, rx)
}

fn recv(rx: &Receiver<Received>) -> Received {
    rx.recv_timeout(RECV_TIMEOUT).expect("frame not received")
}

#[test]
fn construct_sends_full_zero_frame() {
    let (port, rx) = spawn_device(None);
    let strip = RemoteLed::connect_with_fill("127.0.0.1", port, 10, 0).unwrap();

    let (conn, header, records) = recv(&rx);
    assert_eq!(conn, 0);
    assert_eq!(header, FrameHeader { offset: 0, length: 10 });
    assert_eq!(records, vec![0u32; 10]);
    assert_eq!(strip.len(), 10);
}

#[test]
fn flush_resends_with_updated_record() {
    let (port, rx) = spawn_device(None);
    let mut strip = RemoteLed::connect("127.0.0.1", port, 10).unwrap();
    let (_, _, first) = recv(&rx);

    strip.set(3, 0xFF00FF00).unwrap();
    strip.flush(false).unwrap();

    let (conn, header, second) = recv(&rx);
    assert_eq!(conn, 0);
    assert_eq!(header, FrameHeader { offset: 0, length: 10 });
    assert_eq!(second[3], 0xFF00FF00);
    for i in (0..10).filter(|&i| i != 3) {
        assert_eq!(second[i], first[i]);
    }
}

#[test]
fn empty_array_sends_empty_frames() {
    let (port, rx) = spawn_device(None);
    let mut strip = RemoteLed::connect("127.0.0.1", port, 0).unwrap();
    strip.flush(false).unwrap();

    for _ in 0..2 {
        let (_, header, records) = recv(&rx);
        assert_eq!(header.length, 0);
        assert!(records.is_empty());
    }
}

#[test]
fn oversized_array_rejected() {
    let (port, rx) = spawn_device(None);
    let result = MirroredArray::<u32>::connect("127.0.0.1", port, 65536);
    assert!(matches!(result, Err(Error::EncodingOverflow { count: 65536 })));
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn dropped_connection_is_recovered() {
    // Device hangs up after the construction frame
    let (port, rx) = spawn_device(Some(1));
    let mut strip = RemoteLed::connect("127.0.0.1", port, 4).unwrap();
    assert_eq!(recv(&rx).0, 0);

    strip.set(1, 0x00ABCDEF).unwrap();

    // The first writes after the hangup may still be buffered by the OS;
    // keep flushing until the failure surfaces and the policy runs.
    for _ in 0..100 {
        strip.flush(false).unwrap();
        if strip.stats().reconnects == 1 {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(strip.stats().reconnects, 1);
    assert_eq!(strip.link_state(), LinkState::Connected);

    let (conn, header, records) = recv(&rx);
    assert_eq!(conn, 1);
    assert_eq!(header.length, 4);
    assert_eq!(records, vec![0, 0x00ABCDEF, 0, 0]);
}

#[test]
fn close_then_flush_fails() {
    let (port, rx) = spawn_device(None);
    let mut strip = RemoteLed::connect("127.0.0.1", port, 2).unwrap();
    recv(&rx);

    strip.close();
    strip.close();
    assert!(matches!(strip.flush(false), Err(Error::Closed)));
}

#[test]
fn unresolvable_host() {
    let result = RemoteLed::connect("no-such-host.invalid", 9999, 4);
    assert!(matches!(result, Err(Error::Resolution { .. })));
}

#[test]
fn connection_refused() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let result = RemoteLed::connect("127.0.0.1", port, 4);
    assert!(matches!(result, Err(Error::Connect { .. })));
}

#[test]
fn neopixel_from_config_file() {
    let (port, rx) = spawn_device(None);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strip.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[endpoint]\nhost = \"127.0.0.1\"\nport = {}\n\n[strip]\ncount = 5\n\n[transport]\nnodelay = true\nwrite_timeout_ms = 2000\n",
        port
    )
    .unwrap();

    let config = MirrorConfig::from_file(&path).unwrap();
    let mut pixels = NeoPixel::new(config.strip.count, &config.endpoint.host, config.endpoint.port)
        .unwrap();
    recv(&rx);

    pixels.set_pixel_color_rgb(4, 0, 0, 255, 0).unwrap();
    pixels.show().unwrap();

    let (_, header, records) = recv(&rx);
    assert_eq!(header.length, 5);
    assert_eq!(records[4], 0x000000FF);

    // Config round trip through a file
    let copy = dir.path().join("copy.toml");
    config.to_file(&copy).unwrap();
    assert_eq!(MirrorConfig::from_file(&copy).unwrap(), config);
}
