//! Client tests against an in-process fake scale

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use pretty_assertions::assert_eq;
use scalelink::{
    AsciiFrame, AsciiOptions, Error, FrameError, ProtocolVariant, Scale, ScaleClient,
    ScaleConfig, SessionConfig, SessionOutcome, TransportError, WeighingSession, WeightReading,
};

const PING_REQUEST: &str = "f855ce020091040491";
const WEIGHT_REQUEST: &str = "f855ce0100a0a000";
const PING_ACK: &str = "f855ce0100515100";
const WEIGHT_45230_STABLE: &str = "f855ce070010aeb00000010188b3";

/// What the fake scale does with one connection
enum Reply {
    /// Write these bytes, then close
    Bytes(Vec<u8>),
    /// Keep the connection open without answering
    Silent(Duration),
}

fn hex_reply(s: &str) -> Reply {
    Reply::Bytes(hex::decode(s).unwrap())
}

/// Serve one connection per reply, in order, and return the requests received
async fn fake_scale(replies: Vec<Reply>) -> (u16, JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();

        for reply in replies {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut buf = [0u8; 64];
            let n = stream.read(&mut buf).await.unwrap();
            requests.push(buf[..n].to_vec());

            match reply {
                Reply::Bytes(bytes) => {
                    stream.write_all(&bytes).await.unwrap();
                    let _ = stream.shutdown().await;
                }
                Reply::Silent(hold) => tokio::time::sleep(hold).await,
            }
        }

        requests
    });

    (port, handle)
}

/// Serve a single connection without closing it first
///
/// Writes `reply` (if any), then reports how many bytes the next read on the
/// connection returns. Zero means the client closed its end.
async fn open_ended_scale(reply: Option<Vec<u8>>) -> (u16, JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut buf = [0u8; 64];
        stream.read(&mut buf).await.unwrap();

        if let Some(reply) = reply {
            stream.write_all(&reply).await.unwrap();
        }

        tokio::time::timeout(Duration::from_secs(2), stream.read(&mut buf))
            .await
            .expect("client left the connection open")
            .unwrap_or(0)
    });

    (port, handle)
}

fn client(port: u16) -> ScaleClient {
    ScaleClient::new(
        ScaleConfig::new("127.0.0.1")
            .with_port(port)
            .with_connect_timeout(Duration::from_millis(500))
            .with_round_trip_timeout(Duration::from_millis(500)),
    )
}

#[tokio::test]
async fn test_ping() {
    let (port, server) = fake_scale(vec![hex_reply(PING_ACK)]).await;

    assert!(client(port).ping().await);

    let requests = server.await.unwrap();
    assert_eq!(hex::encode(&requests[0]), PING_REQUEST);
}

#[tokio::test]
async fn test_ping_bad_crc_is_false() {
    let (port, server) = fake_scale(vec![hex_reply("f855ce0100515101")]).await;

    assert!(!client(port).ping().await);
    server.await.unwrap();
}

#[tokio::test]
async fn test_ping_wrong_response_is_false() {
    let (port, server) = fake_scale(vec![hex_reply(WEIGHT_45230_STABLE)]).await;

    let client = client(port);
    assert!(!client.ping().await);
    server.await.unwrap();
}

#[tokio::test]
async fn test_ping_no_listener_is_false() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = client(port);
    assert!(!client.ping().await);
    assert!(matches!(
        client.probe().await,
        Err(Error::Transport(TransportError::ConnectFailed { .. }))
    ));
}

#[tokio::test]
async fn test_read_weight() {
    let (port, server) = fake_scale(vec![hex_reply(WEIGHT_45230_STABLE)]).await;

    let reading = client(port).read_weight().await.unwrap();
    assert_eq!(reading, WeightReading::new(45230, 1, true));
    assert!((reading.weight_kg() - 45.230).abs() < 1e-9);

    let requests = server.await.unwrap();
    assert_eq!(hex::encode(&requests[0]), WEIGHT_REQUEST);
}

#[tokio::test]
async fn test_read_negative_weight() {
    let (port, server) = fake_scale(vec![hex_reply("f855ce0700100cfeffff020034ac")]).await;

    let reading = client(port).read_weight().await.unwrap();
    assert_eq!(reading, WeightReading::new(-500, 2, false));
    assert!((reading.weight_kg() + 5.0).abs() < 1e-9);
    server.await.unwrap();
}

#[tokio::test]
async fn test_read_weight_crc_mismatch() {
    let (port, server) = fake_scale(vec![hex_reply("f855ce070010aeb00000010188b4")]).await;

    let result = client(port).read_weight().await;
    assert!(matches!(
        result,
        Err(Error::Frame(FrameError::CrcMismatch {
            calculated: 0xB388,
            received: 0xB488
        }))
    ));
    server.await.unwrap();
}

#[tokio::test]
async fn test_read_weight_unexpected_response() {
    let (port, server) = fake_scale(vec![hex_reply(PING_ACK)]).await;

    let result = client(port).read_weight().await;
    assert!(matches!(result, Err(Error::UnexpectedResponse(0x51))));
    server.await.unwrap();
}

#[tokio::test]
async fn test_peer_close_mid_packet() {
    let (port, server) = fake_scale(vec![hex_reply("f855ce070010ae")]).await;

    let err = client(port).read_weight().await.unwrap_err();
    assert!(err.is_disconnect(), "unexpected error: {}", err);
    server.await.unwrap();
}

#[tokio::test]
async fn test_silent_scale_times_out() {
    let (port, server) = fake_scale(vec![Reply::Silent(Duration::from_secs(1))]).await;

    let client = ScaleClient::new(
        ScaleConfig::new("127.0.0.1")
            .with_port(port)
            .with_round_trip_timeout(Duration::from_millis(100)),
    );

    let err = client.read_weight().await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Timeout(_))));
    assert!(!err.is_disconnect());
    server.await.unwrap();
}

#[tokio::test]
async fn test_ascii_read_weight() {
    let reply = AsciiFrame::encode_response(0x01, b'R', b"123.45");
    let (port, server) = fake_scale(vec![Reply::Bytes(reply.to_vec())]).await;

    let client = ScaleClient::new(
        ScaleConfig::new("127.0.0.1")
            .with_port(port)
            .with_variant(ProtocolVariant::Ascii(AsciiOptions::default())),
    );

    let reading = client.read_weight().await.unwrap();
    assert_eq!(reading, WeightReading::new(12345, 2, true));

    let requests = server.await.unwrap();
    assert_eq!(requests[0], vec![0x02, 0x01, b'R', 0x03, 0x2D, 0x3D]);
}

#[tokio::test]
async fn test_ascii_zero_weight_is_unstable() {
    let reply = AsciiFrame::encode_response(0x01, b'R', b"0.000");
    let (port, server) = fake_scale(vec![Reply::Bytes(reply.to_vec())]).await;

    let client = ScaleClient::new(
        ScaleConfig::new("127.0.0.1")
            .with_port(port)
            .with_variant(ProtocolVariant::Ascii(AsciiOptions::default())),
    );

    let reading = client.read_weight().await.unwrap();
    assert!(!reading.stable);
    server.await.unwrap();
}

#[tokio::test]
async fn test_session_over_tcp() {
    let (port, server) = fake_scale(vec![
        hex_reply(PING_ACK),
        hex_reply("f855ce0700100cfeffff020034ac"),
        hex_reply(WEIGHT_45230_STABLE),
    ])
    .await;

    let client = client(port);
    let config = SessionConfig {
        max_attempts: 5,
        poll_interval: Duration::from_millis(10),
    };
    let report = WeighingSession::new(&client, config).run().await;

    assert_eq!(
        report.outcome,
        SessionOutcome::Stable(WeightReading::new(45230, 1, true))
    );
    assert_eq!(report.attempts, 2);

    let requests: Vec<String> = server.await.unwrap().iter().map(hex::encode).collect();
    assert_eq!(requests, vec![PING_REQUEST, WEIGHT_REQUEST, WEIGHT_REQUEST]);
}

#[tokio::test]
async fn test_connection_closed_after_success() {
    let (port, server) = open_ended_scale(Some(hex::decode(WEIGHT_45230_STABLE).unwrap())).await;

    assert!(client(port).read_weight().await.is_ok());
    assert_eq!(server.await.unwrap(), 0);
}

#[tokio::test]
async fn test_connection_closed_after_crc_mismatch() {
    let (port, server) =
        open_ended_scale(Some(hex::decode("f855ce070010aeb00000010188b4").unwrap())).await;

    let result = client(port).read_weight().await;
    assert!(matches!(
        result,
        Err(Error::Frame(FrameError::CrcMismatch { .. }))
    ));
    assert_eq!(server.await.unwrap(), 0);
}

#[tokio::test]
async fn test_connection_closed_after_timeout() {
    let (port, server) = open_ended_scale(None).await;

    let client = ScaleClient::new(
        ScaleConfig::new("127.0.0.1")
            .with_port(port)
            .with_round_trip_timeout(Duration::from_millis(100)),
    );

    let result = client.read_weight().await;
    assert!(matches!(
        result,
        Err(Error::Transport(TransportError::Timeout(_)))
    ));
    assert_eq!(server.await.unwrap(), 0);
}

fn ascii_client(port: u16) -> ScaleClient {
    ScaleClient::new(
        ScaleConfig::new("127.0.0.1")
            .with_port(port)
            .with_round_trip_timeout(Duration::from_millis(500))
            .with_variant(ProtocolVariant::Ascii(AsciiOptions::default())),
    )
}

#[tokio::test]
async fn test_ascii_ping_sends_weight_request() {
    let reply = AsciiFrame::encode_response(0x01, b'R', b"0.000");
    let (port, server) = fake_scale(vec![Reply::Bytes(reply.to_vec())]).await;

    // A zero reading still answers the ping
    assert!(ascii_client(port).ping().await);

    let requests = server.await.unwrap();
    assert_eq!(requests[0], vec![0x02, 0x01, b'R', 0x03, 0x2D, 0x3D]);
}

#[tokio::test]
async fn test_ascii_ping_bad_frame_is_false() {
    let mut reply = AsciiFrame::encode_response(0x01, b'R', b"123.45").to_vec();
    let last = reply.len() - 1;
    reply[last] ^= 0xFF;
    let (port, server) = fake_scale(vec![Reply::Bytes(reply)]).await;

    assert!(!ascii_client(port).ping().await);
    server.await.unwrap();
}
