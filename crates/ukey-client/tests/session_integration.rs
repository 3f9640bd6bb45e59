//! Integration tests for the transport session and request correlator,
//! driven against a real in-process WebSocket peer.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use common::{reply_to, spawn_peer, wait_until};
use ukey_client::infrastructure::session::{SessionError, SessionState, WsSession};

const TIMEOUT: Duration = Duration::from_millis(500);

#[tokio::test]
async fn test_request_resolves_with_matching_reply() {
    // Arrange: a peer that answers every command successfully
    let url = spawn_peer(|req| vec![reply_to(&req, true, "00000000")]).await;
    let session = WsSession::connect(&url, TIMEOUT).await.unwrap();

    // Act
    let frame = session.request("Ping|X", vec![]).await.unwrap();

    // Assert
    assert!(frame.succeeded);
    assert_eq!(frame.payload, "00000000");
    assert_eq!(session.unmatched_frames(), 0);
}

#[tokio::test]
async fn test_session_state_transitions_open_then_closed() {
    let url = spawn_peer(|req| vec![reply_to(&req, true, "0")]).await;
    let session = WsSession::connect(&url, TIMEOUT).await.unwrap();
    assert_eq!(session.state(), SessionState::Open);

    session.close().await;
    assert_eq!(session.state(), SessionState::Closed);

    // A request after close fails fast without touching the wire.
    let err = session.request("Ping|X", vec![]).await.unwrap_err();
    assert!(matches!(err, SessionError::NotOpen(SessionState::Closed)));
}

#[tokio::test]
async fn test_out_of_order_replies_resolve_correct_callers() {
    // Arrange: the peer holds the first request until the second arrives,
    // then answers in reverse order.  Each reply echoes its request id in
    // the payload so misrouting would be visible.
    let parked: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let parked_peer = Arc::clone(&parked);
    let url = spawn_peer(move |req| {
        let mut parked = parked_peer.lock().unwrap();
        parked.push(req);
        if parked.len() == 2 {
            let first = parked[0].clone();
            let second = parked[1].clone();
            let echo = |r: &Value| format!("echo-{}", r["MsgId"].as_str().unwrap());
            vec![
                reply_to(&second, true, &echo(&second)),
                reply_to(&first, true, &echo(&first)),
            ]
        } else {
            Vec::new()
        }
    })
    .await;

    let session = Arc::new(WsSession::connect(&url, TIMEOUT).await.unwrap());

    // Act: two concurrent requests
    let s1 = Arc::clone(&session);
    let s2 = Arc::clone(&session);
    let (r1, r2) = tokio::join!(
        s1.request("First|X", vec![]),
        s2.request("Second|X", vec![]),
    );

    // Assert: each caller got the reply carrying its own id
    let f1 = r1.unwrap();
    let f2 = r2.unwrap();
    assert_eq!(f1.payload, format!("echo-{}", f1.msg_id));
    assert_eq!(f2.payload, format!("echo-{}", f2.msg_id));
    assert_ne!(f1.msg_id, f2.msg_id, "concurrent requests must get distinct ids");
    assert_eq!(session.unmatched_frames(), 0);
}

#[tokio::test]
async fn test_duplicate_reply_resolves_once_and_counts_the_second() {
    // Arrange: the peer answers every request twice
    let url = spawn_peer(|req| {
        vec![
            reply_to(&req, true, "first"),
            reply_to(&req, true, "second"),
        ]
    })
    .await;
    let session = WsSession::connect(&url, TIMEOUT).await.unwrap();

    // Act
    let frame = session.request("Ping|X", vec![]).await.unwrap();

    // Assert: only the first frame resolved the request; the duplicate was
    // dropped and counted.
    assert_eq!(frame.payload, "first");
    let counted = wait_until(|| session.unmatched_frames() == 1, TIMEOUT).await;
    assert!(counted, "duplicate frame must increment the unmatched counter");
}

#[tokio::test]
async fn test_frame_with_unknown_id_is_dropped_and_counted() {
    // Arrange: the peer sends a stray frame before the real reply
    let url = spawn_peer(|req| {
        vec![
            r#"{"MsgId":"no-such-request","Result":true,"Response":""}"#.to_string(),
            reply_to(&req, true, "0"),
        ]
    })
    .await;
    let session = WsSession::connect(&url, TIMEOUT).await.unwrap();

    // Act
    let frame = session.request("Ping|X", vec![]).await.unwrap();

    // Assert: the caller is unaffected, the stray frame is only counted
    assert_eq!(frame.payload, "0");
    let counted = wait_until(|| session.unmatched_frames() == 1, TIMEOUT).await;
    assert!(counted);
}

#[tokio::test]
async fn test_close_fails_all_pending_requests() {
    // Arrange: a peer that never answers
    let url = spawn_peer(|_req| Vec::new()).await;
    let session = Arc::new(
        WsSession::connect(&url, Duration::from_secs(30)).await.unwrap(),
    );

    // Act: three concurrent requests, then close before any reply
    let mut tasks = Vec::new();
    for i in 0..3 {
        let s = Arc::clone(&session);
        tasks.push(tokio::spawn(async move {
            s.request(&format!("Cmd{i}|X"), vec![]).await
        }));
    }
    // Give the requests time to register and hit the wire.
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.close().await;

    // Assert: every caller observes a connection-closed failure — none is
    // left pending.
    for task in tasks {
        let result = task.await.unwrap();
        assert!(
            matches!(result, Err(SessionError::ConnectionClosed)),
            "expected ConnectionClosed, got {result:?}"
        );
    }
}

#[tokio::test]
async fn test_request_times_out_when_peer_stays_silent() {
    // Arrange: the peer swallows the first command but answers later ones
    let seen = Arc::new(Mutex::new(0u32));
    let seen_peer = Arc::clone(&seen);
    let url = spawn_peer(move |req| {
        let mut count = seen_peer.lock().unwrap();
        *count += 1;
        if *count == 1 {
            Vec::new()
        } else {
            vec![reply_to(&req, true, "0")]
        }
    })
    .await;
    let session = WsSession::connect(&url, Duration::from_millis(100)).await.unwrap();

    // Act
    let first = session.request("Slow|X", vec![]).await;
    let second = session.request("Fast|X", vec![]).await;

    // Assert: the first fails with a timeout; the session stays open and
    // usable for the second.
    assert!(matches!(first, Err(SessionError::Timeout(_))));
    assert_eq!(session.state(), SessionState::Open);
    assert_eq!(second.unwrap().payload, "0");
}

#[tokio::test]
async fn test_peer_disconnect_fails_pending_request() {
    // Arrange: a peer that accepts the connection and immediately drops it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            // Wait for one frame, then drop the whole stream.
            let (_tx, mut rx) = futures_util::StreamExt::split(ws);
            let _ = futures_util::StreamExt::next(&mut rx).await;
        }
    });

    let session = WsSession::connect(&format!("ws://{addr}"), Duration::from_secs(5))
        .await
        .unwrap();

    // Act
    let result = session.request("Ping|X", vec![]).await;

    // Assert
    assert!(matches!(result, Err(SessionError::ConnectionClosed)));
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_connect_to_dead_endpoint_fails() {
    // Bind a port, learn it, then free it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = WsSession::connect(&format!("ws://{addr}"), TIMEOUT).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_load_module_uses_fixed_correlation_id() {
    // Arrange: capture the bootstrap frame
    let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let captured_peer = Arc::clone(&captured);
    let url = spawn_peer(move |req| {
        *captured_peer.lock().unwrap() = Some(req.clone());
        vec![reply_to(&req, true, "")]
    })
    .await;
    let session = WsSession::connect(&url, TIMEOUT).await.unwrap();

    // Act
    let frame = session.load_module("IActiveXCtrl").await.unwrap();

    // Assert: fixed id, Module field, no Method field
    assert_eq!(frame.msg_id, "LoadModule");
    let request = captured.lock().unwrap().clone().unwrap();
    assert_eq!(request["MsgId"], "LoadModule");
    assert_eq!(request["Module"], "IActiveXCtrl");
    assert!(request.get("Method").is_none());
}

#[tokio::test]
async fn test_correlation_ids_are_sequential_decimal_strings() {
    // Arrange: record every id the session puts on the wire
    let ids: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let ids_peer = Arc::clone(&ids);
    let url = spawn_peer(move |req| {
        ids_peer
            .lock()
            .unwrap()
            .push(req["MsgId"].as_str().unwrap().to_string());
        vec![reply_to(&req, true, "0")]
    })
    .await;
    let session = WsSession::connect(&url, TIMEOUT).await.unwrap();

    // Act
    for _ in 0..3 {
        session.request("Ping|X", vec![]).await.unwrap();
    }

    // Assert
    assert_eq!(*ids.lock().unwrap(), vec!["1", "2", "3"]);
}
