//! Integration tests for batch dispatch over the real HTTP transport,
//! backed by mockito.

use http_volley::{get, post, BatchConfig, BatchExecutor, BatchPoll};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_mixed_batch_isolates_the_refused_request() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("GET", "/ok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;
    let missing = server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let errors = Arc::new(AtomicUsize::new(0));
    let config = {
        let errors = Arc::clone(&errors);
        BatchConfig::new().with_size(2).on_error(move |_, spec| {
            assert_eq!(spec.url.port(), Some(1));
            errors.fetch_add(1, Ordering::SeqCst);
        })
    };

    let requests = vec![
        get(format!("{}/ok", server.url())).build().unwrap(),
        get(format!("{}/missing", server.url())).build().unwrap(),
        // Nothing listens on port 1; the connection is refused.
        get("http://127.0.0.1:1/unreachable").build().unwrap(),
    ];

    let executor = BatchExecutor::new(config).unwrap();
    let slots = executor.run(requests).await;

    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].as_ref().unwrap().status, 200);
    assert_eq!(slots[1].as_ref().unwrap().status, 404);
    assert!(slots[2].is_none());
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    ok.assert_async().await;
    missing.assert_async().await;
}

#[tokio::test]
async fn test_request_wiring_params_headers_and_json_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/submit")
        .match_query(mockito::Matcher::UrlEncoded("q".into(), "rust".into()))
        .match_header("x-batch", "yes")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::Json(serde_json::json!({"k": "v"})))
        .with_status(201)
        .with_body(r#"{"created":true}"#)
        .create_async()
        .await;

    let requests = vec![post(format!("{}/submit", server.url()))
        .param("q", "rust")
        .header("x-batch", "yes")
        .json(&serde_json::json!({"k": "v"}))
        .build()
        .unwrap()];

    let executor = BatchExecutor::new(BatchConfig::new()).unwrap();
    let slots = executor.run(requests).await;

    let resp = slots[0].as_ref().unwrap();
    assert_eq!(resp.status, 201);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["created"], true);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_include_content_false_keeps_status_only() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/ok")
        .with_status(200)
        .with_body("ignored")
        .create_async()
        .await;

    let executor =
        BatchExecutor::new(BatchConfig::new().with_include_content(false)).unwrap();
    let slots = executor
        .run(vec![get(format!("{}/ok", server.url())).build().unwrap()])
        .await;

    let resp = slots[0].as_ref().unwrap();
    assert_eq!(resp.status, 200);
    assert!(resp.body.is_none());
    assert!(resp.text().is_none());
}

#[tokio::test]
async fn test_sequential_batch_completes_all_five() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/item")
        .with_status(200)
        .expect(5)
        .create_async()
        .await;

    let requests = (0..5)
        .map(|_| get(format!("{}/item", server.url())).build().unwrap())
        .collect();

    let executor = BatchExecutor::new(BatchConfig::new().with_size(1)).unwrap();
    let slots = executor.run(requests).await;

    assert_eq!(slots.len(), 5);
    assert!(slots.iter().all(Option::is_some));
    mock.assert_async().await;
}

/// A socket that accepts connections and never answers, for timeout tests.
fn silent_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut parked = Vec::new();
        for stream in listener.incoming() {
            match stream {
                Ok(s) => parked.push(s),
                Err(_) => break,
            }
        }
    });
    format!("http://{addr}/slow")
}

#[test]
fn test_threaded_launch_times_out_the_slow_request_only() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/fast")
        .with_status(200)
        .with_body("done")
        .create();

    let timeouts = Arc::new(AtomicUsize::new(0));
    let config = {
        let timeouts = Arc::clone(&timeouts);
        BatchConfig::new()
            .with_timeout(Duration::from_millis(200))
            .on_error(move |err, _| {
                assert!(err.is_timeout());
                timeouts.fetch_add(1, Ordering::SeqCst);
            })
    };

    let requests = vec![
        get(format!("{}/fast", server.url())).build().unwrap(),
        get(silent_endpoint()).build().unwrap(),
    ];

    let (tx, rx) = mpsc::channel();
    let handle = http_volley::map_threaded(
        requests,
        config,
        Some(Box::new(move |slots| {
            tx.send(slots.len()).unwrap();
        })),
    )
    .unwrap();

    // The slow slot cannot settle before its 200ms deadline.
    assert!(!handle.poll().is_finished());

    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 2);

    let deadline = Instant::now() + Duration::from_secs(5);
    let data = loop {
        if let BatchPoll::Finished(data) = handle.poll() {
            break data;
        }
        assert!(Instant::now() < deadline, "handle never finished");
        std::thread::sleep(Duration::from_millis(5));
    };

    assert_eq!(data.len(), 2);
    assert_eq!(data[0].as_ref().unwrap().status, 200);
    assert!(data[1].is_none());
    assert_eq!(timeouts.load(Ordering::SeqCst), 1);

    // Completion is sticky.
    assert!(handle.poll().is_finished());
}

#[test]
fn test_blocking_map_facade() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/one")
        .with_status(200)
        .with_body("1")
        .create();

    let slots = http_volley::map(
        vec![get(format!("{}/one", server.url())).build().unwrap()],
        BatchConfig::new(),
    )
    .unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].as_ref().unwrap().text().unwrap(), "1");
}
