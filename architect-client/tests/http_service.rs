//! HTTP contract tests against a one-shot responder on a local port.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use architect_client::{submit_blocking, ClientConfig, HttpOptimizer, OptimizerService};
use architect_core::{
    build_request, AlignmentPolicy, Completion, LeverageMode, PortfolioConfig, StrategyKind,
    SubmitError, ViewController,
};

const RESPONSE_FIXTURE: &str =
    include_str!("../../architect-core/tests/fixtures/optimize_response.json");

/// What the responder saw.
struct Captured {
    request_line: String,
    content_type: Option<String>,
    body: String,
}

/// Content length (0 when absent or unparsable) and content type of a
/// request head, consuming it up to the blank line.
fn read_headers(reader: &mut impl BufRead) -> (usize, Option<String>) {
    let mut content_length = 0;
    let mut content_type = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                "content-type" => content_type = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }
    (content_length, content_type)
}

/// Serve exactly one request with `status` and `body`, then close.
fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (SocketAddr, mpsc::Receiver<Captured>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let (content_length, content_type) = read_headers(&mut reader);
        // Short bodies are captured as empty.
        let mut payload = vec![0u8; content_length];
        if reader.read_exact(&mut payload).is_err() {
            payload.clear();
        }

        tx.send(Captured {
            request_line: request_line.trim_end().to_string(),
            content_type,
            body: String::from_utf8_lossy(&payload).into_owned(),
        })
        .unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();
    });

    (addr, rx, handle)
}

fn optimizer_for(addr: SocketAddr) -> HttpOptimizer {
    let config = ClientConfig {
        api_url: format!("http://{addr}/"),
        ..Default::default()
    };
    HttpOptimizer::new(&config).unwrap()
}

fn sample_request() -> architect_core::OptimizationRequest {
    build_request("vti, tlt, gld", 5.0, 60.0, 10.0, LeverageMode::Volatility).unwrap()
}

#[test]
fn posts_request_and_parses_result() {
    let (addr, captured, handle) = serve_once("200 OK", RESPONSE_FIXTURE);
    let result = optimizer_for(addr).optimize(&sample_request()).unwrap();
    handle.join().unwrap();

    let seen = captured.recv().unwrap();
    assert_eq!(seen.request_line, "POST /api/optimize HTTP/1.1");
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(body["tickers"], serde_json::json!(["VTI", "TLT", "GLD"]));
    assert_eq!(body["max_weight"], serde_json::json!(60.0));
    assert_eq!(body["target_mode"], serde_json::json!("volatility"));

    assert_eq!(result.meta.lookback, 189);
    assert!(result.strategy(StrategyKind::Hrp).is_some());
}

#[test]
fn service_error_carries_message() {
    let (addr, _captured, handle) =
        serve_once("400 Bad Request", r#"{"error": "Not enough price history"}"#);
    let err = optimizer_for(addr).optimize(&sample_request()).unwrap_err();
    handle.join().unwrap();

    assert_eq!(
        err,
        SubmitError::Service {
            status: 400,
            message: "Not enough price history".into()
        }
    );
}

#[test]
fn service_error_without_message_falls_back() {
    let (addr, _captured, handle) = serve_once("500 Internal Server Error", r#"{"detail": "x"}"#);
    let err = optimizer_for(addr).optimize(&sample_request()).unwrap_err();
    handle.join().unwrap();

    assert_eq!(err.to_string(), "server error");
}

#[test]
fn non_json_body_is_transport_error() {
    let (addr, _captured, handle) = serve_once("200 OK", "definitely not json");
    let err = optimizer_for(addr).optimize(&sample_request()).unwrap_err();
    handle.join().unwrap();

    assert!(matches!(err, SubmitError::Transport(_)));
}

#[test]
fn connection_refused_is_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = optimizer_for(addr).optimize(&sample_request()).unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)));
    assert!(err.to_string().starts_with("Connection failed:"));
}

#[test]
fn blocking_submission_lands_in_view() {
    let (addr, _captured, handle) = serve_once("200 OK", RESPONSE_FIXTURE);
    let optimizer = optimizer_for(addr);
    let mut view = ViewController::new(AlignmentPolicy::Lenient);

    let completion = submit_blocking(&mut view, &optimizer, &PortfolioConfig::default()).unwrap();
    handle.join().unwrap();

    assert_eq!(completion, Completion::Applied);
    assert_eq!(view.comparison().map(|t| t.len()), Some(5));
    assert_eq!(
        view.diagnosis().map(|d| d.recommended),
        Some(StrategyKind::RiskParity)
    );
}

#[test]
fn responder_tolerates_malformed_headers() {
    let head = "Content-Length: twelve\r\ncontent-type: application/json\r\n\r\n{}";
    let mut reader = BufReader::new(head.as_bytes());
    let (len, content_type) = read_headers(&mut reader);
    assert_eq!(len, 0);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let mut rest = String::new();
    reader.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "{}");

    let mut truncated = BufReader::new("Content-Length: 4\r\n".as_bytes());
    assert_eq!(read_headers(&mut truncated), (4, None));
}
