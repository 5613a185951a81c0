//! Session behaviour over an in-memory connection: handshake, ordering
//! across slow fetches, prompts and failures, and the close notice.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use boardcast::executor::CONNECTION_CLOSED;
use boardcast::prelude::*;
use boardcast_transport::{Connection, ConnectionId};
use serde_json::{Value, json};
use tokio::sync::{mpsc, watch};

// =========================================================================
// In-memory connection
// =========================================================================

/// Frames pushed by the test arrive at `recv`; frames the client sends are
/// forwarded back to the test. Dropping the test's sender closes it.
struct MemoryConnection {
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    sent: mpsc::UnboundedSender<Vec<u8>>,
    closed: watch::Sender<bool>,
}

impl Connection for MemoryConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        self.sent
            .send(data.to_vec())
            .map_err(|_| TransportError::ConnectionClosed("test ended".into()))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut closed = self.closed.subscribe();
        let mut inbound = self.inbound.lock().await;
        tokio::select! {
            biased;
            frame = inbound.recv() => Ok(frame),
            _ = closed.wait_for(|c| *c) => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.send_replace(true);
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        ConnectionId::new(1)
    }
}

/// Serves each fetch after the next latency in line, or at once when
/// the list runs out.
#[derive(Clone)]
struct SlowStore {
    inner: MemoryAssetStore,
    latencies: Arc<Mutex<VecDeque<Duration>>>,
}

impl SlowStore {
    fn new(inner: MemoryAssetStore, latencies: &[u64]) -> Self {
        Self {
            inner,
            latencies: Arc::new(Mutex::new(
                latencies.iter().map(|ms| Duration::from_millis(*ms)).collect(),
            )),
        }
    }
}

impl AssetStore for SlowStore {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let delay = self.latencies.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.fetch(path).await
    }
}

struct Harness {
    server: mpsc::UnboundedSender<Vec<u8>>,
    sent: mpsc::UnboundedReceiver<Vec<u8>>,
    surface: MemorySurface,
    session: Session<MemoryConnection>,
}

impl Harness {
    fn start<A: AssetStore, P: Prompter>(launch: LaunchContext, assets: A, prompter: P) -> Self {
        let (server, inbound) = mpsc::unbounded_channel();
        let (sent_tx, sent) = mpsc::unbounded_channel();
        let conn = MemoryConnection {
            inbound: tokio::sync::Mutex::new(inbound),
            sent: sent_tx,
            closed: watch::Sender::new(false),
        };
        let surface = MemorySurface::new();
        let executor_surface = surface.clone();
        let session = Session::start(conn, launch.handshake(), move |reporter| {
            EffectExecutor::new(Board::default(), executor_surface, assets, prompter, reporter)
        });
        Self {
            server,
            sent,
            surface,
            session,
        }
    }

    fn push(&self, effect: Value) {
        self.server.send(effect.to_string().into_bytes()).unwrap();
    }

    fn push_raw(&self, raw: &str) {
        self.server.send(raw.as_bytes().to_vec()).unwrap();
    }

    /// Pushes a `board_size` config and waits until clicks are checked
    /// against it.
    async fn configure(&self, cols: usize, rows: usize) {
        let mut layout = self.session.reporter().watch_layout();
        let before = layout.borrow().generation;
        self.push(json!(["config", ["board_size", [cols, rows]]]));
        layout
            .wait_for(|l| l.generation > before)
            .await
            .expect("reporter outlives the test");
    }

    async fn next_sent(&mut self) -> Value {
        let frame = self.sent.recv().await.expect("client should send a frame");
        serde_json::from_slice(&frame).unwrap()
    }

    /// Closes the server side and waits for every effect to be applied.
    async fn finish(self) -> (MemorySurface, QueueStats) {
        drop(self.server);
        let stats = self.session.wait().await.unwrap();
        (self.surface, stats)
    }
}

fn plain() -> Harness {
    Harness::start(LaunchContext::new(), MemoryAssetStore::new(), DismissPrompts)
}

fn statuses(surface: &MemorySurface) -> Vec<String> {
    surface
        .history()
        .into_iter()
        .filter_map(|event| match event {
            SurfaceEvent::Status(text) => Some(text),
            _ => None,
        })
        .collect()
}

// =========================================================================
// Handshake
// =========================================================================

#[tokio::test]
async fn test_handshake_is_first_and_only_once() {
    let launch = LaunchContext::from_query("?room=lobby&user=ann");
    let mut h = Harness::start(launch, MemoryAssetStore::new(), DismissPrompts);
    assert_eq!(h.session.state(), ConnectionState::Open);

    h.configure(1, 1).await;
    h.session.reporter().click(Coord::new(0, 0)).unwrap();

    assert_eq!(
        h.next_sent().await,
        json!({"room": "lobby", "mode": null, "user": "ann"})
    );
    assert_eq!(h.next_sent().await, json!(["click", [0, 0]]));
    assert!(h.sent.try_recv().is_err());
}

#[tokio::test]
async fn test_click_is_reported_column_first() {
    let mut h = plain();
    h.next_sent().await;

    h.configure(6, 3).await;
    h.session.reporter().click(Coord::new(2, 5)).unwrap();
    let frame = h.sent.recv().await.unwrap();
    assert_eq!(frame, br#"["click",[5,2]]"#);
}

#[tokio::test]
async fn test_clicks_off_the_board_send_nothing() {
    let mut h = plain();
    h.next_sent().await;
    let reporter = h.session.reporter();

    let before_config = reporter.click(Coord::new(0, 0));
    assert!(matches!(
        before_config,
        Err(BoardcastError::Geometry(GeometryError::OutOfBounds { rows: 0, cols: 0, .. }))
    ));

    h.configure(2, 2).await;
    assert!(matches!(
        reporter.click(Coord::new(9, 9)),
        Err(BoardcastError::Geometry(GeometryError::OutOfBounds { rows: 2, cols: 2, .. }))
    ));
    assert!(reporter.click(Coord::new(0, 2)).is_err());

    reporter.click(Coord::new(1, 1)).unwrap();
    assert_eq!(h.next_sent().await, json!(["click", [1, 1]]));
    assert!(h.sent.try_recv().is_err());
}

#[tokio::test]
async fn test_clicks_follow_a_resize() {
    let mut h = plain();
    h.next_sent().await;
    let reporter = h.session.reporter();

    h.configure(8, 8).await;
    reporter.click(Coord::new(7, 7)).unwrap();
    assert_eq!(h.next_sent().await, json!(["click", [7, 7]]));

    h.configure(3, 3).await;
    assert!(reporter.click(Coord::new(7, 7)).is_err());
    reporter.click(Coord::new(2, 2)).unwrap();
    assert_eq!(h.next_sent().await, json!(["click", [2, 2]]));
}

// =========================================================================
// Ordering
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_slow_white_then_fast_black_ends_black() {
    let assets = SlowStore::new(
        MemoryAssetStore::new().with("chess/images/pawn.svg", "<svg/>"),
        &[300, 1],
    );
    let h = Harness::start(LaunchContext::new(), assets, DismissPrompts);

    h.push(json!(["config", ["board_size", [2, 2]]]));
    h.push(json!(["draw_piece", [[0, 0], "pawn.svg", "white"]]));
    h.push(json!(["draw_piece", [[0, 0], "pawn.svg", "black"]]));
    let (surface, stats) = h.finish().await;

    let fills: Vec<String> = surface
        .history()
        .into_iter()
        .filter_map(|event| match event {
            SurfaceEvent::Painted {
                content: CellContent::Image { fill, .. },
                ..
            } => Some(fill),
            _ => None,
        })
        .collect();
    assert_eq!(fills, vec!["white", "black"]);
    assert_eq!(
        surface.snapshot().piece(Coord::new(0, 0)),
        Some(&CellContent::Image {
            markup: "<svg/>".into(),
            fill: "black".into(),
        })
    );
    assert_eq!(stats.failed, 0);
}

#[tokio::test(start_paused = true)]
async fn test_text_after_slow_image_waits_for_it() {
    let assets = SlowStore::new(
        MemoryAssetStore::new().with("chess/images/king.svg", "<svg id='k'/>"),
        &[500],
    );
    let h = Harness::start(LaunchContext::new(), assets, DismissPrompts);

    h.push(json!(["config", ["board_size", [1, 2]]]));
    h.push(json!(["draw_piece", [[0, 0], "king.svg", "white"]]));
    h.push(json!(["draw_piece", [[0, 0], "", "white"]]));
    h.push(json!(["status", "cleared"]));
    let (surface, _) = h.finish().await;

    assert_eq!(surface.snapshot().piece(Coord::new(0, 0)), Some(&CellContent::Empty));
    assert_eq!(statuses(&surface), vec!["cleared", CONNECTION_CLOSED]);
}

// =========================================================================
// Failures never stall the queue
// =========================================================================

#[tokio::test]
async fn test_fetch_error_does_not_block_ready() {
    let h = plain();
    h.push(json!(["config", ["board_size", [2, 2]]]));
    h.push(json!(["draw_piece", [[1, 1], "missing.svg", "white"]]));
    h.push(json!(["status", "ready"]));
    let (surface, stats) = h.finish().await;

    assert_eq!(statuses(&surface), vec!["ready", CONNECTION_CLOSED]);
    assert_eq!(surface.snapshot().piece(Coord::new(1, 1)), Some(&CellContent::Empty));
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_undecodable_messages_are_dropped() {
    let h = plain();
    h.push_raw("not json");
    h.push(json!(["explode", 1]));
    h.push(json!(["config", ["colour_scheme", "dark"]]));
    h.push(json!(["status"]));
    h.push(json!(["status", "still here"]));
    let (surface, stats) = h.finish().await;

    assert_eq!(statuses(&surface), vec!["still here", CONNECTION_CLOSED]);
    // Dropped messages never reach the queue.
    assert_eq!(stats, QueueStats { completed: 2, failed: 0 });
}

#[tokio::test]
async fn test_resize_mid_stream_rejects_old_coordinates() {
    let h = plain();
    h.push(json!(["config", ["board_size", [8, 8]]]));
    h.push(json!(["draw_piece", [[7, 7], "K", "white"]]));
    h.push(json!(["config", ["board_size", [4, 4]]]));
    h.push(json!(["draw_piece", [[7, 7], "Q", "white"]]));
    h.push(json!(["overlay", [[3, 0], "x", "green"]]));
    let (surface, stats) = h.finish().await;

    let frame = surface.snapshot();
    let layout = frame.layout.clone().unwrap();
    assert_eq!((layout.rows, layout.cols, layout.generation), (4, 4, 2));
    assert_eq!(frame.overlay(Coord::new(0, 3)), Some(&CellContent::text("x", "green")));
    assert_eq!(frame.piece(Coord::new(7, 7)), None);
    assert_eq!(stats, QueueStats { completed: 5, failed: 1 });
}

#[tokio::test]
async fn test_board_size_is_columns_then_rows() {
    let h = plain();
    h.push(json!(["config", ["board_size", [5, 3]]]));
    let (surface, _) = h.finish().await;

    let layout = surface.snapshot().layout.unwrap();
    assert_eq!((layout.rows, layout.cols), (3, 5));
    assert_eq!(layout.cell_size().to_string(), "16vh");
}

// =========================================================================
// Prompts
// =========================================================================

#[tokio::test]
async fn test_prompt_holds_back_later_effects() {
    let (prompter, mut requests) = ChannelPrompter::new();
    let mut h = Harness::start(LaunchContext::new(), MemoryAssetStore::new(), prompter);
    h.next_sent().await;

    h.push(json!(["askstring", "Promote to?"]));
    h.push(json!(["status", "after"]));

    let request = requests.recv().await.unwrap();
    assert_eq!(request.prompt, "Promote to?");
    assert!(statuses(&h.surface).is_empty());

    request.answer("Q");
    assert_eq!(h.next_sent().await, json!(["write", "Q"]));

    let (surface, _) = h.finish().await;
    assert_eq!(statuses(&surface), vec!["after", CONNECTION_CLOSED]);
}

#[tokio::test(start_paused = true)]
async fn test_prompt_waits_for_slow_image_before_it() {
    let assets = SlowStore::new(
        MemoryAssetStore::new().with("chess/images/pawn.svg", "<svg/>"),
        &[400],
    );
    let (prompter, mut requests) = ChannelPrompter::new();
    let mut h = Harness::start(LaunchContext::new(), assets, prompter);
    h.next_sent().await;
    let started = tokio::time::Instant::now();

    h.push(json!(["config", ["board_size", [2, 2]]]));
    h.push(json!(["draw_piece", [[1, 0], "pawn.svg", "white"]]));
    h.push(json!(["askstring", "Promote to?"]));

    let request = requests.recv().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(400));
    // The image is on the surface before the question is asked.
    assert_eq!(
        h.surface.snapshot().piece(Coord::new(0, 1)),
        Some(&CellContent::Image {
            markup: "<svg/>".into(),
            fill: "white".into(),
        })
    );

    request.answer("Q");
    assert_eq!(h.next_sent().await, json!(["write", "Q"]));
    let (_, stats) = h.finish().await;
    assert_eq!(stats, QueueStats { completed: 4, failed: 0 });
}

#[tokio::test]
async fn test_dismissed_prompt_sends_null() {
    let (prompter, mut requests) = ChannelPrompter::new();
    let mut h = Harness::start(LaunchContext::new(), MemoryAssetStore::new(), prompter);
    h.next_sent().await;

    h.push(json!(["askstring", "Your name?"]));
    requests.recv().await.unwrap().dismiss();
    assert_eq!(h.next_sent().await, json!(["write", null]));
}

// =========================================================================
// Close
// =========================================================================

#[tokio::test]
async fn test_close_notice_comes_after_everything_received() {
    let h = plain();
    let mut state = h.session.watch_state();
    h.push(json!(["status", "white to move"]));
    h.push(json!(["status", "black to move"]));
    let (surface, stats) = h.finish().await;

    state.wait_for(|s| *s == ConnectionState::Closed).await.unwrap();
    assert_eq!(
        statuses(&surface),
        vec!["white to move", "black to move", CONNECTION_CLOSED]
    );
    assert_eq!(surface.status(), "connection closed");
    assert_eq!(stats, QueueStats { completed: 3, failed: 0 });
}

#[tokio::test]
async fn test_shutdown_from_client_still_drains() {
    let h = plain();
    h.push(json!(["status", "bye"]));
    h.session.shutdown().await.unwrap();

    let stats = h.session.wait().await.unwrap();
    assert_eq!(stats.completed, 2);
    assert_eq!(statuses(&h.surface), vec!["bye", CONNECTION_CLOSED]);
}
