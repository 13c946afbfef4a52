use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::io;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// Size of the pieces a file body is handed to the transport in.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Integer percentage of `sent` over `total`, rounded and clamped to 0..=100.
pub fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (sent as f64 * 100.0 / total as f64).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Turns transport byte counts into percentage reports.
///
/// Reports are only made when the total is known and the percentage grew,
/// so a listener never sees progress go backwards within one upload.
pub struct ProgressTracker {
    total: u64,
    sent: AtomicU64,
    last: AtomicU8,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    pub fn new(total: u64, callback: Option<ProgressCallback>) -> Self {
        Self {
            total,
            sent: AtomicU64::new(0),
            last: AtomicU8::new(0),
            callback,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn advance(&self, bytes: u64) {
        let sent = self.sent.fetch_add(bytes, Ordering::SeqCst) + bytes;
        if self.total == 0 {
            return;
        }
        let pct = percent(sent, self.total);
        let previous = self.last.fetch_max(pct, Ordering::SeqCst);
        if pct > previous {
            if let Some(callback) = &self.callback {
                callback(pct);
            }
        }
    }
}

/// Passes `body` through, crediting each chunk to `tracker` as the transport pulls it.
pub fn counting_stream<S>(
    body: S,
    tracker: Arc<ProgressTracker>,
) -> impl Stream<Item = io::Result<Bytes>> + Send + Sync + 'static
where
    S: Stream<Item = io::Result<Bytes>> + Send + Sync + 'static,
{
    body.map(move |chunk| {
        if let Ok(bytes) = &chunk {
            tracker.advance(bytes.len() as u64);
        }
        chunk
    })
}
