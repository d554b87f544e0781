//! Chunked multipart body that reports byte-level upload progress.

use futures::{stream, Stream, StreamExt};
use reqwest::Body;

use crate::ProgressFn;

pub(crate) const UPLOAD_CHUNK_BYTES: usize = 16 * 1024;

/// Rounded percentage of `sent` over `total`; `None` when the length is unknown.
pub fn progress_percent(sent: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let pct = (sent.min(total) * 100 + total / 2) / total;
    Some(u8::try_from(pct).unwrap_or(100))
}

pub(crate) fn progress_chunks(
    bytes: Vec<u8>,
    on_progress: ProgressFn,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Sync + 'static {
    let total = bytes.len() as u64;
    let chunks: Vec<Vec<u8>> = bytes.chunks(UPLOAD_CHUNK_BYTES).map(<[u8]>::to_vec).collect();
    let mut sent = 0u64;
    let mut last_reported = None;
    stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        // At most 101 reports per upload, whatever the file size.
        if let Some(pct) = progress_percent(sent, total) {
            if last_reported != Some(pct) {
                last_reported = Some(pct);
                on_progress(pct);
            }
        }
        Ok::<_, std::io::Error>(chunk)
    })
}

pub(crate) fn progress_body(bytes: Vec<u8>, on_progress: ProgressFn) -> Body {
    Body::wrap_stream(progress_chunks(bytes, on_progress))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::StreamExt;

    use super::*;

    #[test]
    fn percent_rounds_like_a_progress_bar() {
        assert_eq!(progress_percent(0, 200), Some(0));
        assert_eq!(progress_percent(1, 200), Some(1));
        assert_eq!(progress_percent(1, 3), Some(33));
        assert_eq!(progress_percent(2, 3), Some(67));
        assert_eq!(progress_percent(200, 200), Some(100));
        assert_eq!(progress_percent(500, 200), Some(100));
        assert_eq!(progress_percent(0, 0), None);
    }

    #[tokio::test]
    async fn chunks_report_monotonic_progress_ending_at_full() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let on_progress: ProgressFn = Arc::new(move |pct| {
            if let Ok(mut guard) = sink.lock() {
                guard.push(pct);
            }
        });

        let payload = vec![7u8; UPLOAD_CHUNK_BYTES * 3 + UPLOAD_CHUNK_BYTES / 2];
        let chunks: Vec<_> = progress_chunks(payload.clone(), on_progress)
            .collect::<Vec<_>>()
            .await;

        let rebuilt: Vec<u8> = chunks
            .into_iter()
            .flat_map(|chunk| chunk.expect("chunk"))
            .collect();
        assert_eq!(rebuilt, payload);

        let seen = seen.lock().expect("progress lock").clone();
        assert_eq!(seen.len(), 4);
        assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(seen.last(), Some(&100));
    }

    #[tokio::test]
    async fn large_uploads_report_each_percentage_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let on_progress: ProgressFn = Arc::new(move |pct: u8| {
            if let Ok(mut guard) = sink.lock() {
                guard.push(pct);
            }
        });

        let payload = vec![0u8; UPLOAD_CHUNK_BYTES * 1280];
        let chunks = progress_chunks(payload, on_progress).collect::<Vec<_>>().await;
        assert_eq!(chunks.len(), 1280);

        let seen = seen.lock().expect("progress lock").clone();
        assert!(seen.len() <= 101, "reported {} times", seen.len());
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(seen.last(), Some(&100));
    }

    #[tokio::test]
    async fn empty_payload_reports_nothing() {
        let calls = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&calls);
        let on_progress: ProgressFn = Arc::new(move |_: u8| {
            if let Ok(mut guard) = counter.lock() {
                *guard += 1;
            }
        });

        let chunks: Vec<_> = progress_chunks(Vec::new(), on_progress).collect::<Vec<_>>().await;
        assert!(chunks.is_empty());
        assert_eq!(*calls.lock().expect("lock"), 0);
    }
}
