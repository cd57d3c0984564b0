//! NDJSON stream parsing for the local model's streamed generation.
//!
//! The generate endpoint answers with one JSON object per line, each carrying
//! a partial `response` fragment and optionally a `done` flag. The parser
//! turns the raw byte stream into a lazy, finite stream of text fragments
//! that ends at end-of-stream or at the first chunk with `done: true`.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::trace;

use tunebridge_core::{Error, Result};

/// Stream of generated text fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// One line of the generate stream.
#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

struct NdjsonState<S> {
    inner: Pin<Box<S>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String>>,
    finished: bool,
}

impl<S> NdjsonState<S> {
    /// Decode every complete line currently buffered.
    fn drain_lines(&mut self) {
        while !self.finished {
            let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') else {
                break;
            };
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.decode_line(&line);
        }
    }

    /// Decode whatever is left once the byte stream has ended.
    fn flush_remainder(&mut self) {
        if !self.finished && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.decode_line(&line);
        }
        self.finished = true;
    }

    fn decode_line(&mut self, line: &[u8]) {
        let text = String::from_utf8_lossy(line);
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        match serde_json::from_str::<GenerateChunk>(text) {
            Ok(chunk) => {
                trace!(fragment_len = chunk.response.len(), done = chunk.done, "Stream chunk");
                if !chunk.response.is_empty() {
                    self.pending.push_back(Ok(chunk.response));
                }
                if chunk.done {
                    self.finished = true;
                    self.buffer.clear();
                }
            }
            Err(e) => {
                self.pending.push_back(Err(Error::Extraction(format!(
                    "Failed to decode stream chunk: {}",
                    e
                ))));
                self.finished = true;
                self.buffer.clear();
            }
        }
    }
}

/// Parse a newline-delimited JSON byte stream into text fragments.
pub fn parse_ndjson_stream<S>(stream: S) -> FragmentStream
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send + 'static,
{
    let state = NdjsonState {
        inner: Box::pin(stream),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    let fragments = futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                return Some((item, st));
            }
            if st.finished {
                return None;
            }
            match st.inner.next().await {
                Some(Ok(bytes)) => {
                    st.buffer.extend_from_slice(&bytes);
                    st.drain_lines();
                }
                Some(Err(e)) => {
                    st.pending
                        .push_back(Err(Error::Extraction(format!("Stream error: {}", e))));
                    st.finished = true;
                }
                None => st.flush_remainder(),
            }
        }
    });

    Box::pin(fragments.fuse())
}

/// Concatenate fragments in arrival order until the stream ends.
pub async fn collect_fragments(mut stream: FragmentStream) -> Result<String> {
    let mut full = String::new();
    while let Some(fragment) = stream.next().await {
        full.push_str(&fragment?);
    }
    Ok(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_stream(
        chunks: Vec<&'static str>,
    ) -> impl Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send + 'static {
        futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<Bytes, reqwest::Error>(Bytes::from_static(c.as_bytes()))),
        )
    }

    #[tokio::test]
    async fn test_concatenates_fragments_in_order() {
        let stream = parse_ndjson_stream(byte_stream(vec![
            "{\"response\":\"Song: \"}\n",
            "{\"response\":\"Yesterday, \"}\n{\"response\":\"Artist: The Beatles\"}\n",
        ]));
        let text = collect_fragments(stream).await.unwrap();
        assert_eq!(text, "Song: Yesterday, Artist: The Beatles");
    }

    #[tokio::test]
    async fn test_line_split_across_chunks() {
        let stream = parse_ndjson_stream(byte_stream(vec![
            "{\"respo",
            "nse\":\"Hel\"}\n{\"response\":",
            "\"lo\"}\n",
        ]));
        let text = collect_fragments(stream).await.unwrap();
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn test_stops_at_done_flag() {
        let stream = parse_ndjson_stream(byte_stream(vec![
            "{\"response\":\"A\",\"done\":false}\n",
            "{\"response\":\"B\",\"done\":true}\n",
            "{\"response\":\"C\"}\n",
        ]));
        let text = collect_fragments(stream).await.unwrap();
        assert_eq!(text, "AB");
    }

    #[tokio::test]
    async fn test_final_line_without_newline() {
        let stream = parse_ndjson_stream(byte_stream(vec![
            "{\"response\":\"A\"}\n",
            "{\"response\":\"B\"}",
        ]));
        let text = collect_fragments(stream).await.unwrap();
        assert_eq!(text, "AB");
    }

    #[tokio::test]
    async fn test_blank_lines_ignored() {
        let stream = parse_ndjson_stream(byte_stream(vec![
            "\n{\"response\":\"A\"}\n\r\n",
            "{\"response\":\"\"}\n{\"response\":\"B\"}\n",
        ]));
        let text = collect_fragments(stream).await.unwrap();
        assert_eq!(text, "AB");
    }

    #[tokio::test]
    async fn test_invalid_json_is_extraction_error() {
        let stream = parse_ndjson_stream(byte_stream(vec![
            "{\"response\":\"A\"}\n",
            "{not json}\n",
        ]));
        let result = collect_fragments(stream).await;
        assert!(matches!(result, Err(Error::Extraction(_))));
    }

    #[tokio::test]
    async fn test_empty_stream_yields_empty_text() {
        let stream = parse_ndjson_stream(byte_stream(vec![]));
        let text = collect_fragments(stream).await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_stream_is_lazy_and_finite() {
        let mut stream = parse_ndjson_stream(byte_stream(vec![
            "{\"response\":\"A\"}\n{\"response\":\"B\",\"done\":true}\n",
        ]));
        assert_eq!(stream.next().await.unwrap().unwrap(), "A");
        assert_eq!(stream.next().await.unwrap().unwrap(), "B");
        assert!(stream.next().await.is_none());
        assert!(stream.next().await.is_none());
    }
}
