//! Server-sent event parsing for streamed chat completions.
//!
//! llama-server streams `data: {json}` lines separated by blank lines and
//! ends with `data: [DONE]`. Each chunk carries the next fragment of the
//! reply in `choices[0].delta.content`.

use std::fmt::Display;

use async_stream::stream;
use bytes::{Bytes, BytesMut};
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use murmur_core::GenerationError;
use serde_json::Value;
use tracing::warn;

/// What a single SSE line means for the stream.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Skip,
    Delta(String),
    Done,
    Error(GenerationError),
}

fn parse_line(line: &str) -> Line {
    let trimmed = line.trim();

    // Blank separators, comments and non-data fields
    let Some(data) = trimmed.strip_prefix("data:") else {
        return Line::Skip;
    };
    let data = data.trim();

    if data == "[DONE]" {
        return Line::Done;
    }

    let chunk: Value = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => return Line::Error(GenerationError::Malformed(e.to_string())),
    };

    if let Some(error) = chunk.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_string);
        return Line::Error(GenerationError::Model(message));
    }

    // Role-only and finish chunks carry no content
    match chunk["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => Line::Delta(content.to_string()),
        _ => Line::Skip,
    }
}

fn find_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n').map(|i| i + 1)
}

/// State threaded through the `unfold` stream.
struct SseState {
    stream: BoxStream<'static, Result<Bytes, GenerationError>>,
    buf: BytesMut,
    done: bool,
}

/// Convert an SSE byte stream into the content fragments it carries.
///
/// The stream ends at `[DONE]`, at the end of the body, or right after the
/// first error.
pub fn content_deltas<S, E>(byte_stream: S) -> impl Stream<Item = Result<String, GenerationError>>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + 'static,
{
    let state = SseState {
        stream: byte_stream
            .map(|chunk| chunk.map_err(|e| GenerationError::Transport(e.to_string())))
            .boxed(),
        buf: BytesMut::new(),
        done: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        if st.done {
            return None;
        }

        loop {
            let line = if let Some(line_end) = find_newline(&st.buf) {
                st.buf.split_to(line_end)
            } else {
                match st.stream.next().await {
                    Some(Ok(chunk)) => {
                        st.buf.extend_from_slice(&chunk);
                        continue;
                    }
                    Some(Err(e)) => {
                        warn!("Model stream error: {e}");
                        st.done = true;
                        return Some((Err(e), st));
                    }
                    None if st.buf.is_empty() => return None,
                    // Body ended without a trailing newline
                    None => {
                        st.done = true;
                        st.buf.split()
                    }
                }
            };

            match parse_line(&String::from_utf8_lossy(&line)) {
                Line::Skip if st.done => return None,
                Line::Skip => {}
                Line::Delta(text) => return Some((Ok(text), st)),
                Line::Done => return None,
                Line::Error(e) => {
                    st.done = true;
                    return Some((Err(e), st));
                }
            }
        }
    })
}

/// Accumulate content fragments into full snapshots.
///
/// Every fragment produces the complete text so far. An error is passed
/// through and ends the stream.
pub fn snapshots<S>(deltas: S) -> impl Stream<Item = Result<String, GenerationError>>
where
    S: Stream<Item = Result<String, GenerationError>> + Send + 'static,
{
    stream! {
        let mut deltas = Box::pin(deltas);
        let mut snapshot = String::new();
        while let Some(delta) = deltas.next().await {
            match delta {
                Ok(text) => {
                    snapshot.push_str(&text);
                    yield Ok(snapshot.clone());
                }
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chunk(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({ "choices": [{ "delta": { "content": content } }] })
        )
    }

    type Body = stream::Iter<std::vec::IntoIter<Result<Bytes, std::io::Error>>>;

    fn body(parts: &[&str]) -> Body {
        let parts: Vec<_> = parts
            .iter()
            .map(|p| Ok(Bytes::from(p.to_string())))
            .collect();
        stream::iter(parts)
    }

    async fn collect_snapshots(parts: &[&str]) -> Vec<Result<String, GenerationError>> {
        snapshots(content_deltas(body(parts))).collect().await
    }

    #[tokio::test]
    async fn test_deltas_accumulate_into_snapshots() {
        let (a, b, c) = (chunk("Hel"), chunk("lo"), chunk(" there"));
        let results = collect_snapshots(&[&a, &b, &c, "data: [DONE]\n\n"]).await;

        assert_eq!(
            results,
            vec![
                Ok("Hel".to_string()),
                Ok("Hello".to_string()),
                Ok("Hello there".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_lines_split_across_chunks() {
        let full = format!("{}{}", chunk("abc"), chunk("def"));
        let (head, tail) = full.split_at(17);
        let results = collect_snapshots(&[head, tail]).await;

        assert_eq!(results, vec![Ok("abc".to_string()), Ok("abcdef".to_string())]);
    }

    #[tokio::test]
    async fn test_comments_and_role_chunks_skipped() {
        let role = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n";
        let content = chunk("Hi");
        let results = collect_snapshots(&[": keep-alive\n\n", role, &content]).await;

        assert_eq!(results, vec![Ok("Hi".to_string())]);
    }

    #[tokio::test]
    async fn test_nothing_after_done() {
        let (a, b) = (chunk("one"), chunk("two"));
        let results = collect_snapshots(&[&a, "data: [DONE]\n\n", &b]).await;

        assert_eq!(results, vec![Ok("one".to_string())]);
    }

    #[tokio::test]
    async fn test_error_object_ends_stream() {
        let a = chunk("partial");
        let error = "data: {\"error\":{\"message\":\"context size exceeded\"}}\n\n";
        let b = chunk("ignored");
        let results = collect_snapshots(&[&a, error, &b]).await;

        assert_eq!(
            results,
            vec![
                Ok("partial".to_string()),
                Err(GenerationError::Model("context size exceeded".into())),
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_error() {
        let results = collect_snapshots(&["data: {not json\n\n"]).await;

        assert!(matches!(
            results.as_slice(),
            [Err(GenerationError::Malformed(_))]
        ));
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let first = chunk("ok");
        let parts = vec![
            Ok(Bytes::from(first)),
            Err(std::io::Error::other("connection reset")),
        ];
        let results: Vec<_> = snapshots(content_deltas(stream::iter(parts)))
            .collect()
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Ok("ok".to_string()));
        assert!(matches!(&results[1], Err(GenerationError::Transport(e)) if e.contains("reset")));
    }

    #[tokio::test]
    async fn test_final_line_without_newline() {
        let last = chunk("tail");
        let results = collect_snapshots(&[last.trim_end()]).await;

        assert_eq!(results, vec![Ok("tail".to_string())]);
    }

    #[test]
    fn test_parse_line_variants() {
        assert_eq!(parse_line(""), Line::Skip);
        assert_eq!(parse_line("event: message"), Line::Skip);
        assert_eq!(parse_line("data: [DONE]"), Line::Done);
        assert_eq!(
            parse_line("data:{\"choices\":[{\"delta\":{\"content\":\"x\"}}]}"),
            Line::Delta("x".into())
        );
    }
}
