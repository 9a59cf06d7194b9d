use serde_json::Value;

use crate::error::FeedClientError;
use crate::types::FeedEvent;

/// Incremental `text/event-stream` decoder. Chunks may split frames at any
/// byte; complete frames are returned as soon as their blank line arrives.
#[derive(Debug, Default)]
pub struct SseParser {
    pending: Vec<u8>,
    buffer: String,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<FeedEvent>, FeedClientError> {
        self.pending.extend_from_slice(chunk);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            // a multi-byte character cut at the chunk edge
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(FeedClientError::InvalidResponse(format!(
                    "stream is not utf-8: {e}"
                )));
            }
        };
        let bytes: Vec<u8> = self.pending.drain(..valid).collect();
        let text = String::from_utf8_lossy(&bytes);
        self.buffer.push_str(&text.replace("\r\n", "\n"));

        let mut events = Vec::new();
        while let Some(end) = self.buffer.find("\n\n") {
            let frame: String = self.buffer.drain(..end + 2).collect();
            if let Some(event) = parse_frame(&frame)? {
                events.push(event);
            }
        }
        Ok(events)
    }
}

fn parse_frame(frame: &str) -> Result<Option<FeedEvent>, FeedClientError> {
    let mut topic = None;
    let mut data = Vec::new();

    for line in frame.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => topic = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if data.is_empty() {
        return Ok(None);
    }

    let data: Value = serde_json::from_str(&data.join("\n"))
        .map_err(|e| FeedClientError::InvalidResponse(format!("bad event payload: {e}")))?;
    Ok(Some(FeedEvent {
        topic: topic.unwrap_or_else(|| "message".into()),
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_comment_yields_nothing() {
        let mut parser = SseParser::new();
        assert!(parser.push(b": connected\n\n").unwrap().is_empty());
    }

    #[test]
    fn frame_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.push(b"event: posts\nda").unwrap().is_empty());
        let events = parser
            .push(b"ta: {\"action\":\"delete\",\"post\":\"p1\"}\n\nevent: post\n")
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].topic, "posts");
        assert_eq!(events[0].action(), Some("delete"));

        let events = parser.push(b"data: {\"action\":\"like\",\"likers\":[]}\n\n").unwrap();
        assert_eq!(events[0].topic, "post");
        assert_eq!(events[0].data["likers"], serde_json::json!([]));
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let mut parser = SseParser::new();
        let events = parser
            .push(b"event: comments\r\ndata: {\"action\":\"create\"}\r\n\r\n")
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].topic, "comments");
    }

    #[test]
    fn multibyte_character_split_between_chunks() {
        let mut parser = SseParser::new();
        let frame = "event: comments\ndata: {\"comment\":\"caf\u{e9}\"}\n\n".as_bytes();
        let cut = frame.iter().position(|b| *b == 0xC3).unwrap() + 1;
        assert!(parser.push(&frame[..cut]).unwrap().is_empty());
        let events = parser.push(&frame[cut..]).unwrap();
        assert_eq!(events[0].data["comment"], "caf\u{e9}");
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let mut parser = SseParser::new();
        let err = parser.push(b"event: posts\ndata: {oops\n\n").unwrap_err();
        assert!(matches!(err, FeedClientError::InvalidResponse(_)));
    }
}
