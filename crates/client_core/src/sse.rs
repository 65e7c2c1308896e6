//! Incremental server-sent-events framing.
//!
//! The transport hands us arbitrary byte chunks; frames are delimited by a
//! blank line, and only `data:` fields matter to this client. Comment lines
//! (leading `:`) and the `event:`/`id:`/`retry:` fields are accepted and
//! ignored. Chunk boundaries may fall anywhere, including inside a UTF-8
//! sequence, so the decoder buffers bytes and only converts whole lines.

/// Streaming decoder turning transport chunks into event payloads.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one transport chunk; returns the payloads of every event
    /// completed by it, in arrival order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut completed = Vec::new();
        while let Some(newline_at) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_at).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(payload) = self.dispatch() {
                    completed.push(payload);
                }
            } else {
                self.accept_field(line);
            }
        }
        completed
    }

    fn accept_field(&mut self, line: &str) {
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            // A field name with no colon is valid SSE and has an empty value.
            None => (line, ""),
        };
        if field == "data" {
            self.data_lines.push(value.to_string());
        }
    }

    /// Blank line: the pending event is complete. Events with no data field
    /// dispatch nothing.
    fn dispatch(&mut self) -> Option<String> {
        if self.data_lines.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.data_lines).join("\n"))
    }
}
