//! Line reassembly over a chunked byte stream.

/// Accumulates raw chunks and yields complete lines.
///
/// Multi-byte UTF-8 sequences split across chunks are held back until the
/// rest arrives. Bytes that can never form valid UTF-8 become U+FFFD.
#[derive(Debug, Default)]
pub struct LineBuffer {
    bytes: Vec<u8>,
    text: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completed, without the line
    /// terminator (`\n` or `\r\n`).
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.bytes.extend_from_slice(chunk);
        self.decode_available();

        let mut lines = Vec::new();
        while let Some(pos) = self.text.find('\n') {
            let mut line: String = self.text.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Flush whatever is left at end of stream as a final line.
    pub fn finish(&mut self) -> Option<String> {
        if !self.bytes.is_empty() {
            self.text.push_str(&String::from_utf8_lossy(&self.bytes));
            self.bytes.clear();
        }
        let mut rest = std::mem::take(&mut self.text);
        if rest.ends_with('\r') {
            rest.pop();
        }
        (!rest.is_empty()).then_some(rest)
    }

    fn decode_available(&mut self) {
        loop {
            match std::str::from_utf8(&self.bytes) {
                Ok(text) => {
                    self.text.push_str(text);
                    self.bytes.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.bytes[..valid]));
                    match e.error_len() {
                        // Truncated sequence at the end: wait for more bytes
                        None => {
                            self.bytes.drain(..valid);
                            return;
                        }
                        Some(len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            self.bytes.drain(..valid + len);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reassembles_lines_across_chunks() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"data: he").is_empty());
        assert_eq!(buf.push(b"llo\ndata: wor"), vec!["data: hello"]);
        assert_eq!(buf.push(b"ld\n\n"), vec!["data: world", ""]);
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn strips_crlf() {
        let mut buf = LineBuffer::new();
        assert_eq!(buf.push(b"a\r\nb\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn keeps_multibyte_sequence_split_across_chunks() {
        // "é" is 0xC3 0xA9, "あ" is 0xE3 0x81 0x82
        let mut buf = LineBuffer::new();
        assert!(buf.push(&[b'x', 0xC3]).is_empty());
        assert!(buf.push(&[0xA9, 0xE3, 0x81]).is_empty());
        assert_eq!(buf.push(&[0x82, b'\n']), vec!["xéあ"]);
    }

    #[test]
    fn replaces_invalid_bytes() {
        let mut buf = LineBuffer::new();
        assert_eq!(buf.push(&[b'a', 0xFF, b'b', b'\n']), vec!["a\u{FFFD}b"]);
    }

    #[test]
    fn finish_returns_unterminated_tail() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"data: [DONE]").is_empty());
        assert_eq!(buf.finish().as_deref(), Some("data: [DONE]"));
    }

    #[test]
    fn finish_flushes_truncated_sequence_lossily() {
        let mut buf = LineBuffer::new();
        buf.push(&[b'z', 0xE3, 0x81]);
        assert_eq!(buf.finish().as_deref(), Some("z\u{FFFD}"));
    }
}
