/// Append-only byte accumulator used by the GIF writer.
#[derive(Debug, Default, Clone)]
pub struct ByteSink {
    buffer: Vec<u8>,
}

impl ByteSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn byte(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// little endian, like everything else in a GIF
    #[inline(always)]
    pub fn short(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn text(&mut self, text: &str) {
        self.buffer.extend_from_slice(text.as_bytes());
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorts_are_little_endian() {
        let mut sink = ByteSink::new();
        sink.short(0xA0);
        sink.short(0x1234);
        assert_eq!(sink.into_bytes(), vec![0xA0, 0x00, 0x34, 0x12]);
    }

    #[test]
    fn text_is_emitted_verbatim() {
        let mut sink = ByteSink::new();
        sink.text("GIF89a");
        sink.byte(0x3B);
        assert_eq!(sink.len(), 7);
        assert_eq!(&sink.into_bytes()[..], b"GIF89a;");
    }
}
