/// Required prefix of every meaningful upstream record.
const RECORD_PREFIX: &str = "data: ";

/// Incremental decoder for the upstream SSE byte stream.
///
/// Raw chunks arrive in arbitrary sizes and may split any boundary,
/// including the middle of a multi-byte UTF-8 sequence. The decoder
/// accumulates bytes and only converts a record to text once its
/// terminating `\n\n` separator has arrived, so a decoded record is always
/// a whole UTF-8 sequence regardless of where the chunk boundaries fell.
///
/// Records that do not start with `data: ` are silently discarded, and a
/// non-empty leftover tail at end of input is simply dropped when the
/// decoder goes away with its session.
#[derive(Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    /// Appends one raw chunk and returns the payloads of all records
    /// completed by it, in order, with the `data: ` prefix stripped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(idx) = find_separator(&self.buf) {
            let record = self.buf[..idx].to_vec();
            self.buf.drain(..idx + 2);
            if let Some(payload) = record_payload(&record) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Returns the number of buffered bytes not yet terminated by a
    /// separator.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}

fn find_separator(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

fn record_payload(record: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(record);
    text.strip_prefix(RECORD_PREFIX).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(decoder: &mut FrameDecoder, chunks: &[&[u8]]) -> Vec<String> {
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend(decoder.push(chunk));
        }
        out
    }

    #[test]
    fn whole_records_in_one_chunk() {
        let mut decoder = FrameDecoder::default();
        let records = decoder.push(b"data: one\n\ndata: two\n\n");
        assert_eq!(records, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn record_split_across_chunks() {
        let mut decoder = FrameDecoder::default();
        let records = decode_all(&mut decoder, &[b"data: hel", b"lo\n", b"\n"]);
        assert_eq!(records, vec!["hello".to_string()]);
    }

    #[test]
    fn separator_split_across_chunks() {
        let mut decoder = FrameDecoder::default();
        assert!(decoder.push(b"data: a\n").is_empty());
        assert_eq!(decoder.push(b"\ndata: b\n\n"), vec!["a", "b"]);
    }

    #[test]
    fn per_byte_fragmentation_yields_same_records() {
        let input = b"data: first\n\ndata: second\n\ndata: [DONE]\n\n";
        let mut decoder = FrameDecoder::default();
        let mut records = Vec::new();
        for byte in input {
            records.extend(decoder.push(std::slice::from_ref(byte)));
        }
        assert_eq!(records, vec!["first", "second", "[DONE]"]);
    }

    #[test]
    fn multibyte_utf8_split_mid_sequence() {
        let text = "data: 华容道\n\n";
        let bytes = text.as_bytes();
        // Split inside the first multi-byte character.
        let (head, tail) = bytes.split_at(8);
        let mut decoder = FrameDecoder::default();
        assert!(decoder.push(head).is_empty());
        assert_eq!(decoder.push(tail), vec!["华容道"]);
    }

    #[test]
    fn records_without_data_prefix_are_dropped() {
        let mut decoder = FrameDecoder::default();
        let records = decoder.push(b": comment\n\nevent: ping\n\ndata: kept\n\n");
        assert_eq!(records, vec!["kept"]);
    }

    #[test]
    fn unterminated_tail_stays_buffered() {
        let mut decoder = FrameDecoder::default();
        let records = decoder.push(b"data: done\n\ndata: partial");
        assert_eq!(records, vec!["done"]);
        assert_eq!(decoder.pending_len(), "data: partial".len());
    }

    #[test]
    fn empty_record_between_separators_is_dropped() {
        let mut decoder = FrameDecoder::default();
        let records = decoder.push(b"data: a\n\n\n\ndata: b\n\n");
        assert_eq!(records, vec!["a", "b"]);
    }
}
