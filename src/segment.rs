use super::SeqNumber;

/// A segment handed to the link layer for transmission.
///
/// This is the content of the wire segment only; framing, checksums and
/// byte-level encoding belong to the link layer that consumes it.
#[derive(Debug, PartialEq, Clone)]
pub struct Segment {
    /// The sequence number of the first byte (or of the SYN/FIN flag
    /// when the segment carries no payload).
    pub seqno: SeqNumber,

    /// Set on the first segment of the connection; consumes one
    /// sequence number.
    pub syn: bool,

    /// The payload of the segment.
    pub payload: Vec<u8>,

    /// Set on the segment carrying the final byte of the stream;
    /// consumes one sequence number.
    pub fin: bool,

    /// Connection abort indicator, propagated verbatim.
    pub rst: bool,
}

impl Segment {
    /// An empty segment occupying no sequence numbers, for ack-only
    /// replies by the owning connection.
    pub fn empty(seqno: SeqNumber) -> Segment {
        Segment {
            seqno,
            syn: false,
            payload: Vec::new(),
            fin: false,
            rst: false,
        }
    }

    /// How many sequence numbers this segment occupies: SYN and FIN
    /// each count for one, plus one per payload byte.
    pub fn sequence_length(&self) -> u64 {
        self.syn as u64 + self.payload.len() as u64 + self.fin as u64
    }
}

/// The acknowledgment record a receiver reports back to its peer's
/// sender.
#[derive(Debug, PartialEq, Clone)]
pub struct Ack {
    /// Cumulative acknowledgment: one past the highest contiguously
    /// received sequence number. Absent until the peer's SYN has been
    /// observed.
    pub ackno: Option<SeqNumber>,

    /// How many more bytes the receiver is willing to accept. The wire
    /// field is 16 bits wide.
    pub window_size: u16,

    /// Connection abort indicator, propagated verbatim.
    pub rst: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_length() {
        let mut segment = Segment::empty(SeqNumber(7));
        assert_eq!(segment.sequence_length(), 0);

        segment.syn = true;
        assert_eq!(segment.sequence_length(), 1);

        segment.payload = vec![1, 2, 3];
        assert_eq!(segment.sequence_length(), 4);

        segment.fin = true;
        assert_eq!(segment.sequence_length(), 5);
    }

    #[test]
    fn test_empty_segment() {
        let segment = Segment::empty(SeqNumber(42));

        assert_eq!(segment.seqno, SeqNumber(42));
        assert_eq!(segment.syn, false);
        assert_eq!(segment.fin, false);
        assert_eq!(segment.rst, false);
        assert_eq!(segment.payload, Vec::<u8>::new());
    }
}
