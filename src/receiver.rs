use super::{Ack, ByteStream, Reassembler, Segment, SeqNumber};
use log::*;

/// The receiving half of a connection.
///
/// Feeds incoming segments into its owned reassembler and derives the
/// cumulative acknowledgment and advertised window from reassembler
/// state. Sequence numbers are translated between the wire's wrapping
/// 32-bit space and absolute stream indices using the peer's ISN
/// (captured from the SYN) and the next missing index as checkpoint.
///
/// In absolute sequence space the SYN occupies index 0, payload bytes
/// start at index 1, and the FIN occupies one index past the final
/// byte; stream indices are therefore absolute seqnos minus one.
#[derive(Debug)]
pub struct Receiver {
    reassembler: Reassembler,

    /// The peer's initial sequence number; absent until a SYN arrives,
    /// and nothing is acknowledged before then.
    isn: Option<SeqNumber>,

    /// Whether the peer has signalled an abort.
    rst: bool,
}

impl Receiver {
    pub fn new(reassembler: Reassembler) -> Self {
        Self {
            reassembler,
            isn: None,
            rst: false,
        }
    }

    /// Processes one incoming segment, in whatever order the network
    /// delivered it. Duplicates and overlaps are harmless; segments
    /// arriving before the peer's SYN are ignored entirely.
    pub fn receive(&mut self, segment: &Segment) {
        if segment.rst {
            self.rst = true;
            self.reassembler.stream_mut().set_error();
        }

        if segment.syn {
            debug!("captured peer isn {}", segment.seqno);
            self.isn = Some(segment.seqno);
            self.reassembler.insert(0, &segment.payload, segment.fin);
            return;
        }

        let isn = match self.isn {
            Some(isn) => isn,
            None => {
                trace!("segment {} ignored: no syn observed yet", segment.seqno);
                return;
            }
        };

        // The first unassembled absolute seqno is the checkpoint: the
        // true position of any deliverable segment is within a window
        // of it, far inside the 2^31 disambiguation bound.
        let checkpoint = self.reassembler.next_index() + 1;
        let abs_seqno = segment.seqno.unwrap(isn, checkpoint);

        if abs_seqno == 0 {
            // Claims to occupy the ISN itself, below the payload index
            // space; nothing a well-behaved peer sends maps here.
            trace!("segment {} ignored: addresses the syn", segment.seqno);
            return;
        }

        self.reassembler
            .insert(abs_seqno - 1, &segment.payload, segment.fin);
    }

    /// The acknowledgment record to report back to the peer's sender.
    ///
    /// The ackno is one past the highest contiguously received sequence
    /// number: the next missing stream index plus one for the SYN, plus
    /// one more once the FIN has been fully accounted for. The window
    /// is the reassembler's writable capacity clamped to the 16-bit
    /// wire field.
    pub fn ack(&self) -> Ack {
        let ackno = self.isn.map(|isn| {
            let mut abs_ackno = self.reassembler.next_index() + 1;

            if self.reassembler.stream().is_closed() {
                abs_ackno += 1;
            }

            SeqNumber::wrap(abs_ackno, isn)
        });

        let window_size =
            std::cmp::min(self.reassembler.available_capacity(), u16::MAX as usize) as u16;

        Ack {
            ackno,
            window_size,
            rst: self.rst,
        }
    }

    pub fn bytes_pending(&self) -> u64 {
        self.reassembler.bytes_pending()
    }

    /// The application's read capability for inbound bytes.
    pub fn stream_mut(&mut self) -> &mut ByteStream {
        self.reassembler.stream_mut()
    }

    pub fn stream(&self) -> &ByteStream {
        self.reassembler.stream()
    }
}
