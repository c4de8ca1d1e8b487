use super::{Ack, ByteStream, RetransmitTimer, Segment, SeqNumber, TransportConfig};
use log::*;
use std::collections::VecDeque;

/// The sending half of a connection.
///
/// Reads application bytes from its owned outbound stream, packages them
/// into segments bounded by the peer's advertised window and the
/// configured maximum payload size, and retransmits the oldest
/// unacknowledged segment with exponential timeout backoff until the
/// peer's cumulative acknowledgment covers it.
///
/// All anomalies the network can produce here (stale acknowledgments,
/// zero windows, repeated timeouts) are absorbed by policy; none of the
/// operations can fail.
#[derive(Debug)]
pub struct Sender {
    input: ByteStream,

    /// The connection's initial sequence number; absolute index 0 wraps
    /// to this value on the wire.
    isn: SeqNumber,

    initial_rto_ms: u64,
    max_payload_size: usize,

    /// Current retransmission timeout, doubled on consecutive expiries.
    rto_ms: u64,

    timer: RetransmitTimer,

    /// Absolute sequence number of the next byte (or flag) to send.
    next_seqno: u64,

    /// Segments sent but not yet fully acknowledged, oldest first.
    in_flight: VecDeque<Segment>,

    /// Expiries since the last acknowledgment that made progress.
    consecutive_retransmissions: u64,

    /// The peer's most recently advertised window. Before the first
    /// acknowledgment arrives the peer is assumed to accept one
    /// sequence number, enough for the SYN.
    window_size: u16,

    syn_sent: bool,
    fin_sent: bool,
}

impl Sender {
    pub fn new(input: ByteStream, isn: SeqNumber, config: &TransportConfig) -> Self {
        Self {
            input,
            isn,
            initial_rto_ms: config.initial_rto_ms(),
            max_payload_size: config.max_payload_size(),
            rto_ms: config.initial_rto_ms(),
            timer: RetransmitTimer::new(),
            next_seqno: 0,
            in_flight: VecDeque::new(),
            consecutive_retransmissions: 0,
            window_size: 1,
            syn_sent: false,
            fin_sent: false,
        }
    }

    /// Emits as many segments as the peer's window allows, handing each
    /// to `transmit` and queueing it for retransmission.
    ///
    /// The first segment of the connection carries SYN; once the
    /// outbound stream is finished the last segment carries FIN, window
    /// space permitting. When the peer has advertised a zero window a
    /// single sequence number may still be sent as a probe, so a window
    /// update is eventually learned.
    pub fn fill_window(&mut self, mut transmit: impl FnMut(Segment)) {
        loop {
            // A zero advertised window is treated as one for probing.
            let window = std::cmp::max(self.window_size as u64, 1);
            let in_flight = self.sequence_numbers_in_flight();

            if in_flight >= window {
                return;
            }
            let mut remaining = window - in_flight;

            let mut segment = Segment::empty(SeqNumber::wrap(self.next_seqno, self.isn));

            if !self.syn_sent {
                segment.syn = true;
                remaining -= 1;
            }

            let take = std::cmp::min(remaining, self.max_payload_size as u64) as usize;
            segment.payload = self.input.read(take);
            remaining -= segment.payload.len() as u64;

            if !self.fin_sent && self.input.is_finished() && remaining > 0 {
                segment.fin = true;
            }

            if segment.sequence_length() == 0 {
                // Nothing to say: never emit an empty segment.
                return;
            }

            self.syn_sent |= segment.syn;
            self.fin_sent |= segment.fin;
            self.next_seqno += segment.sequence_length();

            if !self.timer.active() {
                self.timer.start(self.rto_ms);
            }

            debug!(
                "sending segment {} [syn: {}, fin: {}, payload: {} bytes], {} seqnos now in flight",
                segment.seqno,
                segment.syn,
                segment.fin,
                segment.payload.len(),
                in_flight + segment.sequence_length()
            );

            self.in_flight.push_back(segment.clone());
            transmit(segment);
        }
    }

    /// Processes the peer's acknowledgment and window advertisement.
    ///
    /// Segments whose entire sequence range the acknowledgment covers
    /// leave the flight queue; each such removal is genuine progress and
    /// resets the timeout backoff. An acknowledgment claiming sequence
    /// numbers that were never sent is ignored outright.
    pub fn receive(&mut self, ack: &Ack) {
        self.window_size = ack.window_size;

        let ackno = match ack.ackno {
            Some(ackno) => ackno,
            None => return,
        };

        let ack_seqno = ackno.unwrap(self.isn, self.next_seqno);

        if ack_seqno > self.next_seqno {
            debug!(
                "ignoring acknowledgment {} beyond next seqno {}",
                ack_seqno, self.next_seqno
            );
            return;
        }

        while let Some(front) = self.in_flight.front() {
            let front_start = front.seqno.unwrap(self.isn, self.next_seqno);

            if front_start + front.sequence_length() > ack_seqno {
                break;
            }

            self.in_flight.pop_front();
            self.rto_ms = self.initial_rto_ms;
            self.consecutive_retransmissions = 0;
            self.timer.start(self.rto_ms);

            trace!(
                "acknowledged through {}, {} seqnos still in flight",
                ack_seqno,
                self.sequence_numbers_in_flight()
            );
        }

        if self.in_flight.is_empty() {
            self.timer.stop();
        }
    }

    /// Advances the retransmission timer by `ms` and retransmits the
    /// oldest in-flight segment if it has now expired.
    ///
    /// The timeout only escalates (counter increment, RTO doubling) when
    /// the peer's window is nonzero: an unacknowledged zero-window probe
    /// means the peer is stalled, not that the network lost the segment.
    pub fn tick(&mut self, ms: u64, mut transmit: impl FnMut(Segment)) {
        if !self.timer.active() {
            return;
        }

        self.timer
            .advance(ms)
            .expect("timer activity checked above");

        if !self.timer.expired() {
            return;
        }

        let oldest = match self.in_flight.front() {
            Some(segment) => segment.clone(),
            None => {
                // The timer is stopped whenever the queue drains, so an
                // expiry with nothing in flight is a defect.
                error!("retransmission timer expired with no segments in flight");
                self.timer.stop();
                return;
            }
        };

        if self.window_size > 0 {
            self.consecutive_retransmissions += 1;
            self.rto_ms *= 2;
        }

        debug!(
            "retransmitting segment {} (consecutive retransmissions: {}, rto: {}ms)",
            oldest.seqno, self.consecutive_retransmissions, self.rto_ms
        );

        self.timer.start(self.rto_ms);
        transmit(oldest);
    }

    /// An empty segment at the current position, for ack-only replies
    /// by the owning connection. Occupies no sequence numbers and is
    /// never queued for retransmission.
    pub fn make_empty_segment(&self) -> Segment {
        Segment::empty(SeqNumber::wrap(self.next_seqno, self.isn))
    }

    /// Sum of sequence lengths over the in-flight queue.
    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.in_flight
            .iter()
            .map(|segment| segment.sequence_length())
            .sum()
    }

    pub fn consecutive_retransmissions(&self) -> u64 {
        self.consecutive_retransmissions
    }

    pub fn isn(&self) -> SeqNumber {
        self.isn
    }

    /// The application's write capability for outbound bytes.
    pub fn stream_mut(&mut self) -> &mut ByteStream {
        &mut self.input
    }

    pub fn stream(&self) -> &ByteStream {
        &self.input
    }
}
