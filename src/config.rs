const DEFAULT_INITIAL_RTO: u64 = 1000; // ms
const DEFAULT_MAX_PAYLOAD_SIZE: usize = 1000; // bytes
const DEFAULT_STREAM_CAPACITY: usize = 64000; // bytes

/// Tunables for one direction of a connection.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Starting value of the retransmission timeout; doubled on each
    /// consecutive expiry while the peer advertises a nonzero window.
    initial_rto_ms: u64,

    /// Largest payload a single segment may carry.
    max_payload_size: usize,

    /// Capacity of the outbound and inbound byte streams.
    stream_capacity: usize,
}

impl TransportConfig {
    pub fn default() -> Self {
        Self {
            initial_rto_ms: DEFAULT_INITIAL_RTO,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            stream_capacity: DEFAULT_STREAM_CAPACITY,
        }
    }

    pub fn initial_rto_ms(&self) -> u64 {
        self.initial_rto_ms
    }

    pub fn with_initial_rto_ms(mut self, value: u64) -> Self {
        assert!(value > 0);
        self.initial_rto_ms = value;

        self
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    pub fn with_max_payload_size(mut self, value: usize) -> Self {
        assert!(value > 0 && value <= u16::MAX as usize);
        self.max_payload_size = value;

        self
    }

    pub fn stream_capacity(&self) -> usize {
        self.stream_capacity
    }

    pub fn with_stream_capacity(mut self, value: usize) -> Self {
        assert!(value > 0);
        self.stream_capacity = value;

        self
    }
}
