use log::*;

/// A capacity-bounded FIFO byte buffer.
///
/// This is the substrate both directions of a connection are built on:
/// the sender drains its outbound instance into segments, the receiver's
/// reassembler fills its inbound instance for the application to read.
/// It is a pure in-memory structure and never blocks; callers that need
/// back-pressure check `available_capacity` before writing.
#[derive(Debug)]
pub struct ByteStream {
    /// Maximum number of bytes the stream will buffer at once.
    capacity: usize,

    /// Bytes written but not yet read.
    buffer: Vec<u8>,

    /// Cumulative count of bytes ever accepted by `write`.
    bytes_written: u64,

    /// Cumulative count of bytes ever removed by `pop`/`read`.
    bytes_read: u64,

    /// Once closed no further writes are accepted.
    closed: bool,

    /// Set when the owning connection observes an unrecoverable
    /// condition (e.g. an inbound RST).
    errored: bool,
}

impl ByteStream {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffer: Vec::new(),
            bytes_written: 0,
            bytes_read: 0,
            closed: false,
            errored: false,
        }
    }

    /// Appends as many leading bytes of `data` as fit in the remaining
    /// capacity and returns the count actually written. Writing to a
    /// closed stream is a no-op.
    pub fn write(&mut self, data: &[u8]) -> usize {
        if self.closed {
            return 0;
        }

        let writable = std::cmp::min(data.len(), self.available_capacity());
        self.buffer.extend_from_slice(&data[..writable]);
        self.bytes_written += writable as u64;

        writable
    }

    pub fn available_capacity(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Marks the end of the byte stream. Idempotent.
    pub fn close(&mut self) {
        if !self.closed {
            trace!("byte stream closed after {} bytes", self.bytes_written);
        }
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// True once the stream is closed and every buffered byte has been
    /// read out.
    pub fn is_finished(&self) -> bool {
        self.closed && self.buffer.is_empty()
    }

    pub fn set_error(&mut self) {
        self.errored = true;
    }

    pub fn has_error(&self) -> bool {
        self.errored
    }

    /// A view of the currently buffered bytes without consuming them.
    pub fn peek(&self) -> &[u8] {
        &self.buffer
    }

    /// Removes up to `len` leading bytes, clamped to the buffered length.
    pub fn pop(&mut self, len: usize) {
        let removable = std::cmp::min(len, self.buffer.len());
        self.buffer.drain(..removable);
        self.bytes_read += removable as u64;
    }

    /// Removes up to `len` leading bytes and returns them.
    pub fn read(&mut self, len: usize) -> Vec<u8> {
        let removable = std::cmp::min(len, self.buffer.len());
        let bytes = self.buffer.drain(..removable).collect::<Vec<u8>>();
        self.bytes_read += removable as u64;

        bytes
    }

    pub fn bytes_buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_within_capacity() {
        let mut stream = ByteStream::new(10);

        assert_eq!(stream.write(b"cat"), 3);
        assert_eq!(stream.available_capacity(), 7);
        assert_eq!(stream.bytes_buffered(), 3);
        assert_eq!(stream.bytes_written(), 3);
        assert_eq!(stream.peek(), b"cat");
    }

    #[test]
    fn test_write_truncates_at_capacity() {
        let mut stream = ByteStream::new(4);

        assert_eq!(stream.write(b"abcdef"), 4);
        assert_eq!(stream.available_capacity(), 0);
        assert_eq!(stream.peek(), b"abcd");

        // Completely full stream drops everything
        assert_eq!(stream.write(b"gh"), 0);
        assert_eq!(stream.bytes_written(), 4);
    }

    #[test]
    fn test_write_after_close_is_noop() {
        let mut stream = ByteStream::new(10);

        stream.write(b"ab");
        stream.close();

        assert_eq!(stream.write(b"cd"), 0);
        assert_eq!(stream.bytes_written(), 2);
        assert_eq!(stream.is_closed(), true);
    }

    #[test]
    fn test_pop_and_read() {
        let mut stream = ByteStream::new(10);

        stream.write(b"hello");
        stream.pop(2);

        assert_eq!(stream.peek(), b"llo");
        assert_eq!(stream.bytes_read(), 2);

        assert_eq!(stream.read(2), b"ll");
        assert_eq!(stream.read(10), b"o");
        assert_eq!(stream.read(1), Vec::<u8>::new());
        assert_eq!(stream.bytes_read(), 5);
    }

    #[test]
    fn test_capacity_freed_by_read() {
        let mut stream = ByteStream::new(4);

        stream.write(b"abcd");
        stream.pop(3);

        assert_eq!(stream.available_capacity(), 3);
        assert_eq!(stream.write(b"efgh"), 3);
        assert_eq!(stream.peek(), b"defg");
    }

    #[test]
    fn test_is_finished() {
        let mut stream = ByteStream::new(10);

        stream.write(b"cat");
        assert_eq!(stream.is_finished(), false);

        stream.close();
        assert_eq!(stream.is_finished(), false);

        stream.pop(3);
        assert_eq!(stream.is_finished(), true);
    }

    #[test]
    fn test_counter_identity() {
        let mut stream = ByteStream::new(8);

        for chunk in &[&b"abc"[..], b"defgh", b"ijklmnop", b"q"] {
            stream.write(chunk);
            stream.pop(2);

            assert!(stream.bytes_buffered() <= 8);
            assert_eq!(
                stream.bytes_written() - stream.bytes_read(),
                stream.bytes_buffered() as u64
            );
        }
    }

    #[test]
    fn test_error_flag() {
        let mut stream = ByteStream::new(10);

        assert_eq!(stream.has_error(), false);
        stream.set_error();
        assert_eq!(stream.has_error(), true);
    }
}
