use super::ByteStream;
use log::*;
use std::collections::BTreeMap;

/// Reconstructs an ordered byte stream from fragments that may arrive
/// out of order, duplicated or overlapping.
///
/// Fragments that begin exactly at the next missing index are flushed
/// straight into the owned output stream; everything else waits in an
/// ordered map of non-overlapping pending ranges. Fragments beyond the
/// writable horizon (next missing index plus the stream's remaining
/// capacity) are dropped: that is flow control, not an error.
#[derive(Debug)]
pub struct Reassembler {
    output: ByteStream,

    /// Stream index of the first byte not yet written to the output.
    /// Monotonically non-decreasing.
    next_index: u64,

    /// Index one past the final byte of the stream, valid once
    /// `last_received` is set.
    end_index: u64,

    /// Whether the fragment carrying the end of the stream has arrived.
    last_received: bool,

    /// Buffered fragments keyed by start index. Kept free of overlaps:
    /// adjacency queries (lowest key, nearest neighbour) dominate, so an
    /// ordered map rather than a hash map.
    pending: BTreeMap<u64, Vec<u8>>,
}

impl Reassembler {
    pub fn new(output: ByteStream) -> Self {
        Self {
            output,
            next_index: 0,
            end_index: 0,
            last_received: false,
            pending: BTreeMap::new(),
        }
    }

    /// Accepts a fragment of the stream beginning at `first_index`.
    ///
    /// `is_last` marks the fragment whose final byte is the end of the
    /// stream; once every byte up to that point has been flushed the
    /// output stream is closed.
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last: bool) {
        if is_last {
            self.end_index = first_index + data.len() as u64;
            self.last_received = true;
        }

        let horizon = self.next_index + self.output.available_capacity() as u64;
        let start = std::cmp::max(first_index, self.next_index);
        let end = std::cmp::min(first_index + data.len() as u64, horizon);

        if start >= horizon {
            trace!(
                "fragment at {} dropped: beyond writable horizon {}",
                first_index,
                horizon
            );
        } else if start < end {
            let fragment =
                data[(start - first_index) as usize..(end - first_index) as usize].to_vec();
            self.merge_pending(start, fragment);
        }

        self.flush_ready();

        if self.last_received && self.next_index == self.end_index {
            self.output.close();
        }
    }

    /// Total bytes buffered in pending fragments, not yet flushed.
    pub fn bytes_pending(&self) -> u64 {
        self.pending.values().map(|data| data.len() as u64).sum()
    }

    /// Stream index of the next byte the output is missing.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    pub fn available_capacity(&self) -> usize {
        self.output.available_capacity()
    }

    pub fn stream(&self) -> &ByteStream {
        &self.output
    }

    pub fn stream_mut(&mut self) -> &mut ByteStream {
        &mut self.output
    }

    /// Folds a clamped fragment into the pending map, keeping the stored
    /// ranges disjoint. Overlapping coverage from any accepted fragment
    /// is authoritative: bytes already held are not re-stored, bytes
    /// extending past a held range are appended.
    fn merge_pending(&mut self, mut start: u64, mut data: Vec<u8>) {
        // Trim against the nearest fragment starting at or before us.
        if let Some((&prev_start, prev)) = self.pending.range(..=start).next_back() {
            let prev_end = prev_start + prev.len() as u64;

            if prev_end >= start + data.len() as u64 {
                return;
            }
            if prev_end > start {
                data.drain(..(prev_end - start) as usize);
                start = prev_end;
            }
        }

        // Absorb every fragment our range now reaches, extending with
        // any tail bytes they hold past our end.
        loop {
            let end = start + data.len() as u64;

            let (absorbed_start, tail) = match self.pending.range(start..).next() {
                Some((&next_start, next)) if next_start <= end => {
                    let next_end = next_start + next.len() as u64;

                    if next_end > end {
                        (next_start, next[(end - next_start) as usize..].to_vec())
                    } else {
                        (next_start, Vec::new())
                    }
                }
                _ => break,
            };

            data.extend_from_slice(&tail);
            self.pending.remove(&absorbed_start);
        }

        self.pending.insert(start, data);
    }

    /// Flushes pending fragments into the output stream for as long as
    /// the lowest one starts exactly at the next missing index.
    fn flush_ready(&mut self) {
        loop {
            let start = match self.pending.keys().next() {
                Some(&start) if start == self.next_index => start,
                _ => break,
            };

            let data = match self.pending.remove(&start) {
                Some(data) => data,
                None => break,
            };

            let written = self.output.write(&data);
            self.next_index += written as u64;

            if written < data.len() {
                // Output is full; keep the unflushed tail for later.
                self.pending
                    .insert(self.next_index, data[written..].to_vec());
                break;
            }

            trace!(
                "flushed {} bytes, next expected index {}",
                written,
                self.next_index
            );
        }
    }
}
