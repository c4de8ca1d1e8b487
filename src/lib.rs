//! User-space reliability engine of a TCP-like byte-stream transport.
//!
//! The crate reconstructs an ordered byte stream on top of an unreliable
//! datagram network that may reorder, duplicate or drop segments. It is
//! built from a chain of exclusively-owned pieces: a [`Sender`] drains
//! its outbound [`ByteStream`] into window-bounded [`Segment`]s and
//! retransmits on timeout; a [`Receiver`] feeds incoming segments
//! through a [`Reassembler`] into its inbound stream and reports a
//! cumulative [`Ack`] back. Everything is synchronous and non-blocking;
//! the owning application's event loop delivers segments and supplies
//! elapsed time, and a transmit callback carries segments to whatever
//! link layer frames them.

mod byte_stream;
mod config;
mod reassembler;
mod receiver;
mod segment;
mod sender;
mod seq_number;
mod timer;

pub use byte_stream::*;
pub use config::*;
pub use reassembler::*;
pub use receiver::*;
pub use segment::*;
pub use sender::*;
pub use seq_number::*;
pub use timer::*;
