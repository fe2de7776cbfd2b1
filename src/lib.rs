//! A log-structured ring journal for raw NAND flash.
//!
//! Records are appended one page at a time to a contiguous range of erase
//! blocks. The range wraps once exhausted, bad blocks are tolerated
//! transparently, and an unclean shutdown is recovered from on the next
//! [`Ring::mount`] by scanning the spare-area headers written alongside
//! each page's data.
//!
//! The five pieces of the design live in their own modules, all adding
//! `impl` blocks to the one [`Ring`](ring::Ring) type:
//!
//! - [`geometry`] -- the bad-block-skipping cursor over the configured range.
//! - [`header`] -- the spare-area record codec and its CRC.
//! - [`mount`] -- the four-phase recovery procedure run on attach.
//! - [`writer`] -- `write_page`, the only way records get appended.
//! - [`migrate`] -- rescuing already-durable pages off a block that just failed.
//!
//! This crate does not talk to hardware. [`nand::NandDriver`] and
//! [`nand::BootClock`] are the two capability traits a host implements;
//! everything here is deterministic given their contracts.

mod bytes;
mod error;
mod geometry;
mod header;
mod migrate;
mod mount;
mod nand;
mod ring;
mod writer;

pub use error::{DriverFailure, RingError};
pub use header::{PageHeader, BAD_MARK_OK, FIRST_RECORD_ID, HEADER_SIZE, WASTED};
pub use nand::{BootClock, NandDriver};
pub use ring::{Cursor, Lifecycle, Ring, RingConfig, Session, MIN_RING_LENGTH};
