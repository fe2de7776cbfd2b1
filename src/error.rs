use std::fmt;

/// Errors surfaced by the ring journal's public API.
///
/// Transient NAND write/erase failures are *not* represented here: they are
/// absorbed locally by bad-block marking and migration (see
/// [`crate::migrate`]) unless retries are exhausted, in which case
/// [`RingError::RingFullyBad`] is returned instead of looping forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum RingError {
    /// Geometry out of range, spare area too small, or `length < 64`.
    ConfigInvalid(&'static str),
    /// Fewer than `length / 2` good blocks at mount time.
    RingExhausted,
    /// `erase_next`/migration retried `length` times without finding a
    /// good block. The device should be treated as dead.
    RingFullyBad,
    /// Call made while the ring was not in the required lifecycle state.
    WrongState,
    /// Caller's data buffer was not exactly `page_data_size` bytes.
    BufferTooSmall,
    /// Method exists but its semantics are not yet settled; refuses to
    /// guess rather than risk silently wrong behavior.
    NotImplemented,
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingError::ConfigInvalid(why) => write!(f, "invalid ring configuration: {why}"),
            RingError::RingExhausted => write!(f, "fewer than half the blocks in range are good"),
            RingError::RingFullyBad => write!(f, "no good block found within the ring's length"),
            RingError::WrongState => write!(f, "operation not valid in the current lifecycle state"),
            RingError::BufferTooSmall => write!(f, "buffer does not match the configured page size"),
            RingError::NotImplemented => write!(f, "not implemented"),
        }
    }
}

impl std::error::Error for RingError {}

/// Failure reported by a [`crate::nand::NandDriver`] operation. Distinct
/// from [`RingError`] because every driver failure is locally recoverable
/// by the writer/migration logic; it never crosses the public API as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverFailure;
