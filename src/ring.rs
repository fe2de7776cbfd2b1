//! The ring's own data model: configuration, lifecycle, write cursor, and
//! the top-level `Ring` type that the other modules (`geometry`, `header`,
//! `mount`, `writer`, `migrate`) add behavior to via further `impl` blocks.

use crate::error::RingError;
use crate::header::FIRST_RECORD_ID;
use crate::nand::{Block, NandDriver, Page};

/// Immutable-after-attach configuration for one ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingConfig {
    /// First block of the range, inclusive.
    pub start_block: Block,
    /// Number of blocks in the range. Must be at least 64.
    pub length: u32,
}

/// A ring is required to span at least this many blocks.
pub const MIN_RING_LENGTH: u32 = 64;

impl RingConfig {
    /// One past the last block of the range.
    pub fn end_block(&self) -> Block {
        self.start_block + self.length
    }

    pub(crate) fn validate(&self, nand: &impl NandDriver) -> Result<(), RingError> {
        if self.length < MIN_RING_LENGTH {
            return Err(RingError::ConfigInvalid("length must be at least 64 blocks"));
        }
        if self.end_block() > nand.blocks() {
            return Err(RingError::ConfigInvalid("range exceeds the NAND's block count"));
        }
        if nand.page_spare_size() < crate::header::HEADER_SIZE {
            return Err(RingError::ConfigInvalid("spare area too small for the page header"));
        }
        Ok(())
    }
}

/// Lifecycle tag: `Uninit -> Idle -> Mounted -> Idle -> Stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lifecycle {
    Uninit,
    Idle,
    Mounted,
    Stop,
}

/// The writer's next-write position plus the next record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub current_block: Block,
    pub current_page: Page,
    pub next_record_id: u64,
}

/// A contiguous span of records written between two mounts. Declared for
/// [`Ring::search_sessions`], which is unimplemented -- nothing currently
/// constructs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session {
    pub block: Block,
    pub first_id: u64,
    pub last_id: u64,
}

/// The ring journal. Generic over the scratch buffer size `N` (must be at
/// least `page_data_size + page_spare_size` for the concrete driver in
/// use), the NAND driver `T`, and the boot clock `C`.
///
/// One scratch buffer is owned per instance, so multiple rings over the
/// same chip each bring their own rather than contending for a shared one.
pub struct Ring<const N: usize, T: NandDriver, C: crate::nand::BootClock> {
    pub(crate) nand: T,
    pub(crate) clock: C,
    pub(crate) scratch: [u8; N],
    pub(crate) lifecycle: Lifecycle,
    pub(crate) config: Option<RingConfig>,
    pub(crate) cursor: Cursor,
    pub(crate) utc_correction: u32,
    /// Debug fault-injection counter. When non-zero, the next `write_page`
    /// call fails its data write before even reaching the driver,
    /// decrementing the counter. Intended for tests; production code never
    /// touches it.
    pub(crate) fault_inject: u32,
}

impl<const N: usize, T: NandDriver, C: crate::nand::BootClock> Ring<N, T, C> {
    /// Construct a ring in the `Uninit` state. No NAND operations are
    /// performed here.
    pub fn new(nand: T, clock: C, scratch: [u8; N]) -> Self {
        Ring {
            nand,
            clock,
            scratch,
            lifecycle: Lifecycle::Uninit,
            config: None,
            cursor: Cursor {
                current_block: 0,
                current_page: 0,
                next_record_id: FIRST_RECORD_ID,
            },
            utc_correction: 0,
            fault_inject: 0,
        }
    }

    /// `Uninit -> Idle`.
    pub fn init(&mut self) -> Result<(), RingError> {
        match self.lifecycle {
            Lifecycle::Uninit => {
                self.lifecycle = Lifecycle::Idle;
                Ok(())
            }
            _ => Err(RingError::WrongState),
        }
    }

    /// Bind configuration, validating geometry and spare size. Stays in
    /// `Idle`.
    pub fn start(&mut self, config: RingConfig) -> Result<(), RingError> {
        if self.lifecycle != Lifecycle::Idle {
            return Err(RingError::WrongState);
        }
        config.validate(&self.nand)?;
        if N < self.nand.page_data_size() + self.nand.page_spare_size() {
            return Err(RingError::ConfigInvalid("scratch buffer smaller than one page + spare"));
        }
        self.config = Some(config);
        Ok(())
    }

    /// Total number of good (non-bad) blocks in the configured range.
    pub fn total_good(&mut self) -> Result<u32, RingError> {
        let config = self.config.ok_or(RingError::WrongState)?;
        Ok(self.count_good(&config))
    }

    /// `Mounted -> Idle`.
    pub fn unmount(&mut self) -> Result<(), RingError> {
        if self.lifecycle != Lifecycle::Mounted {
            return Err(RingError::WrongState);
        }
        self.lifecycle = Lifecycle::Idle;
        Ok(())
    }

    /// `Idle -> Stop`. Drops the configuration.
    pub fn stop(&mut self) -> Result<(), RingError> {
        if self.lifecycle != Lifecycle::Idle {
            return Err(RingError::WrongState);
        }
        self.lifecycle = Lifecycle::Stop;
        self.config = None;
        Ok(())
    }

    /// Host-supplied correction to relate `boot_time_us` to UTC.
    ///
    /// Whether a new correction should apply immediately or only from the
    /// next mount onward is an open question this crate does not attempt
    /// to answer by guessing; the method is wired up but always returns
    /// [`RingError::NotImplemented`] until that's settled.
    pub fn set_utc_correction(&mut self, _correction: u32) -> Result<(), RingError> {
        Err(RingError::NotImplemented)
    }

    /// Enumerate sessions recorded in the ring. Unimplemented for the same
    /// reason as [`Ring::set_utc_correction`]: no session-boundary
    /// semantics have been settled yet.
    pub fn search_sessions(&mut self, _out: &mut [Session], _max: usize) -> Result<usize, RingError> {
        Err(RingError::NotImplemented)
    }

    /// Arm the debug fault-injection counter: the next `count` calls to
    /// `write_page` fail their data write before reaching the driver.
    #[doc(hidden)]
    pub fn debug_inject_write_failures(&mut self, count: u32) {
        self.fault_inject = count;
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }
}
