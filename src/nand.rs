//! NAND driver and clock capability traits.
//!
//! These are consumed, not implemented, by this crate: the host firmware
//! supplies a concrete [`NandDriver`] bound to its NAND controller and a
//! [`BootClock`] bound to a boot-relative monotonic timer. Test code
//! supplies a software simulator instead (see `tests/support`).

use crate::error::DriverFailure;

/// Erase-block index, counted from zero across the whole chip.
pub type Block = u32;

/// Block-relative page index, counted from zero within a block.
pub type Page = u32;

/// Capability set a NAND controller driver must expose to the journal.
///
/// Every fallible operation returns [`DriverFailure`]: a unit-like error,
/// since the journal's only response to any of them is "mark the block bad
/// and migrate" (append/migrate) or "treat as WASTED" (read). There is
/// nothing finer-grained for the journal to act on.
pub trait NandDriver {
    /// Total number of erase blocks on the chip.
    fn blocks(&self) -> Block;
    /// Number of pages per erase block.
    fn pages_per_block(&self) -> u32;
    /// Size in bytes of a page's data region.
    fn page_data_size(&self) -> usize;
    /// Size in bytes of a page's spare (out-of-band) region.
    fn page_spare_size(&self) -> usize;

    /// Is this block marked bad?
    fn is_bad(&mut self, block: Block) -> bool;
    /// Mark this block bad. No return value: there is no fallback action.
    fn mark_bad(&mut self, block: Block);
    /// Erase a block to the all-erased state.
    fn erase(&mut self, block: Block) -> Result<(), DriverFailure>;
    /// Read a page's spare area in full.
    fn read_page_spare(&mut self, block: Block, page: Page, buf: &mut [u8]) -> Result<(), DriverFailure>;
    /// Program a page's data region only. Returns the ECC word the
    /// controller computed over the data, opaque to this crate.
    fn write_page_data(&mut self, block: Block, page: Page, data: &[u8]) -> Result<u32, DriverFailure>;
    /// Program a page's spare region only.
    fn write_page_spare(&mut self, block: Block, page: Page, spare: &[u8]) -> Result<(), DriverFailure>;
    /// Program both data and spare regions of a page in one call. Used only
    /// by session-close padding.
    fn write_page_whole(&mut self, block: Block, page: Page, data: &[u8], spare: &[u8]) -> Result<(), DriverFailure>;
    /// Driver-assisted copy of one page's data *and* spare regions from
    /// `src` to `dst`, using `scratch` as working space (sized for one
    /// page: data followed by spare). The spare must travel with the data
    /// -- it carries the page's sealed header, and a migrated page that
    /// loses its header reads back as WASTED on the next mount.
    fn move_page_data(&mut self, src: Block, dst: Block, page: Page, scratch: &mut [u8]) -> Result<(), DriverFailure>;
}

/// Boot-relative monotonic microsecond clock.
pub trait BootClock {
    /// Microseconds elapsed since this boot. Not wall-clock time; the host
    /// supplies [`crate::ring::RingConfig::utc_correction`] to relate the
    /// two out of band.
    fn boot_time_us(&self) -> u64;
}
