//! Writes exactly one page per call, sealing a [`PageHeader`] into the
//! spare area and recovering from write failure by delegating to
//! migration.

use crate::error::RingError;
use crate::header::PageHeader;
use crate::nand::{BootClock, NandDriver};
use crate::ring::{Lifecycle, Ring};

impl<const N: usize, T: NandDriver, C: BootClock> Ring<N, T, C> {
    /// Append one record. `data` must be exactly `page_data_size` bytes.
    ///
    /// Two-phase (data-then-spare) writes mean a crash between the two
    /// leaves a CRC-invalid spare, so the page reads back as WASTED on the
    /// next mount -- correct by construction.
    pub fn write_page(&mut self, data: &[u8]) -> Result<(), RingError> {
        if self.lifecycle != Lifecycle::Mounted {
            return Err(RingError::WrongState);
        }
        if data.len() != self.nand.page_data_size() {
            return Err(RingError::BufferTooSmall);
        }
        let spare_size = self.nand.page_spare_size();

        let ecc = loop {
            match self.program_data(data) {
                Ok(ecc) => break ecc,
                Err(()) => {
                    self.recover_from_write_failure()?;
                }
            }
        };

        let header = PageHeader::seal(
            self.cursor.next_record_id,
            self.clock.boot_time_us(),
            self.utc_correction,
            ecc,
        );
        self.scratch[..spare_size].fill(0);
        header.encode(&mut self.scratch[..spare_size]);

        loop {
            let block = self.cursor.current_block;
            let page = self.cursor.current_page;
            match self.nand.write_page_spare(block, page, &self.scratch[..spare_size]) {
                Ok(()) => break,
                Err(_) => {
                    self.recover_from_write_failure()?;
                    // The page we're retrying moved to a new block; the
                    // data region there is still unwritten, so re-run the
                    // whole procedure rather than just the spare half.
                    return self.write_page(data);
                }
            }
        }

        self.advance_cursor()
    }

    /// Attempt the data-region program, honoring the debug fault-injection
    /// counter ahead of the real driver call.
    fn program_data(&mut self, data: &[u8]) -> Result<u32, ()> {
        if self.fault_inject > 0 {
            self.fault_inject -= 1;
            return Err(());
        }
        let block = self.cursor.current_block;
        let page = self.cursor.current_page;
        self.nand.write_page_data(block, page, data).map_err(|_| ())
    }

    /// A write at the cursor just failed. Mark the block bad, migrate
    /// whatever was already durable off it, and move the cursor's block to
    /// the migration target. The page index, and hence `record_id`, is
    /// left unchanged.
    fn recover_from_write_failure(&mut self) -> Result<(), RingError> {
        let failed_block = self.cursor.current_block;
        let page = self.cursor.current_page;
        #[cfg(feature = "defmt")]
        defmt::warn!("write failed at block {} page {}, migrating", failed_block, page);
        self.nand.mark_bad(failed_block);
        let new_block = self.migrate(failed_block, page)?;
        self.cursor.current_block = new_block;
        Ok(())
    }

    fn advance_cursor(&mut self) -> Result<(), RingError> {
        self.cursor.next_record_id += 1;
        self.cursor.current_page += 1;
        if self.cursor.current_page == self.nand.pages_per_block() {
            self.cursor.current_page = 0;
            self.cursor.current_block = self.erase_next(self.cursor.current_block)?;
        }
        Ok(())
    }
}
