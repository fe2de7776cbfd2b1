//! On attach, locates the last durably written page, closes out an
//! interrupted block if one is found, and positions the write cursor on a
//! freshly-erased block.

use crate::error::RingError;
use crate::header::{PageHeader, FIRST_RECORD_ID, OFF_BAD_MARK};
use crate::nand::{Block, BootClock, NandDriver, Page};
use crate::ring::{Cursor, Lifecycle, Ring};

impl<const N: usize, T: NandDriver, C: BootClock> Ring<N, T, C> {
    /// `Idle -> Mounted`. Idempotent across reboots: mounting a ring
    /// interrupted mid-write produces the same cursor as mounting after a
    /// clean shutdown.
    pub fn mount(&mut self) -> Result<(), RingError> {
        if self.lifecycle != Lifecycle::Idle {
            return Err(RingError::WrongState);
        }
        let config = self.config.ok_or(RingError::WrongState)?;

        // Phase 1: viability check.
        if self.count_good(&config) < config.length / 2 {
            return Err(RingError::RingExhausted);
        }

        // Phase 2: last-block scan.
        let last_block = self.scan_last_block(&config);

        let cursor = match last_block {
            None => {
                // Unformatted ring: erase the first good block and start fresh.
                let new_block = self.erase_next(config.end_block() - 1)?;
                #[cfg(feature = "defmt")]
                defmt::debug!("mount: unformatted ring, starting fresh at block {}", new_block);
                Cursor { current_block: new_block, current_page: 0, next_record_id: FIRST_RECORD_ID }
            }
            Some(last_block) => {
                // Phase 3: last-page scan within that block.
                let ppb = self.nand.pages_per_block();
                let (last_page, last_id) = self.scan_last_page(last_block, ppb);

                // Phase 4: close the previous session, then cut over.
                self.close_session(last_block, last_page, ppb)?;
                let new_block = self.erase_next(last_block)?;
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "mount: recovered block {} page {}, resuming at block {} with next id {}",
                    last_block,
                    last_page,
                    new_block,
                    last_id + 1
                );
                Cursor { current_block: new_block, current_page: 0, next_record_id: last_id + 1 }
            }
        };

        self.cursor = cursor;
        self.lifecycle = Lifecycle::Mounted;
        Ok(())
    }

    /// Visit every good block in the configured range, in physical order,
    /// and return the one whose page-0 header carries the maximum
    /// `record_id`. Ties are resolved by the later block scanned (`id >=
    /// last_id`), which is correct because a ring's physical order is
    /// monotonic with respect to wrap: the later block holding a given
    /// maximum id is the interrupted one.
    /// Returns `None` if no good block has a CRC-valid page-0 header.
    fn scan_last_block(&mut self, config: &crate::ring::RingConfig) -> Option<Block> {
        let mut last_block = None;
        let mut last_id = FIRST_RECORD_ID;

        for i in 0..config.length {
            let block = config.start_block + i;
            if self.nand.is_bad(block) {
                continue;
            }
            let id = self.read_record_id(block, 0);
            if id >= last_id {
                last_block = Some(block);
                last_id = id;
            }
        }
        last_block
    }

    /// Within `block`, find the page with the largest CRC-valid
    /// `record_id`. At least one such page must exist -- the caller only
    /// reaches here because `block` was selected by [`Self::scan_last_block`].
    fn scan_last_page(&mut self, block: Block, pages_per_block: u32) -> (Page, u64) {
        let mut last_page = 0;
        let mut last_id = FIRST_RECORD_ID;

        for page in 0..pages_per_block {
            let id = self.read_record_id(block, page);
            if id >= last_id {
                last_page = page;
                last_id = id;
            }
        }
        (last_page, last_id)
    }

    /// Read a page's record id, treating any read failure the same as a
    /// CRC-invalid header: WASTED. There is nothing else a recovery scan
    /// can do with an unreadable page.
    fn read_record_id(&mut self, block: Block, page: Page) -> u64 {
        let spare_size = self.nand.page_spare_size();
        if self.nand.read_page_spare(block, page, &mut self.scratch[..spare_size]).is_err() {
            return crate::header::WASTED;
        }
        PageHeader::record_id_or_wasted(&self.scratch[..spare_size])
    }

    /// Overwrite the unwritten tail of an interrupted block with a pattern
    /// that produces WASTED headers, so future scans can't mistake erased
    /// pages for valid records.
    fn close_session(&mut self, block: Block, last_page: Page, pages_per_block: u32) -> Result<(), RingError> {
        if last_page == pages_per_block - 1 {
            return Ok(());
        }

        let data_size = self.nand.page_data_size();
        let spare_size = self.nand.page_spare_size();
        self.scratch[..data_size + spare_size].fill(0);
        // Vendor in-band bad-block marker: "not bad" would be 0xFFFF, but
        // the scratch pattern must read as WASTED without looking like a
        // factory-bad block, so the marker bytes are set but the rest of
        // the header (in particular spare_crc) is left zeroed.
        self.scratch[data_size + OFF_BAD_MARK..data_size + OFF_BAD_MARK + 2].fill(0xFF);

        for page in (last_page + 1)..pages_per_block {
            let data = &self.scratch[..data_size];
            let spare = &self.scratch[data_size..data_size + spare_size];
            if self.nand.write_page_whole(block, page, data, spare).is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("session-close write failed on block {}, marking bad", block);
                self.nand.mark_bad(block);
            }
        }
        Ok(())
    }
}
