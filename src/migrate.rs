//! Preserves already-written pages off a block that just failed a write,
//! then hands the writer a fresh one.

use crate::error::RingError;
use crate::nand::{Block, BootClock, NandDriver, Page};
use crate::ring::Ring;

impl<const N: usize, T: NandDriver, C: BootClock> Ring<N, T, C> {
    /// `failed_block` just failed a write at page `p`. Returns the block
    /// the writer should retry on.
    ///
    /// `p == 0` means nothing was durably written to `failed_block` yet, so
    /// there is nothing to preserve. Otherwise pages `[0, p)` are copied to
    /// the new block via the driver's move primitive; if the move itself
    /// fails, the destination is marked bad and another block is tried, up
    /// to `length` attempts before giving up on the whole ring.
    pub(crate) fn migrate(&mut self, failed_block: Block, p: Page) -> Result<Block, RingError> {
        if p == 0 {
            return self.erase_next(failed_block);
        }

        let config = self.config.ok_or(RingError::WrongState)?;
        let data_size = self.nand.page_data_size();
        let spare_size = self.nand.page_spare_size();
        let mut search_from = failed_block;

        for _ in 0..config.length {
            let new_block = self.erase_next(search_from)?;
            let mut ok = true;
            for page in 0..p {
                let scratch = &mut self.scratch[..data_size + spare_size];
                if self.nand.move_page_data(failed_block, new_block, page, scratch).is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("move failed onto block {}, marking bad and retrying", new_block);
                    self.nand.mark_bad(new_block);
                    ok = false;
                    break;
                }
            }
            if ok {
                return Ok(new_block);
            }
            search_from = new_block;
        }
        #[cfg(feature = "defmt")]
        defmt::error!("migration exhausted {} candidates, ring is fully bad", config.length);
        Err(RingError::RingFullyBad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverFailure;
    use crate::ring::RingConfig;

    struct FixedClock;
    impl BootClock for FixedClock {
        fn boot_time_us(&self) -> u64 {
            0
        }
    }

    struct FakeNand {
        bad: [bool; 64],
        move_fails_on: Option<Block>,
        moved: Vec<(Block, Block, Page)>,
    }

    impl FakeNand {
        fn new() -> Self {
            FakeNand { bad: [false; 64], move_fails_on: None, moved: Vec::new() }
        }
    }

    impl NandDriver for FakeNand {
        fn blocks(&self) -> Block {
            64
        }
        fn pages_per_block(&self) -> u32 {
            64
        }
        fn page_data_size(&self) -> usize {
            2048
        }
        fn page_spare_size(&self) -> usize {
            64
        }
        fn is_bad(&mut self, block: Block) -> bool {
            self.bad[block as usize]
        }
        fn mark_bad(&mut self, block: Block) {
            self.bad[block as usize] = true;
        }
        fn erase(&mut self, _block: Block) -> Result<(), DriverFailure> {
            Ok(())
        }
        fn read_page_spare(&mut self, _b: Block, _p: u32, _buf: &mut [u8]) -> Result<(), DriverFailure> {
            Ok(())
        }
        fn write_page_data(&mut self, _b: Block, _p: u32, _d: &[u8]) -> Result<u32, DriverFailure> {
            Ok(0)
        }
        fn write_page_spare(&mut self, _b: Block, _p: u32, _s: &[u8]) -> Result<(), DriverFailure> {
            Ok(())
        }
        fn write_page_whole(&mut self, _b: Block, _p: u32, _d: &[u8], _s: &[u8]) -> Result<(), DriverFailure> {
            Ok(())
        }
        fn move_page_data(&mut self, src: Block, dst: Block, page: Page, _scratch: &mut [u8]) -> Result<(), DriverFailure> {
            if self.move_fails_on == Some(dst) {
                return Err(DriverFailure);
            }
            self.moved.push((src, dst, page));
            Ok(())
        }
    }

    fn ring() -> Ring<2112, FakeNand, FixedClock> {
        let nand = FakeNand::new();
        let mut r = Ring::new(nand, FixedClock, [0u8; 2112]);
        r.init().unwrap();
        r.start(RingConfig { start_block: 0, length: 64 }).unwrap();
        r
    }

    #[test]
    fn p_zero_just_erases_next_block_without_moving() {
        let mut r = ring();
        let new_block = r.migrate(0, 0).unwrap();
        assert_eq!(new_block, 1);
        assert!(r.nand.moved.is_empty());
    }

    #[test]
    fn p_nonzero_copies_written_prefix() {
        let mut r = ring();
        let new_block = r.migrate(0, 5).unwrap();
        assert_eq!(new_block, 1);
        assert_eq!(r.nand.moved, vec![(0, 1, 0), (0, 1, 1), (0, 1, 2), (0, 1, 3), (0, 1, 4)]);
    }

    #[test]
    fn failed_move_marks_destination_bad_and_retries() {
        let mut r = ring();
        r.nand.move_fails_on = Some(1);
        let new_block = r.migrate(0, 3).unwrap();
        assert_eq!(new_block, 2);
        assert!(r.nand.bad[1]);
        assert_eq!(r.nand.moved, vec![(0, 2, 0), (0, 2, 1), (0, 2, 2)]);
    }
}
