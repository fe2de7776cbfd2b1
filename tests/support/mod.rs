//! Software NAND and clock simulator shared by the integration tests.
//! Mirrors the shape of a real controller driver closely enough to
//! exercise mount/recovery and migration without hardware.

use ring_nand::{BootClock, DriverFailure, NandDriver};
use std::cell::Cell;

pub struct SoftNand {
    blocks: u32,
    pages_per_block: u32,
    page_data_size: usize,
    page_spare_size: usize,
    bad: Vec<bool>,
    data: Vec<Vec<u8>>,
    spare: Vec<Vec<u8>>,
    /// Injected failures, consumed on first match.
    pub fail_write_data_at: Option<(u32, u32)>,
    pub fail_write_spare_at: Option<(u32, u32)>,
    pub fail_erase_at: Option<u32>,
}

impl SoftNand {
    pub fn new(blocks: u32, pages_per_block: u32, page_data_size: usize, page_spare_size: usize) -> Self {
        let count = (blocks * pages_per_block) as usize;
        SoftNand {
            blocks,
            pages_per_block,
            page_data_size,
            page_spare_size,
            bad: vec![false; blocks as usize],
            data: vec![vec![0xFFu8; page_data_size]; count],
            spare: vec![vec![0xFFu8; page_spare_size]; count],
            fail_write_data_at: None,
            fail_write_spare_at: None,
            fail_erase_at: None,
        }
    }

    fn idx(&self, block: u32, page: u32) -> usize {
        (block * self.pages_per_block + page) as usize
    }

    pub fn mark_bad_initially(&mut self, block: u32) {
        self.bad[block as usize] = true;
    }

    pub fn page_data(&self, block: u32, page: u32) -> &[u8] {
        &self.data[self.idx(block, page)]
    }

    pub fn page_spare(&self, block: u32, page: u32) -> &[u8] {
        &self.spare[self.idx(block, page)]
    }
}

impl NandDriver for SoftNand {
    fn blocks(&self) -> u32 {
        self.blocks
    }
    fn pages_per_block(&self) -> u32 {
        self.pages_per_block
    }
    fn page_data_size(&self) -> usize {
        self.page_data_size
    }
    fn page_spare_size(&self) -> usize {
        self.page_spare_size
    }
    fn is_bad(&mut self, block: u32) -> bool {
        self.bad[block as usize]
    }
    fn mark_bad(&mut self, block: u32) {
        self.bad[block as usize] = true;
    }
    fn erase(&mut self, block: u32) -> Result<(), DriverFailure> {
        if self.fail_erase_at == Some(block) {
            self.fail_erase_at = None;
            return Err(DriverFailure);
        }
        for page in 0..self.pages_per_block {
            let idx = self.idx(block, page);
            self.data[idx].iter_mut().for_each(|b| *b = 0xFF);
            self.spare[idx].iter_mut().for_each(|b| *b = 0xFF);
        }
        Ok(())
    }
    fn read_page_spare(&mut self, block: u32, page: u32, buf: &mut [u8]) -> Result<(), DriverFailure> {
        let idx = self.idx(block, page);
        buf.copy_from_slice(&self.spare[idx][..buf.len()]);
        Ok(())
    }
    fn write_page_data(&mut self, block: u32, page: u32, data: &[u8]) -> Result<u32, DriverFailure> {
        if self.fail_write_data_at == Some((block, page)) {
            self.fail_write_data_at = None;
            return Err(DriverFailure);
        }
        let idx = self.idx(block, page);
        self.data[idx].copy_from_slice(data);
        Ok(0x1234_5678)
    }
    fn write_page_spare(&mut self, block: u32, page: u32, spare: &[u8]) -> Result<(), DriverFailure> {
        if self.fail_write_spare_at == Some((block, page)) {
            self.fail_write_spare_at = None;
            return Err(DriverFailure);
        }
        let idx = self.idx(block, page);
        self.spare[idx][..spare.len()].copy_from_slice(spare);
        Ok(())
    }
    fn write_page_whole(&mut self, block: u32, page: u32, data: &[u8], spare: &[u8]) -> Result<(), DriverFailure> {
        let idx = self.idx(block, page);
        self.data[idx].copy_from_slice(data);
        self.spare[idx][..spare.len()].copy_from_slice(spare);
        Ok(())
    }
    fn move_page_data(&mut self, src: u32, dst: u32, page: u32, _scratch: &mut [u8]) -> Result<(), DriverFailure> {
        let src_idx = self.idx(src, page);
        let dst_idx = self.idx(dst, page);
        self.data[dst_idx] = self.data[src_idx].clone();
        self.spare[dst_idx] = self.spare[src_idx].clone();
        Ok(())
    }
}

/// A clock that ticks forward by one microsecond per read, so successive
/// pages never share a `boot_time_us` in tests that care about ordering.
pub struct TickingClock(Cell<u64>);

impl TickingClock {
    pub fn new() -> Self {
        TickingClock(Cell::new(0))
    }
}

impl BootClock for TickingClock {
    fn boot_time_us(&self) -> u64 {
        let t = self.0.get();
        self.0.set(t + 1);
        t
    }
}
