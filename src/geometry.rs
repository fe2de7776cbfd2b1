//! Maps a logical block cursor over the configured `[start_block,
//! end_block)` range, skipping bad blocks.

use crate::error::RingError;
use crate::nand::{Block, BootClock, NandDriver};
use crate::ring::{Ring, RingConfig};

fn advance(block: Block, config: &RingConfig) -> Block {
    if block + 1 == config.end_block() {
        config.start_block
    } else {
        block + 1
    }
}

impl<const N: usize, T: NandDriver, C: BootClock> Ring<N, T, C> {
    /// Delegated directly to the driver.
    pub fn is_bad(&mut self, block: Block) -> bool {
        self.nand.is_bad(block)
    }

    /// Next good block strictly after `current`, wrapping past
    /// `end_block` back to `start_block`. Returns `None` if a full
    /// revolution finds every other block bad -- including the case
    /// where `current` itself is the only good block in the range
    /// (tighter than a plain "search wrapped" check: `next_good` never
    /// hands the caller back the block it started from).
    pub fn next_good(&mut self, current: Block) -> Option<Block> {
        let config = self.config?;
        let mut b = current;
        for _ in 0..config.length {
            b = advance(b, &config);
            if b == current {
                return None;
            }
            if !self.nand.is_bad(b) {
                return Some(b);
            }
        }
        None
    }

    /// The first good block at or after `start_block`.
    pub fn first_good(&mut self) -> Option<Block> {
        let config = self.config?;
        self.next_good(config.end_block() - 1)
    }

    /// Repeatedly finds the next good block and erases it, marking and
    /// retrying on erase failure, until one erases cleanly or `length`
    /// attempts have been made without success.
    pub fn erase_next(&mut self, current: Block) -> Result<Block, RingError> {
        let config = self.config.ok_or(RingError::WrongState)?;
        let mut cursor = current;
        for _ in 0..config.length {
            let candidate = self.next_good(cursor).ok_or(RingError::RingFullyBad)?;
            match self.nand.erase(candidate) {
                Ok(()) => return Ok(candidate),
                Err(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("erase failed on block {}, marking bad", candidate);
                    self.nand.mark_bad(candidate);
                    cursor = candidate;
                }
            }
        }
        Err(RingError::RingFullyBad)
    }

    pub(crate) fn count_good(&mut self, config: &RingConfig) -> u32 {
        let mut good = 0;
        for i in 0..config.length {
            if !self.nand.is_bad(config.start_block + i) {
                good += 1;
            }
        }
        good
    }
}
