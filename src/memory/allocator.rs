/*!
 * Block Allocation
 *
 * First-fit search of the free ring starting at the pool's search
 * pointer. An alignment request may front-split a block so the payload
 * lands on the boundary; the prefix stays free. A block with enough
 * residue is rear-split, otherwise the caller gets all of it.
 */

use super::pool::{BlockHeader, BlockId, MemoryPool};
use crate::core::limits::DM_OVERHEAD;
use crate::core::types::{Address, Size};

#[inline]
fn align_up(value: Address, alignment: Size) -> Option<Address> {
    value.checked_next_multiple_of(alignment)
}

enum Split {
    Front,
    Rear,
}

impl MemoryPool {
    /// Carve `size` bytes (already normalized) out of the free ring
    ///
    /// `alignment` of 0 means no alignment requirement. Returns the
    /// payload address, or None if no free block fits.
    pub(super) fn carve(&mut self, size: Size, alignment: Size) -> Option<Address> {
        let start = self.memory_list?;
        let mut current = start;

        let (block_size, front_split) = loop {
            let (block_size, front_split) = self.fit(current, size, alignment);
            if block_size >= size {
                break (block_size, front_split);
            }
            current = self.header(current).next_free;
            if current == start {
                return None;
            }
        };

        if let Some(split_size) = front_split {
            current = self.split_block(current, split_size, Split::Front);
        }

        if block_size >= size + DM_OVERHEAD + self.min_allocation {
            self.split_block(current, size + DM_OVERHEAD, Split::Rear);
        } else {
            self.available -= block_size;
        }

        self.header_mut(current).free = false;
        self.unlink_free(current);

        debug_assert!(self.accounting_holds());
        Some(self.header(current).address + DM_OVERHEAD)
    }

    /// Usable size of a candidate after any alignment front split
    ///
    /// Returns 0 when the block cannot serve the request at all.
    fn fit(&self, id: BlockId, size: Size, alignment: Size) -> (Size, Option<Size>) {
        let mut block_size = self.block_size(id);
        if block_size < size || alignment == 0 {
            return (block_size, None);
        }

        let address = self.header(id).address + DM_OVERHEAD;
        if address % alignment == 0 {
            return (block_size, None);
        }

        let Some(mut next_aligned) = align_up(address, alignment) else {
            return (0, None);
        };
        let mut split_size = next_aligned - address;

        // The prefix must hold its own header, the new header and a minimum block.
        if split_size < 2 * DM_OVERHEAD + self.min_allocation {
            let Some(aligned) = address
                .checked_add(2 * DM_OVERHEAD + self.min_allocation)
                .and_then(|floor| align_up(floor, alignment))
            else {
                return (0, None);
            };
            next_aligned = aligned;
            split_size = next_aligned - address;
            if split_size.checked_add(size).map_or(true, |needed| needed > block_size) {
                return (0, None);
            }
        }

        if next_aligned > address + block_size || block_size <= split_size {
            return (0, None);
        }
        block_size -= split_size;

        (block_size, Some(split_size))
    }

    /// Split `id` at `offset` bytes past its header; the new block is free
    ///
    /// A front split only costs the new header. A rear split removes the
    /// leading `offset` bytes from the free count.
    fn split_block(&mut self, id: BlockId, offset: Size, split: Split) -> BlockId {
        let (address, next_memory) = {
            let header = self.header(id);
            (header.address + offset, header.next_memory)
        };

        let new_id = self.new_header(BlockHeader {
            address,
            next_memory,
            prev_memory: id,
            next_free: id,
            prev_free: id,
            free: true,
        });
        self.header_mut(next_memory).prev_memory = new_id;
        self.header_mut(id).next_memory = new_id;
        self.link_free_after(id, new_id);

        match split {
            Split::Front => self.available -= DM_OVERHEAD,
            Split::Rear => self.available -= offset,
        }
        new_id
    }
}
