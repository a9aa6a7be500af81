/*!
 * Block Release
 *
 * Returning a block merges it with free address neighbours, puts the
 * result back on the free ring in address order and points the search
 * at it, so the next request of the same shape lands in the same place.
 */

use super::pool::{BlockId, MemoryPool};
use super::types::PoolError;
use crate::core::limits::DM_OVERHEAD;
use crate::core::types::Address;

impl MemoryPool {
    /// Block whose payload starts at `address`, if it is a live allocation
    pub(super) fn live_block(&self, address: Address) -> Option<BlockId> {
        let header_address = address.checked_sub(DM_OVERHEAD)?;
        let id = *self.by_address.get(&header_address)?;
        let header = self.header(id);
        (id != self.trailer && !header.free).then_some(id)
    }

    /// Free the block at payload `address` and coalesce it
    pub(super) fn release(&mut self, address: Address) -> Result<(), PoolError> {
        let mut id = self
            .live_block(address)
            .ok_or(PoolError::InvalidPointer(address))?;

        self.header_mut(id).free = true;
        self.available += self.block_size(id);

        let prev = self.header(id).prev_memory;
        if self.header(prev).free {
            // Absorb into the previous block, which is already on the free ring.
            self.available += DM_OVERHEAD;
            self.unlink_memory(id);
            id = prev;
        } else {
            self.link_free_ordered(id);
        }

        let next = self.header(id).next_memory;
        if self.header(next).free {
            self.available += DM_OVERHEAD;
            self.unlink_free(next);
            self.unlink_memory(next);
        }

        self.memory_list = Some(id);
        debug_assert!(self.accounting_holds());
        Ok(())
    }

    /// Drop `id` from the address ring, giving its bytes to its predecessor
    fn unlink_memory(&mut self, id: BlockId) {
        let (prev, next) = {
            let header = self.header(id);
            (header.prev_memory, header.next_memory)
        };
        self.header_mut(prev).next_memory = next;
        self.header_mut(next).prev_memory = prev;
        self.drop_header(id);
    }

    /// Put a block on the free ring after the nearest free block below it
    fn link_free_ordered(&mut self, id: BlockId) {
        let address = self.header(id).address;
        let below = self
            .by_address
            .range(..address)
            .rev()
            .map(|(_, candidate)| *candidate)
            .find(|candidate| self.header(*candidate).free);
        if let Some(prev) = below {
            self.link_free_after(prev, id);
            return;
        }

        // Lowest free block: it goes just before the old lowest one.
        let above = self
            .by_address
            .range(address..)
            .map(|(_, candidate)| *candidate)
            .find(|candidate| *candidate != id && self.header(*candidate).free);
        match above {
            Some(next) => {
                let prev = self.header(next).prev_free;
                self.link_free_after(prev, id);
            }
            None => {
                let header = self.header_mut(id);
                header.next_free = id;
                header.prev_free = id;
            }
        }
    }
}
