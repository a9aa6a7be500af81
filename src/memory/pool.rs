/*!
 * Memory Pool Control Block
 *
 * Block headers live in an index arena instead of in the managed region.
 * Two circular lists thread through them: every block in address order
 * (`next_memory`/`prev_memory`) and the free blocks only
 * (`next_free`/`prev_free`). A permanently allocated trailer block closes
 * the address ring so merging never wraps past the end of the region.
 */

use super::types::{AllocRequest, BlockSpan, PoolInfo};
use crate::core::data_structures::InlineString;
use crate::core::limits::DM_OVERHEAD;
use crate::core::types::{Address, MemoryRegion, Size, SuspendPolicy, SuspendReason};
use crate::suspend::SuspensionList;
use std::collections::BTreeMap;

pub(super) type BlockId = usize;

#[derive(Debug, Clone)]
pub(super) struct BlockHeader {
    /// Address of the header itself; the payload starts `DM_OVERHEAD` later
    pub address: Address,
    pub next_memory: BlockId,
    pub prev_memory: BlockId,
    pub next_free: BlockId,
    pub prev_free: BlockId,
    pub free: bool,
}

/// Dynamic memory pool control block
pub struct MemoryPool {
    pub(super) name: InlineString,
    pub(super) region: MemoryRegion,
    pub(super) min_allocation: Size,
    pub(super) available: Size,
    pub(super) headers: Vec<Option<BlockHeader>>,
    spare: Vec<BlockId>,
    pub(super) by_address: BTreeMap<Address, BlockId>,
    /// Where the free-list search starts; None once nothing is free
    pub(super) memory_list: Option<BlockId>,
    pub(super) first: BlockId,
    pub(super) trailer: BlockId,
    pub(crate) waiters: SuspensionList<AllocRequest, Address>,
}

impl MemoryPool {
    /// Lay out one free block spanning the region plus the trailer
    ///
    /// Arguments are validated by the caller.
    pub(super) fn new(
        name: InlineString,
        region: MemoryRegion,
        min_allocation: Size,
        policy: SuspendPolicy,
    ) -> Self {
        let first: BlockId = 0;
        let trailer: BlockId = 1;
        let trailer_address = region.start + region.size - DM_OVERHEAD;

        let headers = vec![
            Some(BlockHeader {
                address: region.start,
                next_memory: trailer,
                prev_memory: trailer,
                next_free: first,
                prev_free: first,
                free: true,
            }),
            Some(BlockHeader {
                address: trailer_address,
                next_memory: first,
                prev_memory: first,
                next_free: trailer,
                prev_free: trailer,
                free: false,
            }),
        ];

        let mut by_address = BTreeMap::new();
        by_address.insert(region.start, first);
        by_address.insert(trailer_address, trailer);

        Self {
            name,
            region,
            min_allocation,
            available: region.size - 2 * DM_OVERHEAD,
            headers,
            spare: Vec::new(),
            by_address,
            memory_list: Some(first),
            first,
            trailer,
            waiters: SuspensionList::new(policy, SuspendReason::MemoryPool),
        }
    }

    #[inline]
    pub(super) fn header(&self, id: BlockId) -> &BlockHeader {
        match &self.headers[id] {
            Some(header) => header,
            None => unreachable!("block {} is not in the pool", id),
        }
    }

    #[inline]
    pub(super) fn header_mut(&mut self, id: BlockId) -> &mut BlockHeader {
        match &mut self.headers[id] {
            Some(header) => header,
            None => unreachable!("block {} is not in the pool", id),
        }
    }

    /// Usable bytes of a block (distance to its address successor minus the header)
    pub(super) fn block_size(&self, id: BlockId) -> Size {
        if id == self.trailer {
            return 0;
        }
        let header = self.header(id);
        self.header(header.next_memory).address - header.address - DM_OVERHEAD
    }

    /// Largest request the pool could ever satisfy
    #[inline]
    pub(super) fn capacity(&self) -> Size {
        self.region.size - 2 * DM_OVERHEAD
    }

    pub(super) fn new_header(&mut self, header: BlockHeader) -> BlockId {
        let address = header.address;
        let id = match self.spare.pop() {
            Some(id) => {
                self.headers[id] = Some(header);
                id
            }
            None => {
                self.headers.push(Some(header));
                self.headers.len() - 1
            }
        };
        self.by_address.insert(address, id);
        id
    }

    pub(super) fn drop_header(&mut self, id: BlockId) {
        if let Some(header) = self.headers[id].take() {
            self.by_address.remove(&header.address);
            self.spare.push(id);
        }
    }

    /// Insert `id` into the free ring right after `after`
    pub(super) fn link_free_after(&mut self, after: BlockId, id: BlockId) {
        let next = self.header(after).next_free;
        {
            let header = self.header_mut(id);
            header.prev_free = after;
            header.next_free = next;
        }
        self.header_mut(next).prev_free = id;
        self.header_mut(after).next_free = id;
    }

    /// Remove `id` from the free ring, keeping the search start valid
    pub(super) fn unlink_free(&mut self, id: BlockId) {
        let (prev, next) = {
            let header = self.header(id);
            (header.prev_free, header.next_free)
        };
        if next == id {
            self.memory_list = None;
        } else {
            self.header_mut(prev).next_free = next;
            self.header_mut(next).prev_free = prev;
            if self.memory_list == Some(id) {
                self.memory_list = Some(next);
            }
        }
        let header = self.header_mut(id);
        header.next_free = id;
        header.prev_free = id;
    }

    /// Every block except the trailer, in address order
    pub(super) fn spans(&self) -> Vec<BlockSpan> {
        let mut spans = Vec::new();
        let mut current = self.first;
        while current != self.trailer {
            let header = self.header(current);
            spans.push(BlockSpan {
                address: header.address + DM_OVERHEAD,
                size: self.block_size(current),
                free: header.free,
            });
            current = header.next_memory;
        }
        spans
    }

    /// Check that payload, free space and headers account for the whole region
    pub(super) fn accounting_holds(&self) -> bool {
        let spans = self.spans();
        let free: Size = spans.iter().filter(|s| s.free).map(|s| s.size).sum();
        let live: Size = spans.iter().filter(|s| !s.free).map(|s| s.size).sum();
        let headers = (spans.len() + 1) * DM_OVERHEAD;
        free == self.available && live + free + headers == self.region.size
    }

    pub(super) fn info(&self) -> PoolInfo {
        PoolInfo {
            name: self.name.clone(),
            start: self.region.start,
            pool_size: self.region.size,
            min_allocation: self.min_allocation,
            available: self.available,
            suspend_policy: self.waiters.policy(),
            tasks_waiting: self.waiters.len(),
            first_task: self.waiters.first_task(),
        }
    }
}
