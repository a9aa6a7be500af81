/*!
 * Partition Pool Control Block
 *
 * Every partition is `PM_OVERHEAD + partition_size` bytes. Free
 * partitions form a LIFO stack threaded through their header links; an
 * allocated partition's link holds a marker instead, which is what lets
 * a release tell a live partition from a stray address.
 */

use super::types::PartitionInfo;
use crate::core::data_structures::InlineString;
use crate::core::limits::PM_OVERHEAD;
use crate::core::types::{Address, MemoryRegion, Size, SuspendPolicy, SuspendReason};
use crate::suspend::SuspensionList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PartitionLink {
    Next(usize),
    End,
    Allocated,
}

/// Partition pool control block
pub struct PartitionPool {
    pub(super) name: InlineString,
    pub(super) region: MemoryRegion,
    pub(super) partition_size: Size,
    links: Vec<PartitionLink>,
    head: Option<usize>,
    pub(super) available: usize,
    pub(crate) waiters: SuspensionList<(), Address>,
}

impl PartitionPool {
    /// Carve the region into as many partitions as fit, all free
    pub(super) fn new(
        name: InlineString,
        region: MemoryRegion,
        partition_size: Size,
        policy: SuspendPolicy,
    ) -> Self {
        let count = region.size / (partition_size + PM_OVERHEAD);
        let links = (0..count)
            .map(|i| {
                if i + 1 < count {
                    PartitionLink::Next(i + 1)
                } else {
                    PartitionLink::End
                }
            })
            .collect();

        Self {
            name,
            region,
            partition_size,
            links,
            head: (count > 0).then_some(0),
            available: count,
            waiters: SuspensionList::new(policy, SuspendReason::Partition),
        }
    }

    #[inline]
    fn stride(&self) -> Size {
        self.partition_size + PM_OVERHEAD
    }

    #[inline]
    pub(super) fn total(&self) -> usize {
        self.links.len()
    }

    fn address_of(&self, index: usize) -> Address {
        self.region.start + index * self.stride() + PM_OVERHEAD
    }

    /// Index of the partition whose payload starts at `address`
    fn index_of(&self, address: Address) -> Option<usize> {
        let offset = address.checked_sub(self.region.start + PM_OVERHEAD)?;
        if offset % self.stride() != 0 {
            return None;
        }
        let index = offset / self.stride();
        (index < self.total()).then_some(index)
    }

    /// Whether `address` is a partition currently handed out
    pub(super) fn is_allocated(&self, address: Address) -> bool {
        self.index_of(address)
            .is_some_and(|index| self.links[index] == PartitionLink::Allocated)
    }

    /// Pop the free stack
    pub(super) fn pop(&mut self) -> Option<Address> {
        let index = self.head?;
        self.head = match self.links[index] {
            PartitionLink::Next(next) => Some(next),
            _ => None,
        };
        self.links[index] = PartitionLink::Allocated;
        self.available -= 1;
        Some(self.address_of(index))
    }

    /// Push an allocated partition back on the free stack
    pub(super) fn push(&mut self, address: Address) -> bool {
        let Some(index) = self.index_of(address) else {
            return false;
        };
        if self.links[index] != PartitionLink::Allocated {
            return false;
        }
        self.links[index] = match self.head {
            Some(head) => PartitionLink::Next(head),
            None => PartitionLink::End,
        };
        self.head = Some(index);
        self.available += 1;
        true
    }

    /// Free partitions in the order they would be handed out
    pub(super) fn free_stack(&self) -> Vec<Address> {
        let mut stack = Vec::with_capacity(self.available);
        let mut cursor = self.head;
        while let Some(index) = cursor {
            stack.push(self.address_of(index));
            cursor = match self.links[index] {
                PartitionLink::Next(next) => Some(next),
                _ => None,
            };
        }
        stack
    }

    pub(super) fn info(&self) -> PartitionInfo {
        PartitionInfo {
            name: self.name.clone(),
            start: self.region.start,
            pool_size: self.region.size,
            partition_size: self.partition_size,
            available: self.available,
            allocated: self.total() - self.available,
            suspend_policy: self.waiters.policy(),
            tasks_waiting: self.waiters.len(),
            first_task: self.waiters.first_task(),
        }
    }
}
