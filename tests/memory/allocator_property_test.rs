/*!
 * Allocator Property Tests
 * Accounting, non-overlap and alignment over random operation sequences
 */

use crate::support::boot;
use proptest::prelude::*;
use rtos_kernel::core::limits::DM_OVERHEAD;
use rtos_kernel::{MemoryRegion, Suspend, SuspendPolicy};

const POOL_SIZE: usize = 4096;

#[derive(Debug, Clone)]
enum Op {
    Allocate { size: usize, alignment: usize },
    Free { pick: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1usize..300, prop::sample::select(vec![0usize, 4, 8, 16, 32, 64, 128]))
            .prop_map(|(size, alignment)| Op::Allocate { size, alignment }),
        2 => any::<usize>().prop_map(|pick| Op::Free { pick }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_allocator_invariants(ops in prop::collection::vec(op(), 1..80)) {
        let (kernel, _scheduler) = boot();
        let pools = kernel.memory_pools();
        let pool = pools
            .create("prop", MemoryRegion::new(0x10000, POOL_SIZE), 16, SuspendPolicy::Fifo)
            .unwrap();

        // (address, requested size)
        let mut live: Vec<(usize, usize)> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate { size, alignment } => {
                    let allocated =
                        pools.allocate_aligned(pool, size, alignment, Suspend::NoSuspend);
                    if let Ok(address) = allocated {
                        if alignment > 0 {
                            prop_assert_eq!(address % alignment, 0);
                        }
                        live.push((address, size));
                    }
                }
                Op::Free { pick } => {
                    if !live.is_empty() {
                        let (address, _) = live.swap_remove(pick % live.len());
                        prop_assert!(pools.deallocate(address).is_ok());
                    }
                }
            }

            let layout = pools.layout(pool).unwrap();
            let free: usize = layout.iter().filter(|s| s.free).map(|s| s.size).sum();
            let used: usize = layout.iter().filter(|s| !s.free).map(|s| s.size).sum();
            let headers = (layout.len() + 1) * DM_OVERHEAD;
            prop_assert_eq!(used + free + headers, POOL_SIZE);
            prop_assert_eq!(free, pools.information(pool).unwrap().available);

            let mut spans = live.clone();
            spans.sort_unstable();
            for pair in spans.windows(2) {
                prop_assert!(pair[0].0 + pair[0].1 <= pair[1].0, "overlap: {:?}", pair);
            }
            for (address, size) in &spans {
                prop_assert!(*address >= 0x10000 + DM_OVERHEAD);
                prop_assert!(address + size <= 0x10000 + POOL_SIZE - DM_OVERHEAD);
            }
        }
    }
}
