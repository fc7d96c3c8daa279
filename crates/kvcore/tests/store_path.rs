//! End-to-end: size a slab, place records on their owning cores, sample
//! with the LCG, and verify contents with the block operations.

use std::sync::Arc;

use kvcore::prelude::*;

fn owner_of(key: u32, cores: usize) -> CoreId {
    CoreId(key % cores as u32)
}

#[test]
fn records_round_trip_through_owning_cores() {
    let cores = 4;
    let pool = CorePool::new(PoolConfig::with_cores(cores)).unwrap();
    let slab = next_power_of_two(3 * 40);
    assert_eq!(slab, 128);
    let alloc = Arc::new(HeapAllocator::with_budget(cores, slab));

    let mut rng = Lcg48::new(42);
    let mut stored = Vec::new();
    for key in 0..8u32 {
        let len = 1 + (rng.next_uint32() % 40) as usize;
        let record: Vec<u8> = (0..roundup8(len)).map(|i| (key as usize + i) as u8).collect();
        let core = owner_of(key, cores);

        let Some(block) = pool.allocate_on(&alloc, len, core).unwrap() else {
            continue;
        };
        let src = record.clone();
        let block = pool
            .run_on(core, move |here| {
                assert_eq!(here.current, core);
                let mut block = block;
                fixed_copy(block.as_bytes_mut(), &src, len);
                block
            })
            .unwrap();
        stored.push((block, record, len));
    }

    assert!(!stored.is_empty());
    for (block, record, len) in &stored {
        assert!(fixed_compare(block.as_bytes(), record, *len));
        assert!(alloc.used(block.core()) <= slab);
    }
}

#[test]
fn lcg_trace_is_reproducible_across_cores() {
    let pool = CorePool::new(PoolConfig::with_cores(3)).unwrap();
    let traces: Vec<Vec<u32>> = (0..3u32)
        .map(|core| {
            pool.run_on(CoreId(core), |_| {
                let mut rng = Lcg48::new(42);
                (0..3).map(|_| rng.next_uint32()).collect()
            })
            .unwrap()
        })
        .collect();
    for trace in &traces {
        assert_eq!(trace, &[16_159_453, 3_013_487_599, 3_954_661_394]);
    }
}

#[test]
fn barrier_between_writes_on_one_core() {
    let pool = CorePool::new(PoolConfig::with_cores(2)).unwrap();
    let out = pool
        .run_on(CoreId(1), |_| {
            let mut buf = [0u8; 8];
            buf[0] = 1;
            memory_barrier();
            buf[7] = 2;
            buf
        })
        .unwrap();
    assert_eq!(out, [1, 0, 0, 0, 0, 0, 0, 2]);
}
