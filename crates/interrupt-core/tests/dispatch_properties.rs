//! Property and scenario coverage for the dispatch timeline engine.
//!
//! These tests drive whole traces through the public API and check the
//! timing invariants every run must hold.

#![allow(clippy::pedantic, clippy::nursery)]

use interrupt_core::{
    expand, DeviceDelayTable, DispatchError, DispatchTables, ErrorClass, Operation,
    RandomizedSplitter, ServiceSplitter, TableKind, TimelineStep, TimingProfile, TraceDriver,
    TraceRecord, VectorDirectory,
};
use proptest::prelude::*;
use rand::rngs::mock::StepRng;
use rand_chacha as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

const VECTORS: [u16; 25] = [
    0x01E3, 0x029C, 0x0695, 0x042B, 0x0292, 0x048B, 0x0639, 0x00BD, 0x06EF, 0x036C, 0x07B0,
    0x01F8, 0x03B9, 0x06C7, 0x0165, 0x0584, 0x02DF, 0x05B3, 0x060A, 0x0765, 0x07B7, 0x0523,
    0x03B7, 0x028C, 0x05E8,
];

const DELAYS: [u64; 20] = [
    110, 150, 40, 250, 50, 50, 150, 930, 220, 100, 100, 160, 190, 230, 90, 210, 220, 120, 260,
    250,
];

fn tables() -> DispatchTables {
    DispatchTables::new(
        VectorDirectory::build(&VECTORS),
        DeviceDelayTable::build(DELAYS),
    )
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (0u64..2_000).prop_map(|burst| Operation::Cpu { burst }),
        (1i64..=20).prop_map(|call| Operation::Syscall { call }),
        (1i64..=20).prop_map(|device| Operation::EndIo { device }),
    ]
}

fn trace_of(operations: &[Operation]) -> Vec<TraceRecord> {
    operations
        .iter()
        .enumerate()
        .map(|(index, operation)| TraceRecord::new(index + 1, *operation))
        .collect()
}

fn render(operations: &[Operation], seed: u64) -> String {
    let mut driver = TraceDriver::new(
        tables(),
        TimingProfile::STANDARD,
        RandomizedSplitter::seeded(seed),
    );
    driver.run(&trace_of(operations)).expect("valid trace runs");
    driver.finish().0.render()
}

proptest! {
    #[test]
    fn property_isr_and_transfer_sum_to_service_time(seed in any::<u64>(), call in 1i64..=20) {
        let expansion = expand(
            &Operation::Syscall { call },
            0,
            &tables(),
            &TimingProfile::STANDARD,
            &mut RandomizedSplitter::seeded(seed),
        )
        .expect("built call expands");

        let base = DELAYS[usize::try_from(call - 1).expect("positive call")];
        let isr = expansion.steps[4].duration;
        let transfer = expansion.steps[5].duration;
        prop_assert_eq!(isr + transfer, base);
        prop_assert!(isr >= base / 2);
        prop_assert_eq!(expansion.split.map(|s| s.total()), Some(base));
    }

    #[test]
    fn property_split_is_exact_for_any_base(seed in any::<u64>(), base in any::<u64>()) {
        let split = RandomizedSplitter::seeded(seed).split(base);
        prop_assert_eq!(split.isr().checked_add(split.transfer()), Some(base));
    }

    #[test]
    fn property_start_times_are_running_sums(
        operations in prop::collection::vec(operation_strategy(), 0..40),
        seed in any::<u64>(),
    ) {
        let mut driver = TraceDriver::new(
            tables(),
            TimingProfile::STANDARD,
            RandomizedSplitter::seeded(seed),
        );
        driver.run(&trace_of(&operations)).expect("valid trace runs");

        let mut running = 0u64;
        for step in driver.timeline().steps() {
            prop_assert_eq!(step.start, running);
            running += step.duration;
        }
        prop_assert_eq!(driver.clock(), running);
    }

    #[test]
    fn property_same_seed_is_byte_identical(
        operations in prop::collection::vec(operation_strategy(), 0..20),
        seed in any::<u64>(),
    ) {
        prop_assert_eq!(render(&operations, seed), render(&operations, seed));
    }

    #[test]
    fn property_vector_lookup_bounds(len in 0usize..=25, probe in -5i64..40) {
        let directory = VectorDirectory::build(&VECTORS[..len]);
        let result = directory.lookup(probe);
        let in_range = probe >= 1 && usize::try_from(probe).is_ok_and(|p| p <= len);
        if in_range {
            let entry = result.expect("in-range lookup succeeds");
            let index = usize::try_from(probe - 1).expect("positive probe");
            prop_assert_eq!(u64::from(entry.memory_address), 2 * u64::try_from(probe).expect("positive"));
            prop_assert_eq!(entry.target_address, VECTORS[index]);
        } else {
            prop_assert_eq!(
                result,
                Err(DispatchError::OutOfRange { table: TableKind::Vector, number: probe, len })
            );
        }
    }
}

#[test]
fn cpu_record_at_zero_is_one_step() {
    let mut driver = TraceDriver::new(
        tables(),
        TimingProfile::STANDARD,
        RandomizedSplitter::seeded(0),
    );
    driver
        .feed(&TraceRecord::new(1, Operation::Cpu { burst: 500 }))
        .expect("cpu feeds");
    assert_eq!(
        driver.timeline().steps(),
        &[TimelineStep::new(0, 500, "CPU execution")]
    );
    assert_eq!(driver.clock(), 500);
}

#[test]
fn end_io_with_canonical_costs_advances_by_listed_components() {
    let delays = DeviceDelayTable::build([110, 150, 40]);
    let tables = DispatchTables::new(VectorDirectory::build(&VECTORS), delays);
    let expansion = expand(
        &Operation::EndIo { device: 3 },
        0,
        &tables,
        &TimingProfile::STANDARD,
        &mut RandomizedSplitter::new(StepRng::new(0, 1)),
    )
    .expect("device 3 is built");
    assert_eq!(expansion.steps.len(), 10);
    // priority + masked, kernel switch, save, find, load, service, restore, user switch, iret
    assert_eq!(expansion.clock, 1 + 1 + 1 + 10 + 1 + 1 + 40 + 10 + 1 + 1);
}

#[rstest]
#[case(Operation::Syscall { call: 26 }, TableKind::Vector)]
#[case(Operation::Syscall { call: 21 }, TableKind::Delay)]
#[case(Operation::EndIo { device: 0 }, TableKind::Vector)]
fn out_of_range_record_appends_nothing(#[case] operation: Operation, #[case] table: TableKind) {
    let mut driver = TraceDriver::new(
        tables(),
        TimingProfile::STANDARD,
        RandomizedSplitter::seeded(3),
    );
    driver
        .feed(&TraceRecord::new(1, Operation::Cpu { burst: 10 }))
        .expect("cpu feeds");

    let error = driver
        .feed(&TraceRecord::new(2, operation))
        .expect_err("unbuilt number fails");

    assert_eq!(error.line, 2);
    assert!(matches!(error.source, DispatchError::OutOfRange { table: t, .. } if t == table));
    assert!(error.source.class().is_fatal());
    assert_eq!(error.source.class(), ErrorClass::OutOfRange);
    assert_eq!(driver.timeline().len(), 1);
    assert_eq!(driver.clock(), 10);
}

#[test]
fn timing_overrides_reproduce_historical_vector_cost() {
    let trace = trace_of(&[Operation::Syscall { call: 1 }]);
    let run = |timing: TimingProfile| {
        let mut driver = TraceDriver::new(tables(), timing, RandomizedSplitter::seeded(11));
        driver.run(&trace).expect("call 1 runs");
        driver.clock()
    };
    let mut custom = TimingProfile::STANDARD;
    custom.find_vector = 25;
    assert_eq!(run(custom), run(TimingProfile::SLOW_VECTOR));
    assert_eq!(run(custom) - run(TimingProfile::STANDARD), 24);
}
