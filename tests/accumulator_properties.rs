//! Property-based tests for the statistics accumulators.
//!
//! Uses proptest to check that counts are independent of record order and
//! that coverage buckets partition the analyzed records.

mod common;

use std::collections::BTreeSet;

use marc_stats::stats::{Accumulator, CoverageStats, TagOrder, UsageStats};
use marc_stats::{Record, TagId, TagPolicy};
use proptest::prelude::*;

const TAG_POOL: &[&str] = &[
    "001", "005", "008", "020", "100", "245", "250", "260", "300", "500", "650", "700", "856",
];

fn arb_tags() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(TAG_POOL), 0..12)
}

fn arb_records() -> impl Strategy<Value = Vec<Vec<&'static str>>> {
    prop::collection::vec(arb_tags(), 0..25)
}

fn arb_order() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(TAG_POOL, 0..=TAG_POOL.len()).prop_shuffle()
}

fn build(records: &[Vec<&str>]) -> Vec<Record> {
    records.iter().map(|tags| common::record_with(tags)).collect()
}

fn order_of(tags: &[&str]) -> TagOrder {
    TagOrder::new(tags.iter().map(|t| t.parse().unwrap()).collect()).unwrap()
}

fn fold<A: Accumulator>(stats: &mut A, records: &[Record]) {
    for record in records {
        stats.add(record);
    }
}

fn coverage_of(records: &[Record], order: &TagOrder) -> CoverageStats {
    let mut stats = CoverageStats::new(order.clone());
    fold(&mut stats, records);
    stats
}

fn usage_of(records: &[Record], policy: TagPolicy) -> UsageStats {
    let mut stats = UsageStats::with_policy(policy);
    fold(&mut stats, records);
    stats
}

proptest! {
    /// Usage counts do not depend on the order records arrive in.
    #[test]
    fn prop_usage_is_order_independent(records in arb_records()) {
        let forward = build(&records);
        let mut backward = forward.clone();
        backward.reverse();

        let a = usage_of(&forward, TagPolicy::Distinct);
        let b = usage_of(&backward, TagPolicy::Distinct);
        prop_assert_eq!(a.counts().collect::<Vec<_>>(), b.counts().collect::<Vec<_>>());
        prop_assert_eq!(a.num_records(), b.num_records());
    }

    /// Coverage buckets do not depend on the order records arrive in.
    #[test]
    fn prop_coverage_is_order_independent(records in arb_records(), order in arb_order()) {
        let tag_order = order_of(&order);
        let forward = build(&records);
        let mut backward = forward.clone();
        backward.reverse();

        let a = coverage_of(&forward, &tag_order);
        let b = coverage_of(&backward, &tag_order);
        prop_assert_eq!(a.buckets().collect::<Vec<_>>(), b.buckets().collect::<Vec<_>>());
        prop_assert_eq!(a.num_uncovered(), b.num_uncovered());
        prop_assert_eq!(a.num_records(), b.num_records());
    }

    /// Folding a batch in two parts gives the same counters as one pass.
    #[test]
    fn prop_split_batches_match_single_pass(
        records in arb_records(),
        order in arb_order(),
        split in any::<prop::sample::Index>(),
    ) {
        let built = build(&records);
        let (head, tail) = built.split_at(split.index(built.len() + 1));
        let tag_order = order_of(&order);

        let mut coverage = CoverageStats::new(tag_order.clone());
        fold(&mut coverage, head);
        fold(&mut coverage, tail);
        let single = coverage_of(&built, &tag_order);
        prop_assert_eq!(coverage.buckets().collect::<Vec<_>>(), single.buckets().collect::<Vec<_>>());
        prop_assert_eq!(coverage.num_uncovered(), single.num_uncovered());
        prop_assert_eq!(coverage.num_records(), single.num_records());

        for policy in [TagPolicy::Distinct, TagPolicy::CollapseRuns] {
            let mut usage = UsageStats::with_policy(policy);
            fold(&mut usage, head);
            fold(&mut usage, tail);
            let single = usage_of(&built, policy);
            prop_assert_eq!(usage.counts().collect::<Vec<_>>(), single.counts().collect::<Vec<_>>());
            prop_assert_eq!(usage.num_records(), single.num_records());
        }
    }

    /// A distinct-tag count never exceeds the number of records, and equals
    /// the number of records containing the tag.
    #[test]
    fn prop_distinct_count_matches_membership(records in arb_records()) {
        let built = build(&records);
        let stats = usage_of(&built, TagPolicy::Distinct);
        prop_assert_eq!(stats.num_records(), records.len() as u64);
        for (tag, count) in stats.counts() {
            let expected = records
                .iter()
                .filter(|tags| tags.iter().any(|t| t.parse::<TagId>().unwrap() == tag))
                .count() as u64;
            prop_assert_eq!(count, expected);
            prop_assert!(count <= stats.num_records());
        }
    }

    /// Collapsing runs counts at least as much as distinct counting.
    #[test]
    fn prop_collapse_runs_dominates_distinct(records in arb_records()) {
        let built = build(&records);
        let distinct = usage_of(&built, TagPolicy::Distinct);
        let runs = usage_of(&built, TagPolicy::CollapseRuns);
        for (tag, count) in distinct.counts() {
            prop_assert!(runs.count(tag) >= count);
        }
    }

    /// Every analyzed record is in exactly one bucket or uncovered.
    #[test]
    fn prop_coverage_partitions_records(records in arb_records(), order in arb_order()) {
        let mut stats = CoverageStats::new(order_of(&order));
        for record in build(&records) {
            stats.add(&record);
        }
        prop_assert_eq!(stats.num_covered() + stats.num_uncovered(), stats.num_records());
        prop_assert_eq!(stats.num_records(), records.len() as u64);
    }

    /// The cumulative coverage column never decreases and ends at the
    /// number of covered records.
    #[test]
    fn prop_cumulative_coverage_is_monotone(records in arb_records(), order in arb_order()) {
        let mut stats = CoverageStats::new(order_of(&order));
        for record in build(&records) {
            stats.add(&record);
        }
        let report = stats.report();
        for pair in report.rows.windows(2) {
            prop_assert!(pair[0].total <= pair[1].total);
            prop_assert!(pair[0].percent <= pair[1].percent);
        }
        if let Some(last) = report.rows.last() {
            prop_assert_eq!(last.total, stats.num_covered());
        }
    }

    /// The bucket a record lands in is the shortest prefix holding all its tags.
    #[test]
    fn prop_bucket_is_minimal_prefix(tags in arb_tags(), order in arb_order()) {
        prop_assume!(!order.is_empty());
        let tag_order = order_of(&order);
        let record_tags: BTreeSet<TagId> = tags.iter().map(|t| t.parse().unwrap()).collect();

        let brute = (1..=order.len()).find(|&k| {
            let prefix: BTreeSet<TagId> = order[..k].iter().map(|t| t.parse().unwrap()).collect();
            record_tags.is_subset(&prefix)
        });
        prop_assert_eq!(tag_order.covering_prefix(&record_tags), brute);
    }
}
