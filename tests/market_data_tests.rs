//! Store-backed tests for the bar and level-1 time-series store.

mod common;

use std::sync::Arc;

use chrono::Duration;
use rust_decimal_macros::dec;

use common::*;
use tickstore::errors::Error;
use tickstore::market_data::{BarStore, Level1Batch, MarketDataRepository, PriceDataType};
use tickstore::partitions::{Partition, ProviderId, Resolution};

fn repo(db: &TestDb) -> MarketDataRepository {
    MarketDataRepository::new(Arc::clone(&db.pool))
}

#[test]
fn upsert_is_idempotent() {
    let db = setup();
    let store = repo(&db);
    let provider = ProviderId::from("Acme");
    let bars = minute_bars("MSFT", utc(2024, 3, 15, 9, 0, 0), 10);

    store
        .upsert_bars(&provider, Resolution::Minute, &bars, false)
        .unwrap();
    store
        .upsert_bars(&provider, Resolution::Minute, &bars, false)
        .unwrap();

    let partition = Partition::bars(provider.clone(), Resolution::Minute, false);
    assert_eq!(store.partition_row_count(&partition).unwrap(), 10);

    let stored = store
        .get_bars(
            &provider,
            "MSFT",
            utc(2024, 3, 15, 9, 0, 0),
            utc(2024, 3, 15, 10, 0, 0),
            Resolution::Minute,
            PriceDataType::Actual,
        )
        .unwrap();
    assert_eq!(stored, bars);
}

#[test]
fn upsert_overwrites_in_place() {
    let db = setup();
    let store = repo(&db);
    let provider = ProviderId::from("Acme");
    let mut bars = minute_bars("MSFT", utc(2024, 3, 15, 9, 0, 0), 1);

    store
        .upsert_bars(&provider, Resolution::Minute, &bars, false)
        .unwrap();
    bars[0].close = dec!(999);
    store
        .upsert_bars(&provider, Resolution::Minute, &bars, false)
        .unwrap();

    let stored = store
        .get_bars(
            &provider,
            "MSFT",
            utc(2024, 3, 15, 9, 0, 0),
            utc(2024, 3, 15, 9, 0, 0),
            Resolution::Minute,
            PriceDataType::Actual,
        )
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].close, dec!(999));
}

#[test]
fn providers_are_isolated() {
    let db = setup();
    let store = repo(&db);
    let acme = ProviderId::from("Acme");
    let globex = ProviderId::from("Globex");
    let bars = minute_bars("MSFT", utc(2024, 3, 15, 9, 0, 0), 5);

    store
        .upsert_bars(&acme, Resolution::Minute, &bars, false)
        .unwrap();
    store
        .upsert_bars(&globex, Resolution::Minute, &bars[..3], false)
        .unwrap();

    let acme_partition = Partition::bars(acme.clone(), Resolution::Minute, false);
    let globex_partition = Partition::bars(globex.clone(), Resolution::Minute, false);
    assert_eq!(store.partition_row_count(&acme_partition).unwrap(), 5);
    assert_eq!(store.partition_row_count(&globex_partition).unwrap(), 3);

    store.delete_bars(&globex, "MSFT").unwrap();
    assert_eq!(store.partition_row_count(&acme_partition).unwrap(), 5);
    assert_eq!(store.partition_row_count(&globex_partition).unwrap(), 0);
}

#[test]
fn resolutions_are_isolated() {
    let db = setup();
    let store = repo(&db);
    let provider = ProviderId::from("Acme");

    store
        .upsert_bars(
            &provider,
            Resolution::Minute,
            &minute_bars("MSFT", utc(2024, 3, 15, 9, 0, 0), 4),
            false,
        )
        .unwrap();
    store
        .upsert_bars(
            &provider,
            Resolution::Day,
            &day_bars("MSFT", utc(2024, 3, 15, 0, 0, 0), 2),
            false,
        )
        .unwrap();

    assert_eq!(
        store
            .partition_row_count(&Partition::bars(provider.clone(), Resolution::Minute, false))
            .unwrap(),
        4
    );
    assert_eq!(
        store
            .partition_row_count(&Partition::bars(provider, Resolution::Day, false))
            .unwrap(),
        2
    );
}

#[test]
fn both_merges_partitions_and_actual_wins_on_collision() {
    let db = setup();
    let store = repo(&db);
    let provider = ProviderId::from("Acme");
    let start = utc(2024, 3, 15, 9, 0, 0);

    let mut actual = minute_bars("MSFT", start, 2);
    actual[0].close = dec!(111);
    let mut synthetic = minute_bars("MSFT", start + Duration::minutes(1), 2);
    synthetic[0].close = dec!(222);

    store
        .upsert_bars(&provider, Resolution::Minute, &actual, false)
        .unwrap();
    store
        .upsert_bars(&provider, Resolution::Minute, &synthetic, true)
        .unwrap();

    let merged = store
        .get_bars(
            &provider,
            "MSFT",
            start,
            start + Duration::minutes(10),
            Resolution::Minute,
            PriceDataType::Both,
        )
        .unwrap();

    // Timestamps :00 (actual), :01 (both partitions), :02 (synthetic).
    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0].close, dec!(111));
    assert!(!merged[0].synthetic);
    assert!(!merged[1].synthetic);
    assert!(merged[2].synthetic);
}

#[test]
fn synthetic_reads_exclude_actual_rows() {
    let db = setup();
    let store = repo(&db);
    let provider = ProviderId::from("Acme");
    let start = utc(2024, 3, 15, 9, 0, 0);

    store
        .upsert_bars(&provider, Resolution::Minute, &minute_bars("MSFT", start, 3), false)
        .unwrap();
    store
        .upsert_bars(&provider, Resolution::Minute, &minute_bars("MSFT", start, 2), true)
        .unwrap();

    let synthetic = store
        .get_bars(
            &provider,
            "MSFT",
            start,
            start + Duration::minutes(10),
            Resolution::Minute,
            PriceDataType::Synthetic,
        )
        .unwrap();
    assert_eq!(synthetic.len(), 2);
    assert!(synthetic.iter().all(|b| b.synthetic));
}

#[test]
fn level1_resolution_is_rejected_on_the_bar_path() {
    let db = setup();
    let store = repo(&db);
    let provider = ProviderId::from("Acme");
    let bars = minute_bars("MSFT", utc(2024, 3, 15, 9, 0, 0), 1);

    let err = store
        .upsert_bars(&provider, Resolution::Level1, &bars, false)
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
}

#[test]
fn level1_batch_round_trips_and_rejects_raggedness() {
    let db = setup();
    let store = repo(&db);
    let provider = ProviderId::from("Acme");
    let start = utc(2024, 3, 15, 9, 0, 0);

    let batch = Level1Batch {
        datetimes: (0..4).map(|i| start + Duration::seconds(i)).collect(),
        bids: vec![dec!(99); 4],
        bid_sizes: vec![dec!(1); 4],
        asks: vec![dec!(101); 4],
        ask_sizes: vec![dec!(1); 4],
        lasts: vec![dec!(100), dec!(101), dec!(102), dec!(103)],
        last_sizes: vec![dec!(2); 4],
    };
    assert_eq!(store.upsert_level1(&provider, "MSFT", &batch).unwrap(), 4);
    // Idempotent re-apply.
    assert_eq!(store.upsert_level1(&provider, "MSFT", &batch).unwrap(), 4);

    let ticks = store
        .get_level1(&provider, "MSFT", start, start + Duration::minutes(1))
        .unwrap();
    assert_eq!(ticks.len(), 4);
    assert_eq!(ticks[0].last, dec!(100));
    assert_eq!(ticks[3].last, dec!(103));
    assert_eq!(
        store
            .partition_row_count(&Partition::level1(provider.clone()))
            .unwrap(),
        4
    );

    let ragged = Level1Batch {
        datetimes: vec![start],
        bids: vec![dec!(99), dec!(98)],
        ..Default::default()
    };
    let err = store.upsert_level1(&provider, "MSFT", &ragged).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn bar_row_count_where_filters_one_partition() {
    let db = setup();
    let store = repo(&db);
    let provider = ProviderId::from("Acme");
    let bars = minute_bars("MSFT", utc(2024, 3, 15, 9, 0, 0), 10);

    store
        .upsert_bars(&provider, Resolution::Minute, &bars, false)
        .unwrap();
    // Synthetic rows live in a different partition and must not be counted.
    store
        .upsert_bars(&provider, Resolution::Minute, &bars[..3], true)
        .unwrap();

    let actual = Partition::bars(provider.clone(), Resolution::Minute, false);
    // Closes run 105..=114, so five rows clear the threshold.
    assert_eq!(
        store.bar_row_count_where(&actual, |b| b.close >= dec!(110)).unwrap(),
        5
    );
    assert_eq!(store.bar_row_count_where(&actual, |_| true).unwrap(), 10);

    // A partition without a bar resolution has no bar rows by definition.
    assert_eq!(
        store
            .bar_row_count_where(&Partition::level1(provider), |_| true)
            .unwrap(),
        0
    );
}
