//! The resampling feed: resamples a stored series into output bars and walks
//! them newest-first through an explicit cursor.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::resample::{resample_bars, resample_ticks, Window};
use crate::errors::{Error, FeedError, Result};
use crate::exchanges::ExchangeTimeZoneSource;
use crate::instruments::Instrument;
use crate::market_data::{BarStore, PriceDataType};
use crate::partitions::{ProviderId, Resolution};
use crate::settings::{DisplayTimeZoneMode, SettingsProvider};
use crate::utils::time_utils::{parse_exchange_tz, to_display_time};

/// Whether the feed's upper bound is fixed at construction or may grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToDateMode {
    /// `[from, to]` is fixed for the feed's lifetime.
    Pinned,
    /// The feed may be re-queried up to "now" via [`BarFeed::refresh`].
    Open,
}

/// One output bar. The timestamp is wall-clock time in the configured
/// display zone; all stored data stays UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedBar {
    pub timestamp: NaiveDateTime,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Read-only resampling view over one instrument's series.
///
/// Output bars are held newest-first; the cursor starts on the most recent
/// bar and [`advance`](BarFeed::advance) steps toward older data.
pub struct BarFeed {
    settings: Arc<dyn SettingsProvider>,
    store: Arc<dyn BarStore>,
    time_zones: Arc<dyn ExchangeTimeZoneSource>,
    provider: ProviderId,
    instrument: Instrument,
    resolution: Resolution,
    interval: usize,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    to_date_mode: ToDateMode,
    bars: Vec<FeedBar>,
    position: usize,
}

impl std::fmt::Debug for BarFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarFeed")
            .field("provider", &self.provider)
            .field("instrument", &self.instrument)
            .field("resolution", &self.resolution)
            .field("interval", &self.interval)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("to_date_mode", &self.to_date_mode)
            .field("bars", &self.bars)
            .field("position", &self.position)
            .finish()
    }
}

impl BarFeed {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        store: Arc<dyn BarStore>,
        time_zones: Arc<dyn ExchangeTimeZoneSource>,
        provider: ProviderId,
        instrument: Instrument,
        resolution: Resolution,
        interval: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        to_date_mode: ToDateMode,
    ) -> Result<Self> {
        if interval < 1 {
            return Err(Error::Feed(FeedError::InvalidInterval(interval)));
        }

        let mut feed = Self {
            settings,
            store,
            time_zones,
            provider,
            instrument,
            resolution,
            interval: interval as usize,
            from,
            to,
            to_date_mode,
            bars: Vec::new(),
            position: 0,
        };
        feed.populate()?;
        Ok(feed)
    }

    /// Fetches, resamples and converts the series, newest-first, and resets
    /// the cursor.
    fn populate(&mut self) -> Result<()> {
        let windows = if self.resolution == Resolution::Level1 {
            let ticks = self.store.get_level1(
                &self.provider,
                &self.instrument.ticker,
                self.from,
                self.to,
            )?;
            resample_ticks(&ticks, self.interval)
        } else {
            let bars = self.store.get_bars(
                &self.provider,
                &self.instrument.ticker,
                self.from,
                self.to,
                self.resolution,
                PriceDataType::Both,
            )?;
            resample_bars(&bars, self.resolution, self.interval)
        };

        let mode = self.settings.display_time_zone_mode();
        let exchange_tz = self.exchange_tz(mode)?;
        self.bars = windows
            .into_iter()
            .rev()
            .map(|w| Self::to_feed_bar(w, mode, exchange_tz))
            .collect();
        self.position = 0;

        debug!(
            "Feed for {} ({} x{}) populated with {} bars",
            self.instrument.ticker,
            self.resolution.as_str(),
            self.interval,
            self.bars.len()
        );
        Ok(())
    }

    fn exchange_tz(&self, mode: DisplayTimeZoneMode) -> Result<Option<Tz>> {
        if mode != DisplayTimeZoneMode::Exchange {
            return Ok(None);
        }
        let exchange_id = &self.instrument.primary_exchange_id;
        match self.time_zones.time_zone_for_exchange(exchange_id)? {
            Some(name) => Ok(Some(parse_exchange_tz(&name, exchange_id)?)),
            None => Ok(None),
        }
    }

    fn to_feed_bar(window: Window, mode: DisplayTimeZoneMode, tz: Option<Tz>) -> FeedBar {
        FeedBar {
            timestamp: to_display_time(window.timestamp, mode, tz),
            open: window.open,
            high: window.high,
            low: window.low,
            close: window.close,
            volume: window.volume,
        }
    }

    /// Number of output bars produced.
    pub fn count(&self) -> usize {
        self.bars.len()
    }

    /// The bar the cursor points at. Position 0 is the newest bar.
    pub fn current(&self) -> Result<&FeedBar> {
        self.bars.get(self.position).ok_or(Error::Feed(
            FeedError::CursorOutOfRange {
                count: self.bars.len(),
            },
        ))
    }

    /// Steps the cursor one bar toward older data.
    pub fn advance(&mut self) -> Result<()> {
        if self.position + 1 >= self.bars.len() {
            return Err(Error::Feed(FeedError::CursorOutOfRange {
                count: self.bars.len(),
            }));
        }
        self.position += 1;
        Ok(())
    }

    /// Returns the cursor to the newest bar.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn to_date_mode(&self) -> ToDateMode {
        self.to_date_mode
    }

    /// Re-queries the store and rebuilds the series with the cursor reset. In
    /// `Open` mode the upper bound moves to "now" first; in `Pinned` mode the
    /// original bounds are reused.
    pub fn refresh(&mut self) -> Result<()> {
        if self.to_date_mode == ToDateMode::Open {
            self.to = Utc::now();
        }
        self.populate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    use crate::errors::Result;
    use crate::instruments::InstrumentType;
    use crate::market_data::{Bar, Level1Batch, Level1Tick};
    use crate::partitions::Partition;
    use crate::settings::StaticSettings;

    /// In-memory series standing in for the SQLite store.
    #[derive(Default)]
    struct MemoryStore {
        bars: Mutex<Vec<Bar>>,
        ticks: Mutex<Vec<Level1Tick>>,
    }

    impl BarStore for MemoryStore {
        fn upsert_bars(
            &self,
            _provider: &ProviderId,
            _resolution: Resolution,
            bars: &[Bar],
            _synthetic: bool,
        ) -> Result<usize> {
            let mut held = self.bars.lock().unwrap();
            held.extend_from_slice(bars);
            Ok(bars.len())
        }

        fn get_bars(
            &self,
            _provider: &ProviderId,
            ticker: &str,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
            _resolution: Resolution,
            _price_data_type: PriceDataType,
        ) -> Result<Vec<Bar>> {
            let mut matching: Vec<Bar> = self
                .bars
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.ticker == ticker && b.timestamp >= from && b.timestamp <= to)
                .cloned()
                .collect();
            matching.sort_by_key(|b| b.timestamp);
            Ok(matching)
        }

        fn upsert_level1(
            &self,
            _provider: &ProviderId,
            ticker: &str,
            batch: &Level1Batch,
        ) -> Result<usize> {
            batch.validate()?;
            let mut held = self.ticks.lock().unwrap();
            held.extend(batch.ticks(ticker));
            Ok(batch.len())
        }

        fn get_level1(
            &self,
            _provider: &ProviderId,
            ticker: &str,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<Level1Tick>> {
            let mut matching: Vec<Level1Tick> = self
                .ticks
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.ticker == ticker && t.timestamp >= from && t.timestamp <= to)
                .cloned()
                .collect();
            matching.sort_by_key(|t| t.timestamp);
            Ok(matching)
        }

        fn partition_row_count(&self, _partition: &Partition) -> Result<usize> {
            Ok(self.bars.lock().unwrap().len())
        }
    }

    struct FixedTimeZones(Option<String>);

    impl ExchangeTimeZoneSource for FixedTimeZones {
        fn time_zone_for_exchange(&self, _exchange_id: &str) -> Result<Option<String>> {
            Ok(self.0.clone())
        }
    }

    fn instrument() -> Instrument {
        Instrument {
            id: "i1".to_string(),
            instrument_type: InstrumentType::Stock,
            ticker: "MSFT".to_string(),
            name: "Microsoft".to_string(),
            description: String::new(),
            primary_exchange_id: "XNYS".to_string(),
            inception_date: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
            secondary_exchange_ids: Vec::new(),
            instrument_group_ids: Vec::new(),
        }
    }

    fn minute_bars(start_minute: u32, count: i64) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let minute = start_minute + i as u32;
                Bar {
                    ticker: "MSFT".to_string(),
                    timestamp: Utc
                        .with_ymd_and_hms(2024, 3, 15, 9 + minute / 60, minute % 60, 0)
                        .unwrap(),
                    open: dec!(100),
                    high: dec!(110),
                    low: dec!(90),
                    close: dec!(105),
                    volume: dec!(10),
                    synthetic: false,
                }
            })
            .collect()
    }

    fn feed_over(bars: Vec<Bar>, interval: i64, mode: DisplayTimeZoneMode) -> Result<BarFeed> {
        let store = Arc::new(MemoryStore::default());
        store
            .upsert_bars(&ProviderId::from("Acme"), Resolution::Minute, &bars, false)
            .unwrap();
        BarFeed::new(
            Arc::new(StaticSettings::new(mode, vec![ProviderId::from("Acme")])),
            store,
            Arc::new(FixedTimeZones(Some("America/New_York".to_string()))),
            ProviderId::from("Acme"),
            instrument(),
            Resolution::Minute,
            interval,
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
            ToDateMode::Pinned,
        )
    }

    #[test]
    fn rejects_non_positive_interval() {
        let err = feed_over(minute_bars(0, 5), 0, DisplayTimeZoneMode::Utc).unwrap_err();
        assert!(matches!(
            err,
            Error::Feed(FeedError::InvalidInterval(0))
        ));
    }

    #[test]
    fn aligned_resample_yields_five_windows() {
        let feed = feed_over(minute_bars(0, 30), 7, DisplayTimeZoneMode::Utc).unwrap();
        assert_eq!(feed.count(), 5);
    }

    #[test]
    fn misaligned_resample_adds_a_leading_partial() {
        let feed = feed_over(minute_bars(3, 30), 7, DisplayTimeZoneMode::Utc).unwrap();
        assert_eq!(feed.count(), 6);
        // Newest-first: the backdated partial window is the oldest element.
        let mut feed = feed;
        for _ in 0..5 {
            feed.advance().unwrap();
        }
        assert_eq!(
            feed.current().unwrap().timestamp,
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap().naive_utc()
        );
    }

    #[test]
    fn cursor_walks_newest_to_oldest_and_overruns() {
        let mut feed = feed_over(minute_bars(0, 30), 7, DisplayTimeZoneMode::Utc).unwrap();
        let newest = feed.current().unwrap().timestamp;
        assert_eq!(
            newest,
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 28, 0).unwrap().naive_utc()
        );

        for _ in 0..feed.count() - 1 {
            feed.advance().unwrap();
        }
        let overrun = feed.advance().unwrap_err();
        assert!(matches!(
            overrun,
            Error::Feed(FeedError::CursorOutOfRange { count: 5 })
        ));

        feed.reset();
        assert_eq!(feed.current().unwrap().timestamp, newest);
    }

    #[test]
    fn exchange_mode_shifts_display_timestamps() {
        let feed = feed_over(minute_bars(0, 7), 7, DisplayTimeZoneMode::Exchange).unwrap();
        // 09:00 UTC is 05:00 in New York during EDT.
        assert_eq!(
            feed.current().unwrap().timestamp,
            Utc.with_ymd_and_hms(2024, 3, 15, 5, 0, 0).unwrap().naive_utc()
        );
    }

    #[test]
    fn unknown_exchange_zone_fails_construction() {
        let store = Arc::new(MemoryStore::default());
        store
            .upsert_bars(
                &ProviderId::from("Acme"),
                Resolution::Minute,
                &minute_bars(0, 7),
                false,
            )
            .unwrap();
        let err = BarFeed::new(
            Arc::new(StaticSettings::new(
                DisplayTimeZoneMode::Exchange,
                vec![ProviderId::from("Acme")],
            )),
            store,
            Arc::new(FixedTimeZones(Some("Mars/Olympus".to_string()))),
            ProviderId::from("Acme"),
            instrument(),
            Resolution::Minute,
            7,
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
            ToDateMode::Pinned,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Feed(FeedError::UnknownTimeZone(_, _))
        ));
    }

    #[test]
    fn level1_path_builds_count_based_windows() {
        let store = Arc::new(MemoryStore::default());
        let batch = Level1Batch {
            datetimes: (0..5)
                .map(|i| Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, i).unwrap())
                .collect(),
            bids: vec![dec!(99); 5],
            bid_sizes: vec![dec!(1); 5],
            asks: vec![dec!(101); 5],
            ask_sizes: vec![dec!(1); 5],
            lasts: vec![dec!(100), dec!(101), dec!(102), dec!(103), dec!(104)],
            last_sizes: vec![dec!(2); 5],
        };
        store
            .upsert_level1(&ProviderId::from("Acme"), "MSFT", &batch)
            .unwrap();

        let feed = BarFeed::new(
            Arc::new(StaticSettings::default()),
            store,
            Arc::new(FixedTimeZones(None)),
            ProviderId::from("Acme"),
            instrument(),
            Resolution::Level1,
            3,
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
            ToDateMode::Pinned,
        )
        .unwrap();

        assert_eq!(feed.count(), 2);
        // Newest-first: the remainder window of 2 ticks comes first.
        assert_eq!(feed.current().unwrap().volume, dec!(4));
        assert_eq!(feed.current().unwrap().close, dec!(104));
    }

    #[test]
    fn open_mode_refresh_picks_up_new_rows() {
        let store = Arc::new(MemoryStore::default());
        store
            .upsert_bars(
                &ProviderId::from("Acme"),
                Resolution::Minute,
                &minute_bars(0, 7),
                false,
            )
            .unwrap();

        let mut feed = BarFeed::new(
            Arc::new(StaticSettings::default()),
            Arc::clone(&store) as Arc<dyn BarStore>,
            Arc::new(FixedTimeZones(None)),
            ProviderId::from("Acme"),
            instrument(),
            Resolution::Minute,
            7,
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 6, 0).unwrap(),
            ToDateMode::Open,
        )
        .unwrap();
        assert_eq!(feed.count(), 1);

        store
            .upsert_bars(
                &ProviderId::from("Acme"),
                Resolution::Minute,
                &minute_bars(7, 7),
                false,
            )
            .unwrap();
        feed.refresh().unwrap();
        assert_eq!(feed.count(), 2);
        assert!(matches!(feed.to_date_mode(), ToDateMode::Open));
    }
}
