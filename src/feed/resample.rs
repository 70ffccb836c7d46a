//! Pure windowing and OHLCV aggregation.
//!
//! No storage or time-zone concerns here; input is an ascending series,
//! output is an ascending series of aggregated windows in UTC.

use chrono::{DateTime, Duration, Timelike, Utc};
use rust_decimal::Decimal;

use crate::market_data::{Bar, Level1Tick};
use crate::partitions::Resolution;

/// One aggregated output window, still in UTC.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Window {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

fn aggregate(timestamp: DateTime<Utc>, chunk: &[Bar]) -> Window {
    let mut high = chunk[0].high;
    let mut low = chunk[0].low;
    let mut volume = Decimal::ZERO;
    for bar in chunk {
        if bar.high > high {
            high = bar.high;
        }
        if bar.low < low {
            low = bar.low;
        }
        volume += bar.volume;
    }
    Window {
        timestamp,
        open: chunk[0].open,
        high,
        low,
        close: chunk[chunk.len() - 1].close,
        volume,
    }
}

/// Groups an ascending native-bar series into windows of `interval` bars.
///
/// When the resolution is Minute and the series starts off an interval
/// boundary, one extra leading window is emitted ahead of the regular
/// chunking: the bars up to the next boundary, stamped at the boundary at or
/// before the first bar. The aligned case produces no such window. Every
/// regular window carries the timestamp of its first native bar; the trailing
/// remainder forms a short final window.
pub(crate) fn resample_bars(bars: &[Bar], resolution: Resolution, interval: usize) -> Vec<Window> {
    if bars.is_empty() {
        return Vec::new();
    }

    let mut windows = Vec::with_capacity(bars.len() / interval + 2);

    if resolution == Resolution::Minute && interval > 1 {
        let misalignment = bars[0].timestamp.minute() as usize % interval;
        if misalignment > 0 {
            let head_len = (interval - misalignment).min(bars.len());
            let backdated = bars[0].timestamp - Duration::minutes(misalignment as i64);
            windows.push(aggregate(backdated, &bars[..head_len]));
        }
    }

    for chunk in bars.chunks(interval) {
        windows.push(aggregate(chunk[0].timestamp, chunk));
    }
    windows
}

/// Count-based chunking of level-1 ticks into synthetic OHLCV windows. Pure
/// chunking with no time alignment; the remainder forms a final partial
/// window. OHLC comes from each tick's `last` price, volume from `last_size`.
pub(crate) fn resample_ticks(ticks: &[Level1Tick], interval: usize) -> Vec<Window> {
    ticks
        .chunks(interval)
        .map(|chunk| {
            let mut high = chunk[0].last;
            let mut low = chunk[0].last;
            let mut volume = Decimal::ZERO;
            for tick in chunk {
                if tick.last > high {
                    high = tick.last;
                }
                if tick.last < low {
                    low = tick.last;
                }
                volume += tick.last_size;
            }
            Window {
                timestamp: chunk[0].timestamp,
                open: chunk[0].last,
                high,
                low,
                close: chunk[chunk.len() - 1].last,
                volume,
            }
        })
        .collect()
}
