pub mod bar_feed;
mod resample;

pub use bar_feed::{BarFeed, FeedBar, ToDateMode};
