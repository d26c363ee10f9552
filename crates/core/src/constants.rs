/// Storage bucket holding daily report photos.
pub const GALLERY_BUCKET: &str = "galleryfiles";

/// Path prefix for daily report photos inside the gallery bucket.
pub const DAILY_REPORT_PHOTO_PREFIX: &str = "daily-reports";

/// Number of photo slots on a daily report.
pub const DAILY_REPORT_PHOTO_SLOTS: u8 = 2;

/// Prefix for realtime channel names; the role is appended.
pub const CHANGE_FEED_CHANNEL_PREFIX: &str = "console-updates";

/// Default window for coalescing change notifications before a resync.
pub const DEFAULT_RESYNC_DEBOUNCE_MS: u64 = 250;

/// Decimal places used when displaying money.
pub const MONEY_DISPLAY_SCALE: u32 = 2;

/// Business name printed on exported invoices.
pub const INVOICE_ISSUER: &str = "Evergreen Tots";
