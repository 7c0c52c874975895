use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use rand::Rng;

/// Produces human-readable order numbers: `{prefix}{YYYYMMDD}-{NNNN}`.
///
/// The suffix is random, so collisions are possible; the order store rejects a
/// duplicate number and the caller asks for another one.
#[derive(Clone)]
pub struct OrderNumberGenerator {
    prefix: String,
    suffix: Arc<dyn Fn() -> u16 + Send + Sync>,
}

impl OrderNumberGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_suffix(prefix, || rand::thread_rng().gen_range(1..=9999))
    }

    /// Generator with a caller-supplied suffix source.
    pub fn with_suffix(prefix: impl Into<String>, suffix: impl Fn() -> u16 + Send + Sync + 'static) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: Arc::new(suffix),
        }
    }

    pub fn next(&self, date: NaiveDate) -> String {
        format!("{}{}-{:04}", self.prefix, date.format("%Y%m%d"), (self.suffix)() % 10_000)
    }
}

impl fmt::Debug for OrderNumberGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderNumberGenerator").field("prefix", &self.prefix).finish()
    }
}
