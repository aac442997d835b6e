/// Daily closing prices, oldest first, with provider gaps removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(closes: Vec<f64>) -> Self {
        Self { closes }
    }

    /// Build from a raw provider column, skipping missing entries rather than
    /// treating them as zero.
    pub fn from_raw_closes<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self {
            closes: raw.into_iter().flatten().collect(),
        }
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    /// (low, high) over the whole series.
    pub fn range(&self) -> Option<(f64, f64)> {
        let first = *self.closes.first()?;
        Some(
            self.closes
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }
}
