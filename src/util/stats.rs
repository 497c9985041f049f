use std::fmt::Display;

/// Min / max / mean of integer samples, such as leaf depths or visible source counts.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    /// Sum of all samples, kept exact so that the mean doesn't drift.
    pub total: usize,
}

impl Stats {
    pub fn add_sample(&mut self, value: usize) {
        self.count += 1;
        self.total += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// None if there are no samples.
    pub fn mean(&self) -> Option<f32> {
        (self.count > 0).then(|| self.total as f32 / self.count as f32)
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            count: 0,
            min: usize::MAX,
            max: 0,
            total: 0,
        }
    }
}

impl FromIterator<usize> for Stats {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut stats = Stats::default();
        for value in iter {
            stats.add_sample(value);
        }
        stats
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mean() {
            None => write!(f, "no samples"),
            Some(mean) => write!(
                f,
                "{}..={}, mean {:.1} ({} samples)",
                self.min, self.max, mean, self.count
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;

    #[test]
    fn single_sample() {
        let mut s = Stats::default();
        s.add_sample(20);
        assert!(s.count == 1);
        assert!(s.min == 20);
        assert!(s.max == 20);
        assert!(s.mean() == Some(20.0));
    }

    #[test]
    fn collect() {
        let s: Stats = [10, 30, 50, 2].into_iter().collect();
        assert!(s.count == 4);
        assert!(s.min == 2);
        assert!(s.max == 50);
        assert!(s.total == 92);
        assert!(s.mean() == Some(23.0));
    }

    #[test]
    fn empty() {
        let s = Stats::default();
        assert!(s.mean().is_none());
        assert!(format!("{s}") == "no samples");
    }

    #[test]
    fn display_format() {
        let s: Stats = [3, 4].into_iter().collect();
        assert!(format!("{s}") == "3..=4, mean 3.5 (2 samples)");
    }
}
