//! Incremental sliding-window statistics
//!
//! Welford's algorithm with add/remove support, so a fixed-size window can
//! slide across a series in O(1) per step instead of recomputing the mean
//! and variance from scratch at every position.

use std::collections::VecDeque;

/// Rolling mean / standard deviation over a fixed-size trailing window
#[derive(Debug, Clone)]
pub struct RollingStats {
    window: usize,
    values: VecDeque<f64>,
    mean: f64,
    m2: f64,
}

impl RollingStats {
    /// Create a window of `window` samples (`window` ≥ 1)
    pub fn new(window: usize) -> Self {
        debug_assert!(window >= 1, "rolling window must hold at least one sample");
        Self {
            window: window.max(1),
            values: VecDeque::with_capacity(window.max(1)),
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Push the next sample, evicting the oldest once the window is full
    pub fn push(&mut self, x: f64) {
        if self.values.len() == self.window {
            if let Some(old) = self.values.pop_front() {
                self.remove(old);
            }
        }
        self.add(x);
        self.values.push_back(x);
    }

    /// Welford add step
    fn add(&mut self, x: f64) {
        let n = (self.values.len() + 1) as f64;
        let delta = x - self.mean;
        self.mean += delta / n;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    /// Welford remove step (inverse of `add` for the sliding window)
    fn remove(&mut self, x: f64) {
        let n = self.values.len();
        if n <= 1 {
            self.mean = 0.0;
            self.m2 = 0.0;
            return;
        }
        let delta = x - self.mean;
        self.mean = (self.mean * n as f64 - x) / (n - 1) as f64;
        let delta2 = x - self.mean;
        self.m2 -= delta * delta2;
        // Floating error can leave a tiny negative residue
        if self.m2 < 0.0 {
            self.m2 = 0.0;
        }
    }

    /// Number of samples currently in the window
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the window has been filled to its configured size
    pub fn is_saturated(&self) -> bool {
        self.values.len() == self.window
    }

    /// Mean of the samples currently in the window (0.0 when empty)
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() { 0.0 } else { self.mean }
    }

    /// Sample standard deviation (n − 1 denominator; 0.0 below two samples)
    pub fn sample_std_dev(&self) -> f64 {
        let n = self.values.len();
        if n < 2 {
            return 0.0;
        }
        (self.m2 / (n - 1) as f64).sqrt()
    }
}

/// Plain mean over a slice (one-shot, non-incremental)
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_std(values: &[f64]) -> f64 {
        let m = values.iter().sum::<f64>() / values.len() as f64;
        let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
        (ss / (values.len() - 1) as f64).sqrt()
    }

    #[test]
    fn test_mean_of_slice() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0]), Some(2.0));
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_rolling_mean_before_saturation() {
        let mut stats = RollingStats::new(5);
        stats.push(10.0);
        stats.push(20.0);
        assert_eq!(stats.len(), 2);
        assert!(!stats.is_saturated());
        assert!((stats.mean() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_window_slides() {
        let mut stats = RollingStats::new(3);
        for x in [100.0, 102.0, 101.0, 103.0] {
            stats.push(x);
        }
        // Window now holds 102, 101, 103
        assert!(stats.is_saturated());
        assert!((stats.mean() - 102.0).abs() < 1e-9);
    }

    #[test]
    fn test_std_dev_matches_direct_computation() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        let mut stats = RollingStats::new(5);
        for v in values {
            stats.push(v);
        }
        assert!((stats.sample_std_dev() - sample_std(&values)).abs() < 1e-9);
    }

    #[test]
    fn test_std_dev_after_long_slide() {
        // Accuracy must hold after many add/remove cycles, not just the
        // first fill.
        let mut stats = RollingStats::new(20);
        let series: Vec<f64> = (0..500).map(|i| 100.0 + f64::from(i % 17) * 3.5).collect();
        for &v in &series {
            stats.push(v);
        }
        let tail = &series[480..];
        let direct_mean = tail.iter().sum::<f64>() / 20.0;
        assert!((stats.mean() - direct_mean).abs() < 1e-6);
        assert!((stats.sample_std_dev() - sample_std(tail)).abs() < 1e-6);
    }

    #[test]
    fn test_constant_series_has_zero_std() {
        let mut stats = RollingStats::new(20);
        for _ in 0..50 {
            stats.push(77_000.0);
        }
        assert!((stats.mean() - 77_000.0).abs() < 1e-9);
        assert!(stats.sample_std_dev().abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_std_is_zero() {
        let mut stats = RollingStats::new(20);
        stats.push(5.0);
        assert_eq!(stats.sample_std_dev(), 0.0);
    }
}
