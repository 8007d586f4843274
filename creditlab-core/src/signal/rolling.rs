//! Rolling mean / standard deviation over a fixed trailing window.
//!
//! The window holds the last `capacity` observations, including the current
//! one. Running sums are kept relative to an anchor value and rebuilt from the
//! buffer once per window length, so error does not accumulate across long
//! series. A window whose values are all identical reports a standard
//! deviation of exactly zero.
//!
//! Standard deviation is the sample estimator (n - 1 denominator).

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    buf: VecDeque<f64>,
    anchor: f64,
    sum: f64,
    sum_sq: f64,
    /// Non-finite observations currently in the window.
    missing: usize,
    /// Length of the trailing run of identical finite values.
    equal_run: usize,
    last: Option<f64>,
    since_rebase: usize,
}

impl RollingWindow {
    /// Empty window holding up to `capacity` observations.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "rolling window capacity must be >= 1");
        Self {
            capacity,
            buf: VecDeque::with_capacity(capacity),
            anchor: 0.0,
            sum: 0.0,
            sum_sq: 0.0,
            missing: 0,
            equal_run: 0,
            last: None,
            since_rebase: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// True once the window holds `capacity` observations with none missing.
    pub fn is_ready(&self) -> bool {
        self.buf.len() == self.capacity && self.missing == 0
    }

    /// Push the next observation, evicting the oldest when full.
    pub fn push(&mut self, x: f64) {
        if self.buf.len() == self.capacity {
            if let Some(old) = self.buf.pop_front() {
                self.remove(old);
            }
        }
        self.add(x);
        self.buf.push_back(x);

        if x.is_finite() && self.last == Some(x) {
            self.equal_run += 1;
        } else {
            self.equal_run = usize::from(x.is_finite());
        }
        self.last = Some(x);

        self.since_rebase += 1;
        if self.since_rebase >= self.capacity {
            self.rebase();
        }
    }

    fn finite_len(&self) -> usize {
        self.buf.len() - self.missing
    }

    fn add(&mut self, x: f64) {
        if !x.is_finite() {
            self.missing += 1;
            return;
        }
        if self.finite_len() == 0 {
            self.anchor = x;
            self.sum = 0.0;
            self.sum_sq = 0.0;
        }
        let d = x - self.anchor;
        self.sum += d;
        self.sum_sq += d * d;
    }

    fn remove(&mut self, x: f64) {
        if !x.is_finite() {
            self.missing -= 1;
            return;
        }
        let d = x - self.anchor;
        self.sum -= d;
        self.sum_sq -= d * d;
    }

    fn rebase(&mut self) {
        self.since_rebase = 0;
        let Some(anchor) = self.buf.iter().copied().find(|v| v.is_finite()) else {
            return;
        };
        self.anchor = anchor;
        self.sum = 0.0;
        self.sum_sq = 0.0;
        for &v in self.buf.iter().filter(|v| v.is_finite()) {
            let d = v - anchor;
            self.sum += d;
            self.sum_sq += d * d;
        }
    }

    /// Mean of the window, once it is full and complete.
    pub fn mean(&self) -> Option<f64> {
        self.is_ready()
            .then(|| self.anchor + self.sum / self.capacity as f64)
    }

    /// Sample standard deviation of the window, once it is full and complete.
    ///
    /// Undefined for a window of one observation.
    pub fn std_dev(&self) -> Option<f64> {
        if !self.is_ready() || self.capacity < 2 {
            return None;
        }
        if self.equal_run >= self.capacity {
            return Some(0.0);
        }
        let n = self.capacity as f64;
        let var = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
        Some(var.max(0.0).sqrt())
    }

    /// Z-score of the most recent observation against the window.
    ///
    /// `None` while the window is filling, when it holds a missing value, or
    /// when its standard deviation is zero.
    pub fn zscore(&self) -> Option<f64> {
        let x = *self.buf.back()?;
        let mean = self.mean()?;
        let std = self.std_dev()?;
        if std == 0.0 {
            return None;
        }
        Some((x - mean) / std)
    }
}

/// Rolling z-score of a whole series; undefined positions are NaN.
///
/// # Panics
/// If `window` is zero.
pub fn rolling_zscore(values: &[f64], window: usize) -> Vec<f64> {
    let mut acc = RollingWindow::new(window);
    values
        .iter()
        .map(|&v| {
            acc.push(v);
            acc.zscore().unwrap_or(f64::NAN)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
        assert!(
            (actual - expected).abs() < epsilon,
            "actual={actual}, expected={expected}"
        );
    }

    fn naive_mean_std(window: &[f64]) -> (f64, f64) {
        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var.sqrt())
    }

    #[test]
    fn undefined_until_full() {
        let mut w = RollingWindow::new(3);
        w.push(1.0);
        w.push(2.0);
        assert!(w.mean().is_none());
        assert!(w.zscore().is_none());
        w.push(3.0);
        assert_approx(w.mean().unwrap(), 2.0, 1e-12);
        assert_approx(w.std_dev().unwrap(), 1.0, 1e-12);
        // (3 - 2) / 1
        assert_approx(w.zscore().unwrap(), 1.0, 1e-12);
    }

    #[test]
    fn matches_naive_computation_over_long_series() {
        let values: Vec<f64> = (0..600)
            .map(|i| 2.5 + (i as f64 * 0.37).sin() * 0.8 + i as f64 * 0.001)
            .collect();
        let window = 126;
        let z = rolling_zscore(&values, window);

        for i in 0..window - 1 {
            assert!(z[i].is_nan(), "expected NaN at {i}");
        }
        for i in (window - 1)..values.len() {
            let (mean, std) = naive_mean_std(&values[i + 1 - window..=i]);
            assert_approx(z[i], (values[i] - mean) / std, 1e-8);
        }
    }

    #[test]
    fn constant_window_has_exactly_zero_std() {
        let mut w = RollingWindow::new(5);
        for _ in 0..5 {
            w.push(0.1 + 0.2);
        }
        assert_eq!(w.std_dev(), Some(0.0));
        assert!(w.zscore().is_none());
    }

    #[test]
    fn constant_tail_after_varying_prefix_is_degenerate() {
        let mut values = vec![1.0, 7.0, -3.0, 4.4];
        values.extend(std::iter::repeat(2.2).take(4));
        let z = rolling_zscore(&values, 4);
        assert!(z[7].is_nan());
        assert!(!z[6].is_nan());
    }

    #[test]
    fn missing_value_poisons_only_windows_that_contain_it() {
        let values = [1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0, 8.0];
        let z = rolling_zscore(&values, 3);
        assert!(z[2].is_nan());
        assert!(z[3].is_nan());
        assert!(z[4].is_nan());
        // window [4, 5, 6]
        assert_approx(z[5], 1.0, 1e-12);
        assert!(!z[6].is_nan());
    }

    #[test]
    fn window_of_one_is_never_defined() {
        let z = rolling_zscore(&[1.0, 2.0, 3.0], 1);
        assert!(z.iter().all(|v| v.is_nan()));
    }

    #[test]
    #[should_panic(expected = "rolling window capacity must be >= 1")]
    fn zero_capacity_panics() {
        RollingWindow::new(0);
    }

    #[test]
    fn too_few_observations() {
        let z = rolling_zscore(&[1.0, 2.0], 126);
        assert!(z.iter().all(|v| v.is_nan()));
    }
}
