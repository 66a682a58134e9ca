use crate::prelude_crate::*;
use std::collections::VecDeque;

/// Stopping rule over a rolling window of scalar samples.
///
/// The window spans `round(length / velocity)` samples, the number of steps a
/// signal travelling at `velocity` needs to cross `length`. The sequence is
/// considered converged once the window is full and its standard deviation,
/// relative to its mean, falls below `tolerance`.
///
/// # Examples
/// ```
/// # use lbperm::tracer::ConvergenceTracer;
/// let mut tracer = ConvergenceTracer::new(1.0, 10.0, 1e-4);
///
/// (0..9).for_each(|_| tracer.take_value(0.25));
/// assert!(!tracer.has_converged());
///
/// tracer.take_value(0.25);
/// assert!(tracer.has_converged());
/// ```
#[derive(Debug, Clone)]
pub struct ConvergenceTracer {
    window: VecDeque<Float>,
    window_size: usize,
    tolerance: Float,
}

impl ConvergenceTracer {
    /// A window too long to represent saturates at `usize::MAX` and never fills.
    pub fn new(velocity: Float, length: Float, tolerance: Float) -> Self {
        let window_size = (length / velocity).round().max(1.0) as usize;
        ConvergenceTracer {
            window: VecDeque::new(),
            window_size,
            tolerance,
        }
    }

    pub fn with_window(window_size: usize, tolerance: Float) -> Self {
        ConvergenceTracer::new(1.0, window_size.max(1) as Float, tolerance)
    }

    pub fn take_value(&mut self, value: Float) {
        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(value);
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.window_size
    }

    pub fn has_converged(&self) -> bool {
        if !self.is_full() {
            return false;
        }
        if self.window.iter().all(|&value| value == 0.0) {
            return true;
        }
        let relative_deviation = self.get_relative_deviation();
        !relative_deviation.is_nan() && relative_deviation < self.tolerance
    }

    pub fn compute_average(&self) -> Float {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<Float>() / self.window.len() as Float
    }

    pub fn compute_std_dev(&self) -> Float {
        if self.window.is_empty() {
            return 0.0;
        }
        let average = self.compute_average();
        let variance = self
            .window
            .iter()
            .map(|value| (value - average) * (value - average))
            .sum::<Float>()
            / self.window.len() as Float;
        variance.sqrt()
    }

    /// `std_dev / |average|`, infinite for a zero average.
    pub fn get_relative_deviation(&self) -> Float {
        self.compute_std_dev() / self.compute_average().abs()
    }
}

impl ConvergenceTracer {
    pub fn get_window_size(&self) -> usize {
        self.window_size
    }

    pub fn get_number_of_samples(&self) -> usize {
        self.window.len()
    }

    pub fn get_tolerance(&self) -> Float {
        self.tolerance
    }
}

impl Default for ConvergenceTracer {
    fn default() -> Self {
        ConvergenceTracer::new(TRACER_VELOCITY, TRACER_LENGTH, TRACER_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window() {
        let tracer = ConvergenceTracer::default();

        assert_eq!(tracer.get_window_size(), 1000);
        assert_eq!(tracer.get_number_of_samples(), 0);
        assert_eq!(tracer.get_tolerance(), 1e-4);
        assert!(!tracer.has_converged());
    }

    #[test]
    fn test_window_drops_oldest_samples() {
        let mut tracer = ConvergenceTracer::with_window(3, 1e-4);

        [1.0, 2.0, 3.0, 4.0].iter().for_each(|&v| tracer.take_value(v));

        assert_eq!(tracer.get_number_of_samples(), 3);
        assert!((tracer.compute_average() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_sequence_converges_when_window_fills() {
        let mut tracer = ConvergenceTracer::with_window(50, 1e-4);

        (0..49).for_each(|_| {
            tracer.take_value(3.5e-7);
            assert!(!tracer.has_converged());
        });
        tracer.take_value(3.5e-7);

        assert!(tracer.has_converged());
    }

    #[test]
    fn test_growing_sequence_never_converges() {
        let mut tracer = ConvergenceTracer::default();

        (1..=MAX_ITERATIONS).for_each(|i| {
            tracer.take_value(1e-6 * i as Float);
            assert!(!tracer.has_converged(), "converged at sample {i}");
        });
    }

    #[test]
    fn test_zero_sequence_converges() {
        let mut tracer = ConvergenceTracer::with_window(10, 1e-4);

        (0..10).for_each(|_| tracer.take_value(0.0));

        assert!(tracer.has_converged());
    }

    #[test]
    fn test_nan_never_converges() {
        let mut tracer = ConvergenceTracer::with_window(10, 1e-4);

        (0..9).for_each(|_| tracer.take_value(1.0));
        tracer.take_value(Float::NAN);

        assert!(!tracer.has_converged());
    }

    #[test]
    fn test_huge_horizon_does_not_allocate_window() {
        let mut tracer = ConvergenceTracer::new(1.0, 1e30, 1e-4);

        (0..100).for_each(|_| tracer.take_value(1.0));

        assert_eq!(tracer.get_window_size(), usize::MAX);
        assert_eq!(tracer.get_number_of_samples(), 100);
        assert!(!tracer.has_converged());
    }

    #[test]
    fn test_oscillation_below_tolerance_converges() {
        let mut tracer = ConvergenceTracer::with_window(20, 1e-4);

        (0..20).for_each(|i| tracer.take_value(1.0 + if i % 2 == 0 { 5e-5 } else { -5e-5 }));

        assert!((tracer.get_relative_deviation() - 5e-5).abs() < 1e-9);
        assert!(tracer.has_converged());
    }
}
