//! Synthetic workload exercised by the CI strategies
//!
//! Three shapes of load: pure CPU (factorial), memory plus CPU (sorting
//! random data) and idle wait (simulated I/O).

use num::{BigUint, One};
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WorkloadError {
    #[error("Number must be non-negative, got {0}")]
    NegativeInput(i64),

    #[error("Square of {0} does not fit in 64 bits")]
    Overflow(i64),
}

/// n! computed by repeated multiplication
///
/// # Example
/// ```
/// use greenci::workload::cpu_intensive_task;
///
/// assert_eq!(cpu_intensive_task(5).unwrap().to_string(), "120");
/// assert!(cpu_intensive_task(-1).is_err());
/// ```
pub fn cpu_intensive_task(n: i64) -> Result<BigUint, WorkloadError> {
    if n < 0 {
        return Err(WorkloadError::NegativeInput(n));
    }
    Ok((1..=n as u64).fold(BigUint::one(), |acc, i| acc * i))
}

/// `size` uniform random values in [0, 1), sorted ascending
pub fn memory_intensive_task(size: usize) -> Vec<f64> {
    memory_intensive_task_with(&mut rand::thread_rng(), size)
}

pub fn memory_intensive_task_with<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Vec<f64> {
    let mut data: Vec<f64> = (0..size).map(|_| rng.gen::<f64>()).collect();
    data.sort_by(|a, b| a.total_cmp(b));
    data
}

/// Blocks for `duration`, standing in for a database or network call
pub fn io_simulation(duration: Duration) -> &'static str {
    std::thread::sleep(duration);
    "Done"
}

/// n², failing when it does not fit in an `i64` (|n| > 3_037_000_499)
pub fn heavy_processing(n: i64) -> Result<i64, WorkloadError> {
    n.checked_mul(n).ok_or(WorkloadError::Overflow(n))
}

/// Leading decimal digits of `value`
pub fn leading_digits(value: &BigUint, digits: usize) -> String {
    value.to_string().chars().take(digits).collect()
}
