//! Random sources
//!
//! Every stochastic decision in the service draws from a [`RandomSource`] so
//! tests can substitute a deterministic sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Errors produced by a random source
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RandomSourceError {
    #[error("Random source exhausted")]
    Exhausted,

    #[error("Random value {0} is outside [0, 1)")]
    OutOfRange(f64),
}

/// Source of uniform values in `[0, 1)`
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> Result<f64, RandomSourceError>;
}

fn check_unit(value: f64) -> Result<f64, RandomSourceError> {
    if (0.0..1.0).contains(&value) {
        Ok(value)
    } else {
        Err(RandomSourceError::OutOfRange(value))
    }
}

/// Uniform duration in `[low, high]`
pub fn uniform_duration(
    source: &dyn RandomSource,
    low: Duration,
    high: Duration,
) -> Result<Duration, RandomSourceError> {
    let u = source.next_unit()?;
    Ok(low + high.saturating_sub(low).mul_f64(u))
}

/// Uniform choice from a non-empty slice
pub fn choose<'a, T>(source: &dyn RandomSource, items: &'a [T]) -> Result<&'a T, RandomSourceError> {
    let u = source.next_unit()?;
    let index = ((u * items.len() as f64) as usize).min(items.len().saturating_sub(1));
    items.get(index).ok_or(RandomSourceError::Exhausted)
}

/// Production source backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> Result<f64, RandomSourceError> {
        Ok(rand::thread_rng().gen::<f64>())
    }
}

/// Reproducible source seeded once
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> Result<f64, RandomSourceError> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(rng.gen::<f64>())
    }
}

/// Always yields the same value
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_unit(&self) -> Result<f64, RandomSourceError> {
        check_unit(self.0)
    }
}

/// Yields a scripted sequence, then fails with [`RandomSourceError::Exhausted`]
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    values: Mutex<VecDeque<f64>>,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
        }
    }

    /// Values not yet consumed
    pub fn remaining(&self) -> usize {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&self) -> Result<f64, RandomSourceError> {
        let next = self
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        next.ok_or(RandomSourceError::Exhausted).and_then(check_unit)
    }
}
