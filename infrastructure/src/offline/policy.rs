//! Tunable parameters of the offline generator.

use rand::Rng;
use std::time::Duration;

/// Inclusive range a delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn from_millis(min: u64, max: u64) -> Self {
        Self::new(Duration::from_millis(min), Duration::from_millis(max))
    }

    /// A range that always yields `delay`
    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, delay)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

/// Probabilities and timings for simulated replies
#[derive(Debug, Clone, PartialEq)]
pub struct OfflinePolicy {
    /// Chance that a reply fails with a simulated error
    pub failure_probability: f64,
    /// Chance that a successful reply is an article card
    pub card_probability: f64,
    /// Pause between streamed characters
    pub char_delay: DelayRange,
    /// Pause before a text reply starts streaming
    pub reply_delay: DelayRange,
    /// Pause before a simulated failure is reported
    pub failure_delay: DelayRange,
    /// Pause between marking a reply as a card and streaming its guide text
    pub card_delay: Duration,
    /// Pause between the guide text and the card payload
    pub card_settle: Duration,
    /// Fixed seed for reproducible replies
    pub seed: Option<u64>,
}

impl Default for OfflinePolicy {
    fn default() -> Self {
        Self {
            failure_probability: 0.2,
            card_probability: 0.2,
            char_delay: DelayRange::from_millis(20, 50),
            reply_delay: DelayRange::from_millis(1000, 2000),
            failure_delay: DelayRange::from_millis(1500, 2500),
            card_delay: Duration::from_millis(800),
            card_settle: Duration::from_millis(300),
            seed: None,
        }
    }
}

impl OfflinePolicy {
    /// A policy with no delays, for tests and scripted demos
    pub fn instant() -> Self {
        Self {
            char_delay: DelayRange::fixed(Duration::ZERO),
            reply_delay: DelayRange::fixed(Duration::ZERO),
            failure_delay: DelayRange::fixed(Duration::ZERO),
            card_delay: Duration::ZERO,
            card_settle: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_failure_probability(mut self, probability: f64) -> Self {
        self.failure_probability = probability;
        self
    }

    pub fn with_card_probability(mut self, probability: f64) -> Self {
        self.card_probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
