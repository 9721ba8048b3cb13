//! Policies that divide a device's base service time between ISR execution
//! and data transfer.
//!
//! Every policy goes through [`ServiceSplit::clamped`], so `isr + transfer`
//! equals the base service time exactly and neither share is ever negative.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::timing::UnknownNameError;

/// Base service time divided into ISR and transfer shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ServiceSplit {
    isr: u64,
    transfer: u64,
}

impl ServiceSplit {
    /// Gives `isr` ticks to the ISR (at most `base`) and the rest to transfer.
    #[must_use]
    pub const fn clamped(base: u64, isr: u64) -> Self {
        let isr = if isr > base { base } else { isr };
        Self {
            isr,
            transfer: base - isr,
        }
    }

    /// Ticks spent running the ISR.
    #[must_use]
    pub const fn isr(self) -> u64 {
        self.isr
    }

    /// Ticks spent transferring data.
    #[must_use]
    pub const fn transfer(self) -> u64 {
        self.transfer
    }

    /// The base service time this split was made from.
    #[must_use]
    pub const fn total(self) -> u64 {
        self.isr + self.transfer
    }
}

/// Source of ISR/transfer splits for SYSCALL dispatch.
pub trait ServiceSplitter {
    /// Splits `base` ticks of device service time.
    fn split(&mut self, base: u64) -> ServiceSplit;
}

impl<T: ServiceSplitter + ?Sized> ServiceSplitter for Box<T> {
    fn split(&mut self, base: u64) -> ServiceSplit {
        (**self).split(base)
    }
}

impl<T: ServiceSplitter + ?Sized> ServiceSplitter for &mut T {
    fn split(&mut self, base: u64) -> ServiceSplit {
        (**self).split(base)
    }
}

/// Draws the ISR share uniformly from `base/2 ..= base/2 + base/4 + 1`.
#[derive(Debug, Clone)]
pub struct RandomizedSplitter<R> {
    rng: R,
}

impl<R: Rng> RandomizedSplitter<R> {
    /// Wraps an injected generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomizedSplitter<ChaCha8Rng> {
    /// Deterministic splitter: the same seed always yields the same splits.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> ServiceSplitter for RandomizedSplitter<R> {
    fn split(&mut self, base: u64) -> ServiceSplit {
        let floor = base / 2;
        let jitter = self.rng.gen_range(0..=base / 4 + 1);
        ServiceSplit::clamped(base, floor.saturating_add(jitter))
    }
}

/// Gives the ISR the larger half of the base time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HalvedSplitter;

impl ServiceSplitter for HalvedSplitter {
    fn split(&mut self, base: u64) -> ServiceSplit {
        ServiceSplit::clamped(base, base - base / 2)
    }
}

/// Selectable split policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "kebab-case")
)]
pub enum SplitStrategy {
    /// [`RandomizedSplitter`] seeded from the run seed.
    #[default]
    Randomized,
    /// [`HalvedSplitter`]; ignores the seed.
    Halved,
}

impl SplitStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 2] = [Self::Randomized, Self::Halved];

    /// Stable name used on the command line and in config files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Randomized => "randomized",
            Self::Halved => "halved",
        }
    }

    /// Instantiates the policy.
    #[must_use]
    pub fn splitter(self, seed: u64) -> Box<dyn ServiceSplitter> {
        match self {
            Self::Randomized => Box::new(RandomizedSplitter::seeded(seed)),
            Self::Halved => Box::new(HalvedSplitter),
        }
    }
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SplitStrategy {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| UnknownNameError {
                what: "split strategy",
                name: s.to_string(),
                expected: Self::ALL.map(Self::name).join(", "),
            })
    }
}
