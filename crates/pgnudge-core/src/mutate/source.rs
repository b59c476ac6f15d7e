use rand::Rng;

/// Source of uniformly distributed integers.
///
/// The mutator only ever asks for a value in an inclusive range, so any
/// seeded generator can drive it and replays stay deterministic.
pub trait UniformSource {
    /// A uniform value in `lo..=hi`. Callers guarantee `lo <= hi`.
    fn uniform(&mut self, lo: usize, hi: usize) -> usize;

    /// A uniform index into a non-empty collection of length `len`.
    fn index(&mut self, len: usize) -> usize {
        self.uniform(0, len.saturating_sub(1))
    }
}

impl<R: Rng + ?Sized> UniformSource for R {
    fn uniform(&mut self, lo: usize, hi: usize) -> usize {
        self.gen_range(lo..=hi)
    }
}

/// Replays a fixed script of draws, clamped into the requested range.
///
/// Once the script runs out it keeps returning `lo`. Useful for pinning
/// the mutator to a specific node and action in tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: Vec<usize>,
    next: usize,
}

impl ScriptedSource {
    #[must_use]
    pub const fn new(draws: Vec<usize>) -> Self {
        Self { draws, next: 0 }
    }

    /// Number of draws handed out so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.next
    }
}

impl UniformSource for ScriptedSource {
    fn uniform(&mut self, lo: usize, hi: usize) -> usize {
        let value = self.draws.get(self.next).copied().unwrap_or(lo);
        self.next += 1;
        value.clamp(lo, hi)
    }
}
