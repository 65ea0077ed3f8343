use anyhow::Context;
use rand::{rngs::OsRng, RngCore};

/// Source of token entropy.
pub trait RandomSource: Send + Sync {
    /// Fills `buf` and returns how many bytes were actually written.
    fn fill(&self, buf: &mut [u8]) -> anyhow::Result<usize>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> anyhow::Result<usize> {
        OsRng
            .try_fill_bytes(buf)
            .context("read from os random source")?;
        Ok(buf.len())
    }
}
