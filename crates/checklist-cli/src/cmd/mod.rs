pub mod enh;
pub mod init;
pub mod run;
pub mod snapshot;
pub mod sop;
pub mod step;

use anyhow::Context;

/// CLI step/run/enhancement positions are 1-based; the engine is 0-based.
pub fn to_index(position: usize, what: &str) -> anyhow::Result<usize> {
    position
        .checked_sub(1)
        .with_context(|| format!("{what} positions start at 1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_index_is_one_based() {
        assert_eq!(to_index(1, "step").unwrap(), 0);
        assert_eq!(to_index(3, "step").unwrap(), 2);
        assert!(to_index(0, "step").is_err());
    }
}
