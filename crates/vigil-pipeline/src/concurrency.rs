//! Concurrency-sizing formulas (spec.md §4.5 "Plan", §5 "Concurrency &
//! resource model").

/// Below this many files in a target, each file is scanned as its own
/// bounded-concurrency task rather than being grouped into chunks.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10;

fn cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// `min(cpus, files, 8)` chunks for the large-target branch.
pub fn chunk_count(file_count: usize) -> usize {
    cpu_count().min(file_count.max(1)).min(8).max(1)
}

/// `min(32, max(4, cpus/2))` concurrent file-scan tasks for the
/// small-target branch.
pub fn bounded_concurrency_limit() -> usize {
    (cpu_count() / 2).max(4).min(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_count_never_exceeds_eight() {
        assert!(chunk_count(10_000) <= 8);
    }

    #[test]
    fn chunk_count_never_exceeds_file_count() {
        assert!(chunk_count(3) <= 3);
    }

    #[test]
    fn chunk_count_is_at_least_one() {
        assert!(chunk_count(0) >= 1);
    }

    #[test]
    fn bounded_concurrency_limit_stays_within_documented_bounds() {
        let limit = bounded_concurrency_limit();
        assert!((4..=32).contains(&limit));
    }
}
