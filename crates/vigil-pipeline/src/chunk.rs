//! Contiguous partitioning of a file list into `n` roughly-even chunks
//! (spec.md §4.5 "Plan": "partition into chunks and scan chunks
//! concurrently").

/// Splits `items` into at most `n` contiguous, roughly-even groups.
/// `n == 0` or an empty input yields no groups.
pub fn partition<T>(items: Vec<T>, n: usize) -> Vec<Vec<T>> {
    if items.is_empty() || n == 0 {
        return Vec::new();
    }
    let n = n.min(items.len());
    let base = items.len() / n;
    let remainder = items.len() % n;

    let mut out = Vec::with_capacity(n);
    let mut iter = items.into_iter();
    for i in 0..n {
        let size = base + usize::from(i < remainder);
        out.push(iter.by_ref().take(size).collect());
    }
    out
}
