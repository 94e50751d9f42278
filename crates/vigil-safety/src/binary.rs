/// Empty content is not binary. Otherwise sniff the first 512 bytes: any
/// null byte makes it binary; else if the fraction of bytes in
/// `[0..9) ∪ (13..32) ∪ {127}` exceeds 0.2, it's binary (spec.md §4.1,
/// §8 invariant 7).
pub fn is_binary(content: &[u8]) -> bool {
    if content.is_empty() {
        return false;
    }

    let sample = &content[..content.len().min(512)];

    if sample.contains(&0) {
        return true;
    }

    let control_count = sample
        .iter()
        .filter(|&&b| (b < 9) || (b > 13 && b < 32) || b == 127)
        .count();

    (control_count as f64) / (sample.len() as f64) > 0.2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_not_binary() {
        assert!(!is_binary(&[]));
    }

    #[test]
    fn null_byte_in_first_512_is_binary() {
        let mut content = vec![b'a'; 100];
        content[50] = 0;
        assert!(is_binary(&content));
    }

    #[test]
    fn plain_text_is_not_binary() {
        assert!(!is_binary(b"the quick brown fox jumps over the lazy dog\n"));
    }

    #[test]
    fn high_control_ratio_is_binary() {
        let content: Vec<u8> = (0..100).map(|i| if i % 2 == 0 { 1u8 } else { b'x' }).collect();
        assert!(is_binary(&content));
    }

    #[test]
    fn null_byte_beyond_first_512_bytes_is_not_caught_by_null_check() {
        // The null-byte rule only inspects the first 512 bytes; a null
        // further in the file must fall back to the control-byte ratio,
        // which plain ASCII text keeps well under 0.2.
        let mut content = vec![b'a'; 1000];
        content[600] = 0;
        assert!(!is_binary(&content));
    }
}
