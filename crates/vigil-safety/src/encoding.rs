/// Detected text encoding, per spec.md §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16Be,
    Utf16Le,
    Binary,
    Latin1,
}

/// BOM on UTF-8/UTF-16; any null byte in the first 8 KiB -> binary;
/// otherwise count high bytes and valid 2/3/4-byte UTF-8 sequences — if
/// invalid sequences dominate valid ones and high bytes are present,
/// classify as `Latin1`; else `Utf8`.
pub fn detect_encoding(content: &[u8]) -> Encoding {
    if content.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Encoding::Utf8;
    }
    if content.starts_with(&[0xFE, 0xFF]) {
        return Encoding::Utf16Be;
    }
    if content.starts_with(&[0xFF, 0xFE]) {
        return Encoding::Utf16Le;
    }

    let sample = &content[..content.len().min(8192)];
    if sample.contains(&0) {
        return Encoding::Binary;
    }

    let mut high_bytes = 0usize;
    let mut valid_sequences = 0usize;
    let mut invalid_sequences = 0usize;

    let mut i = 0;
    while i < sample.len() {
        let b = sample[i];
        if b < 0x80 {
            i += 1;
            continue;
        }
        high_bytes += 1;

        let seq_len = if b & 0xE0 == 0xC0 {
            2
        } else if b & 0xF0 == 0xE0 {
            3
        } else if b & 0xF8 == 0xF0 {
            4
        } else {
            0
        };

        if seq_len == 0 || i + seq_len > sample.len() {
            invalid_sequences += 1;
            i += 1;
            continue;
        }

        let continuation_ok = sample[i + 1..i + seq_len]
            .iter()
            .all(|&c| c & 0xC0 == 0x80);

        if continuation_ok {
            valid_sequences += 1;
            i += seq_len;
        } else {
            invalid_sequences += 1;
            i += 1;
        }
    }

    if high_bytes > 0 && invalid_sequences > valid_sequences {
        Encoding::Latin1
    } else {
        Encoding::Utf8
    }
}
