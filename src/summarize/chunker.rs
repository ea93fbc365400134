// Fixed-size text chunking for the summarization model.

/// Split `text` into chunks of at most `chunk_chars` characters, in order.
/// Splits happen at char boundaries only, so concatenating the returned
/// chunks reproduces the input exactly. `chunk_chars` must be non-zero.
pub fn split_into_chunks(text: &str, chunk_chars: usize) -> Vec<String> {
    debug_assert!(chunk_chars > 0);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == chunk_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
