//! Grouping of block lists into packs for batched kernel dispatch.

/// Split `items` into consecutive chunks of `size` elements.
///
/// The last chunk holds the remainder and may be shorter. A `size` of zero
/// is treated as "everything in one chunk". An empty input yields no chunks.
pub fn to_size_n<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }
    let size = if size == 0 { items.len() } else { size };
    items.chunks(size).map(|c| c.to_vec()).collect()
}
