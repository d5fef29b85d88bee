use crate::alloc::matcher::normalize;
use crate::inventory::ContactRecord;

/// Unissued records of `category`, oldest position first, at most `limit`.
///
/// Category comparison is trimmed and case-insensitive. The input order is
/// not trusted; results are sorted by position.
pub fn select_available(
    records: &[ContactRecord],
    category: &str,
    limit: usize,
) -> Vec<ContactRecord> {
    let wanted = normalize(category);
    let mut picked: Vec<&ContactRecord> = records
        .iter()
        .filter(|r| !r.issued && normalize(&r.category) == wanted)
        .collect();
    picked.sort_by_key(|r| r.position);
    picked.into_iter().take(limit).cloned().collect()
}
