//! Key-wise merge of partial field maps across sources

use crate::fields::FieldMap;

/// Merges overlays onto `base` in call order.
///
/// For each field the last overlay containing the key wins, even when its
/// value is `None`: a source that attempted a field and found nothing blanks
/// an earlier source's value. This is the shallow key-wise precedence the
/// snapshot files have always had; a merge preferring the most recent
/// non-`None` value would behave differently and is deliberately not what
/// this does.
pub fn merge(base: FieldMap, overlays: impl IntoIterator<Item = FieldMap>) -> FieldMap {
    let mut merged = base;
    for overlay in overlays {
        merged.apply(overlay);
    }
    merged
}
