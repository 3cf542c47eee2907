use crate::image_pipeline::detect::types::MarkerRegion;

/// Drops regions that trace the same outline as a larger kept region.
///
/// Regions are visited largest first. A region is dropped when a kept region
/// contains it and every side is inset by at most
/// `max(max_inset_ratio * outer_extent, min_inset_px)`, where the extent is the
/// outer width for left/right and the outer height for top/bottom. Kept
/// regions come back in their original detection order.
pub fn dedup_nested_regions(
    regions: &[MarkerRegion],
    max_inset_ratio: f64,
    min_inset_px: u32,
) -> Vec<MarkerRegion> {
    let mut order: Vec<usize> = (0..regions.len()).collect();
    order.sort_by(|&a, &b| regions[b].area().cmp(&regions[a].area()).then(a.cmp(&b)));

    let mut keep = vec![false; regions.len()];
    let mut kept: Vec<usize> = Vec::new();
    for i in order {
        let inner = &regions[i];
        let duplicate = kept
            .iter()
            .any(|&k| same_outline(&regions[k], inner, max_inset_ratio, min_inset_px));
        if !duplicate {
            keep[i] = true;
            kept.push(i);
        }
    }

    regions
        .iter()
        .zip(keep)
        .filter_map(|(r, k)| k.then_some(*r))
        .collect()
}

/// Whether `inner` sits inside `outer` with only a thin band between them.
fn same_outline(
    outer: &MarkerRegion,
    inner: &MarkerRegion,
    max_inset_ratio: f64,
    min_inset_px: u32,
) -> bool {
    if !outer.contains(inner) {
        return false;
    }
    let horizontal = (max_inset_ratio * outer.width as f64).max(min_inset_px as f64);
    let vertical = (max_inset_ratio * outer.height as f64).max(min_inset_px as f64);

    let left = (inner.x as i64 - outer.x as i64) as f64;
    let right = (outer.right() - inner.right()) as f64;
    let top = (inner.y as i64 - outer.y as i64) as f64;
    let bottom = (outer.bottom() - inner.bottom()) as f64;

    left <= horizontal && right <= horizontal && top <= vertical && bottom <= vertical
}
