// Test intent: verifies the directional splitter yields disjoint, covering
// regions that never cut the transform axis.
use analytic_nd::{DirectionalRegionSplitter, ImageRegion, RegionSplitter};
use proptest::prelude::*;

fn check_partition<const D: usize>(
    total: &ImageRegion<D>,
    pieces: &[ImageRegion<D>],
    axis: usize,
    requested: usize,
) -> Result<(), TestCaseError> {
    prop_assert!(!pieces.is_empty());
    prop_assert!(pieces.len() <= requested.max(1));
    for p in pieces {
        prop_assert!(p.is_inside(total));
        prop_assert_eq!(p.index()[axis], total.index()[axis]);
        prop_assert_eq!(p.size()[axis], total.size()[axis]);
    }
    for (i, a) in pieces.iter().enumerate() {
        for b in &pieces[i + 1..] {
            prop_assert!(a.indices().all(|idx| !b.contains_index(&idx)));
        }
    }
    let covered: usize = pieces.iter().map(|p| p.number_of_pixels()).sum();
    prop_assert_eq!(covered, total.number_of_pixels());
    Ok(())
}

#[test]
fn volume_split_into_four() {
    let splitter = DirectionalRegionSplitter::new(0);
    let total = ImageRegion::from_size([16, 8, 6]);
    let pieces = splitter.split(&total, 4);
    assert_eq!(pieces.len(), 4);
    assert!(pieces.iter().all(|p| p.size()[0] == 16));
}

#[test]
fn zero_requested_behaves_like_one() {
    let splitter = DirectionalRegionSplitter::new(1);
    let total = ImageRegion::from_size([5, 5]);
    assert_eq!(splitter.split(&total, 0), vec![total]);
}

#[test]
fn lines_only_along_axis_cannot_split() {
    // Every non-axis extent is 1: one line, one region.
    let splitter = DirectionalRegionSplitter::new(2);
    let total = ImageRegion::new([3, 4, 0], [1, 1, 256]);
    assert_eq!(splitter.split(&total, 8), vec![total]);
}

proptest! {
    #[test]
    fn prop_two_dimensional_partition(
        size in proptest::array::uniform2(0usize..20),
        axis in 0usize..2,
        requested in 1usize..12,
    ) {
        let total = ImageRegion::from_size(size);
        let pieces = DirectionalRegionSplitter::new(axis).split(&total, requested);
        check_partition(&total, &pieces, axis, requested)?;
    }

    #[test]
    fn prop_four_dimensional_partition(
        size in proptest::array::uniform4(1usize..5),
        offset in proptest::array::uniform4(0usize..4),
        axis in 0usize..4,
        requested in 1usize..9,
    ) {
        let total = ImageRegion::new(offset, size);
        let splitter = DirectionalRegionSplitter::new(axis);
        let pieces = splitter.split(&total, requested);
        prop_assert_eq!(pieces.len(), splitter.number_of_splits(&total, requested));
        check_partition(&total, &pieces, axis, requested)?;
    }
}
