/// Splits `0..total` into `workers` contiguous, non-overlapping ranges, as evenly as
/// possible: the leading `total % workers` ranges get one extra element.
///
/// If `workers > total`, the trailing ranges are empty (`beg == end`) rather than
/// omitted, so callers can always zip the result 1:1 against a fixed worker count.
pub(crate) fn column_ranges(total: usize, workers: usize) -> Vec<(usize, usize)> {
    assert!(workers > 0, "worker count must be greater than zero");
    let base = total / workers;
    let extra = total % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for w in 0..workers {
        let len = base + if w < extra { 1 } else { 0 };
        ranges.push((start, start + len));
        start += len;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_evenly_when_divisible() {
        assert_eq!(column_ranges(8, 4), vec![(0, 2), (2, 4), (4, 6), (6, 8)]);
    }

    #[test]
    fn leading_workers_get_the_remainder() {
        assert_eq!(column_ranges(10, 3), vec![(0, 4), (4, 7), (7, 10)]);
    }

    #[test]
    fn more_workers_than_elements_yields_empty_ranges() {
        assert_eq!(column_ranges(2, 5), vec![(0, 1), (1, 2), (2, 2), (2, 2), (2, 2)]);
    }

    #[test]
    fn ranges_cover_the_whole_span_contiguously() {
        let ranges = column_ranges(17, 5);
        assert_eq!(ranges.first().unwrap().0, 0);
        assert_eq!(ranges.last().unwrap().1, 17);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }
}
