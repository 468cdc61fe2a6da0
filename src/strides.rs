// In: src/strides.rs

//! Stride signature normalization.
//!
//! The exported mask must match the input DWI's spatial storage layout in
//! sign and relative axis ordering, without inheriting whatever absolute
//! magnitudes the input happened to use (a volume-contiguous DWI, for
//! instance, starts its spatial strides at 2). The transform below rebases
//! the magnitudes onto consecutive small positive integers: subtract the
//! minimum magnitude across the three spatial axes, add 1, restore the sign.

/// Normalizes the spatial stride signature of the staged DWI.
///
/// Idempotent: an already-normalized signature maps to itself.
pub fn normalize_strides(strides: [i64; 3]) -> [i64; 3] {
    let min_magnitude = strides[0].abs().min(strides[1].abs()).min(strides[2].abs());
    strides.map(|s| (s.abs() - min_magnitude + 1) * if s < 0 { -1 } else { 1 })
}

/// Renders a stride signature as the comma-separated list the export
/// conversion expects.
pub fn format_strides(strides: &[i64]) -> String {
    strides
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_contiguous_strides_are_rebased() {
        // A volume-contiguous DWI: spatial strides start at 2.
        assert_eq!(normalize_strides([2, 3, 4]), [1, 2, 3]);
    }

    #[test]
    fn test_signs_are_preserved() {
        assert_eq!(normalize_strides([-2, 3, -4]), [-1, 2, -3]);
    }

    #[test]
    fn test_relative_ordering_is_preserved() {
        let normalized = normalize_strides([4, 2, 3]);
        assert_eq!(normalized, [3, 1, 2]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for signature in [[1, 2, 3], [-1, 2, -3], [3, 1, 2], [-3, -2, -1]] {
            assert_eq!(normalize_strides(normalize_strides(signature)), normalize_strides(signature));
        }
    }

    #[test]
    fn test_format_joins_with_commas() {
        assert_eq!(format_strides(&[-1, 2, 3]), "-1,2,3");
    }
}
