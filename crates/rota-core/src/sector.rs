//! Mapping between a layer's rotation and the sector under the pointer.
//!
//! Angles are in degrees, clockwise on screen, measured from the pointer at
//! the top of the wheel. With rotation `r`, sector `i` covers
//! `[i * span + r, (i + 1) * span + r)`. The pointer therefore sits inside the
//! sector whose slot contains `-r`. On an exact boundary the sector whose
//! leading edge touches the pointer wins.

pub const MIN_SECTORS: usize = 2;
pub const MAX_SECTORS: usize = 24;

pub fn normalize_deg(deg: f64) -> f64 {
    let n = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if n >= 360.0 { 0.0 } else { n }
}

pub fn sector_span(count: usize) -> f64 {
    360.0 / count as f64
}

/// Index of the sector under the pointer for a given rotation.
pub fn resolve_sector(rotation_deg: f64, count: usize) -> usize {
    debug_assert!(count > 0);
    let pointer = normalize_deg(-rotation_deg);
    let idx = (pointer / sector_span(count)).floor() as usize;
    idx.min(count - 1)
}

/// Rotation (in `[0, 360)`) that centres sector `index` under the pointer.
pub fn centered_rotation(index: usize, count: usize) -> f64 {
    let span = sector_span(count);
    normalize_deg(-(index as f64 * span + span / 2.0))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    pub index: usize,
    /// Snapped rotation keeping the full turns of the input.
    pub rotation_deg: f64,
}

impl Snap {
    pub fn normalized(&self) -> f64 {
        normalize_deg(self.rotation_deg)
    }
}

/// Nudges `rotation_deg` to the midpoint of the sector currently under the
/// pointer. The correction never exceeds half a sector, so the number of
/// completed turns is kept.
pub fn snap_rotation(rotation_deg: f64, count: usize) -> Snap {
    let index = resolve_sector(rotation_deg, count);
    let current = normalize_deg(rotation_deg);
    let target = centered_rotation(index, count);

    let mut delta = target - current;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }

    Snap {
        index,
        rotation_deg: rotation_deg + delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_four_sectors_at_rest() {
        assert_eq!(resolve_sector(0.0, 4), 0);
    }

    #[test]
    fn test_quarter_turn_moves_pointer_back_one_sector() {
        assert_eq!(resolve_sector(90.0, 4), 3);
        assert_eq!(resolve_sector(180.0, 4), 2);
        assert_eq!(resolve_sector(270.0, 4), 1);
        assert_eq!(resolve_sector(360.0, 4), 0);
    }

    #[test]
    fn test_interior_and_negative_rotations() {
        assert_eq!(resolve_sector(45.0, 4), 3);
        assert_eq!(resolve_sector(-45.0, 4), 0);
        assert_eq!(resolve_sector(-135.0, 4), 1);
        assert_eq!(resolve_sector(1080.0 + 10.0, 6), 5);
    }

    #[test]
    fn test_normalize_handles_negative_epsilon() {
        let n = normalize_deg(-1e-14);
        assert!((0.0..360.0).contains(&n));
        assert_eq!(normalize_deg(720.0), 0.0);
        assert_eq!(normalize_deg(-90.0), 270.0);
    }

    #[test]
    fn test_centered_rotation_resolves_to_itself() {
        for count in MIN_SECTORS..=MAX_SECTORS {
            for index in 0..count {
                let rot = centered_rotation(index, count);
                assert_eq!(resolve_sector(rot, count), index);
            }
        }
    }

    #[test]
    fn test_snap_small_correction() {
        // 4 sectors, rotation 100: sector 2 spans [280, 370) and holds the
        // pointer; it is centred at rotation 135
        let snap = snap_rotation(100.0, 4);
        assert_eq!(snap.index, 2);
        assert!(approx_eq(snap.rotation_deg, 135.0));
    }

    #[test]
    fn test_snap_keeps_turns() {
        let snap = snap_rotation(3.0 * 360.0 + 100.0, 4);
        assert_eq!(snap.index, 2);
        assert!(approx_eq(snap.rotation_deg, 3.0 * 360.0 + 135.0));
        assert!(approx_eq(snap.normalized(), 135.0));
    }

    #[test]
    fn test_snap_across_zero() {
        // 4 sectors, rotation 350 -> pointer at 10 deg inside sector 0,
        // sector 0 centred at rotation 315
        let snap = snap_rotation(350.0, 4);
        assert_eq!(snap.index, 0);
        assert!(approx_eq(snap.rotation_deg, 315.0));

        // 3 sectors, rotation 10 -> pointer at 350, sector 2 centred at 60
        let snap = snap_rotation(10.0, 3);
        assert_eq!(snap.index, 2);
        assert!(approx_eq(snap.rotation_deg, 60.0));
    }

    proptest! {
        #[test]
        fn resolved_index_in_range(rot in -1.0e5f64..1.0e5, count in 2usize..=24) {
            prop_assert!(resolve_sector(rot, count) < count);
        }

        #[test]
        fn resolution_steps_one_sector_at_a_time(rot in -1.0e4f64..1.0e4, count in 2usize..=24) {
            // a step much smaller than any sector never skips a sector
            let a = resolve_sector(rot, count);
            let b = resolve_sector(rot + 0.01, count);
            prop_assert!(a == b || b == (a + count - 1) % count);
        }

        #[test]
        fn snap_is_idempotent(rot in -1.0e4f64..1.0e4, count in 2usize..=24) {
            let once = snap_rotation(rot, count);
            let twice = snap_rotation(once.rotation_deg, count);
            prop_assert_eq!(once.index, twice.index);
            prop_assert!((once.rotation_deg - twice.rotation_deg).abs() < 1e-6);
        }

        #[test]
        fn snap_lands_on_midpoint_within_half_sector(rot in -1.0e4f64..1.0e4, count in 2usize..=24) {
            let snap = snap_rotation(rot, count);
            prop_assert!((snap.rotation_deg - rot).abs() <= sector_span(count) / 2.0 + 1e-6);
            let expected = centered_rotation(snap.index, count);
            let diff = (snap.normalized() - expected).abs();
            prop_assert!(diff < 1e-6 || (diff - 360.0).abs() < 1e-6);
            prop_assert_eq!(resolve_sector(snap.rotation_deg, count), snap.index);
        }
    }
}
