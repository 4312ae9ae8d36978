use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Used for positions, connection fractions, layout scale, and timeline
/// seconds. Deterministic; no floating point in the simulation path.
pub type Fixed64 = I32F32;

/// Step delays and animation durations, in milliseconds.
pub type Millis = u32;

/// Convert an f64 to Fixed64. Use only for initialization, never in the
/// simulation loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display/FFI.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Convert a step delay in milliseconds to timeline seconds.
#[inline]
pub fn ms_to_seconds(ms: Millis) -> Fixed64 {
    Fixed64::from_num(ms) / Fixed64::from_num(1000)
}

/// Round a fractional flow to a whole number of blocks.
///
/// Round-to-nearest, ties away from zero; negative amounts clamp to zero.
/// For a 0.7/0.3 fan-out this yields the pairs {10 -> 7,3}, {9 -> 6,3},
/// {8 -> 6,2}.
#[inline]
pub fn block_count(amount: Fixed64) -> u32 {
    let rounded: i64 = amount.round().to_num();
    rounded.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_basic_arithmetic() {
        let a = f64_to_fixed64(1.5);
        let b = f64_to_fixed64(2.0);
        assert_eq!(fixed64_to_f64(a + b), 3.5);
    }

    #[test]
    fn fixed64_determinism() {
        let a = f64_to_fixed64(1.0 / 3.0);
        let b = f64_to_fixed64(1.0 / 3.0);
        assert_eq!(a, b);
    }

    #[test]
    fn ms_to_seconds_converts() {
        assert_eq!(ms_to_seconds(1000), Fixed64::from_num(1));
        assert_eq!(ms_to_seconds(250), f64_to_fixed64(0.25));
        assert_eq!(ms_to_seconds(0), Fixed64::ZERO);
    }

    #[test]
    fn block_count_rounds_to_nearest() {
        assert_eq!(block_count(f64_to_fixed64(6.3)), 6);
        assert_eq!(block_count(f64_to_fixed64(2.7)), 3);
        assert_eq!(block_count(f64_to_fixed64(5.6)), 6);
        assert_eq!(block_count(f64_to_fixed64(2.4)), 2);
        assert_eq!(block_count(f64_to_fixed64(7.0)), 7);
    }

    #[test]
    fn block_count_fixture_pairs() {
        for (initial, expected_a, expected_b) in [(10u32, 7, 3), (9, 6, 3), (8, 6, 2)] {
            let amount = Fixed64::from_num(initial);
            let a = block_count(amount * f64_to_fixed64(0.7));
            let b = block_count(amount * f64_to_fixed64(0.3));
            assert_eq!((a, b), (expected_a, expected_b), "initial {initial}");
        }
    }

    #[test]
    fn block_count_clamps_negative_to_zero() {
        assert_eq!(block_count(f64_to_fixed64(-3.2)), 0);
    }
}
