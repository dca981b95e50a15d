//! Packed operand numbering.
//!
//! Several instruction families squeeze two distinct registers into one small
//! number: the first register is `n / stride`, and the remainder indexes the
//! remaining registers with the first one skipped over. Getting any of these
//! off by one silently moves instructions to the wrong ROM slots.

use super::super::types::hw::Reg;

/// Register pairs reachable by the add-from-memory forms: operand r0..r4, base any of r0..sp but the operand.
pub const ADDM_STRIDE: u32 = 6;
pub const ADDM_PAIRS: u32 = 30;

/// Register pairs reachable by `mrs`: two distinct registers out of r0..r5.
pub const MRS_STRIDE: u32 = 5;
pub const MRS_PAIRS: u32 = 30;

/// The `k`th register, not counting `r`.
pub fn skip(r: Reg, k: u32) -> Reg {
    Reg::decode(k + (k >= r.bits()) as u32)
}

fn unpack(n: u32, stride: u32) -> (Reg, Reg) {
    let r = Reg::decode(n / stride);
    (r, skip(r, n % stride))
}

/// (operand, base) of `addm<n>`.
pub fn addm(n: u32) -> (Reg, Reg) {
    assert!(n < ADDM_PAIRS);
    unpack(n, ADDM_STRIDE)
}

/// (destination, selector source) of `mrs<n>`.
pub fn mrs(n: u32) -> (Reg, Reg) {
    assert!(n < MRS_PAIRS);
    unpack(n, MRS_STRIDE)
}

/// The register a `pop` lands in, spread over the low bits of its three fields.
pub fn pop_target(a: Reg, b: Reg, q: bool) -> Reg {
    Reg::decode(a.low_bit() * 4 + b.low_bit() * 2 + q as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::iproduct;
    use strum::IntoEnumIterator;

    fn distinct_pairs(firsts: usize, seconds: usize) -> Vec<(Reg, Reg)> {
        let regs: Vec<Reg> = Reg::iter().collect();
        iproduct!(regs[..firsts].iter().copied(), regs[..seconds].iter().copied())
            .filter(|(r, s)| r != s)
            .collect()
    }

    #[test]
    fn addm_enumerates_every_pair_in_order() {
        let expected = distinct_pairs(5, 7);
        assert_eq!(expected.len(), ADDM_PAIRS as usize);
        for (n, pair) in expected.into_iter().enumerate() {
            assert_eq!(addm(n as u32), pair, "addm{}", n);
        }
    }

    #[test]
    fn addm_landmarks() {
        assert_eq!(addm(0), (Reg::R0, Reg::R1));
        assert_eq!(addm(5), (Reg::R0, Reg::SP));
        assert_eq!(addm(6), (Reg::R1, Reg::R0));
        assert_eq!(addm(13), (Reg::R2, Reg::R1));
        assert_eq!(addm(29), (Reg::R4, Reg::SP));
    }

    #[test]
    fn mrs_enumerates_every_pair_in_order() {
        let expected = distinct_pairs(6, 6);
        assert_eq!(expected.len(), MRS_PAIRS as usize);
        for (n, pair) in expected.into_iter().enumerate() {
            assert_eq!(mrs(n as u32), pair, "mrs{}", n);
        }
    }

    #[test]
    fn mrs_landmarks() {
        assert_eq!(mrs(0), (Reg::R0, Reg::R1));
        assert_eq!(mrs(4), (Reg::R0, Reg::R5));
        assert_eq!(mrs(5), (Reg::R1, Reg::R0));
        assert_eq!(mrs(29), (Reg::R5, Reg::R4));
    }

    #[test]
    fn skip_never_returns_the_skipped_register() {
        for r in Reg::iter().take(6) {
            let picked: Vec<_> = (0..6).map(|k| skip(r, k)).collect();
            assert!(!picked.contains(&r));
            assert!(picked.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    #[should_panic]
    fn addm_out_of_range() {
        addm(ADDM_PAIRS);
    }

    #[test]
    fn pop_targets() {
        assert_eq!(pop_target(Reg::SP, Reg::SP, false), Reg::R0);
        assert_eq!(pop_target(Reg::SP, Reg::PC, true), Reg::R3);
        assert_eq!(pop_target(Reg::PC, Reg::SP, true), Reg::R5);
        assert_eq!(pop_target(Reg::PC, Reg::PC, false), Reg::SP);
    }
}
