//! The eight linear approximations the search engine uses to filter
//! K0..K3 candidates. Each is pure: given a pair and the key material it
//! needs, it returns a single parity bit.
//!
//! Bit position `s` follows the MSB=0 convention used throughout this
//! crate: `s=0` is the most significant bit, `s=31` the least significant.

use crate::cipher::f_function;
use crate::corpus::Pair;

/// Bit at position `s` (MSB=0) of `v`.
fn bit_at(v: u32, s: u32) -> u32 {
    (v >> (31 - s)) & 1
}

/// XOR-parity of three bit positions of `v`.
fn parity3(v: u32, a: u32, b: u32, c: u32) -> u32 {
    bit_at(v, a) ^ bit_at(v, b) ^ bit_at(v, c)
}

/// XOR-parity of four bit positions of `v`.
fn parity4(v: u32, a: u32, b: u32, c: u32, d: u32) -> u32 {
    bit_at(v, a) ^ bit_at(v, b) ^ bit_at(v, c) ^ bit_at(v, d)
}

/// `Y0 = F(L0 ^ R0 ^ k0)`
fn y0(pair: &Pair, k0: u32) -> u32 {
    f_function(pair.p_left ^ pair.p_right ^ k0)
}

/// `Y1 = F(L0 ^ Y0 ^ k1)`
fn y1(pair: &Pair, k0: u32, k1: u32) -> u32 {
    f_function(pair.p_left ^ y0(pair, k0) ^ k1)
}

/// `Y2 = F(L0 ^ R0 ^ Y1 ^ k2)`
fn y2(pair: &Pair, k0: u32, k1: u32, k2: u32) -> u32 {
    f_function(pair.p_left ^ pair.p_right ^ y1(pair, k0, k1) ^ k2)
}

/// A level-specific predicate: given a pair, the confirmed prefix of
/// subkeys below this level, and a candidate for this level, returns the
/// predicted parity bit.
pub type Predicate = fn(&Pair, &[u32], u32) -> u32;

/// Pairing of a level's inner and outer predicates.
pub struct LevelPredicates {
    pub inner: Predicate,
    pub outer: Predicate,
}

pub fn k0_inner(pair: &Pair, _prefix: &[u32], kappa: u32) -> u32 {
    let a = pair.p_left ^ pair.p_right ^ pair.c_left;
    let b = pair.p_left ^ pair.c_left ^ pair.c_right;
    let fv = f_function(pair.p_left ^ pair.p_right ^ kappa);
    parity3(a, 5, 13, 21) ^ bit_at(b, 15) ^ bit_at(fv, 15)
}

pub fn k0_outer(pair: &Pair, _prefix: &[u32], kappa: u32) -> u32 {
    let a = pair.p_left ^ pair.p_right ^ pair.c_left;
    let b = pair.p_left ^ pair.c_left ^ pair.c_right;
    let fv = f_function(pair.p_left ^ pair.p_right ^ kappa);
    bit_at(a, 13) ^ parity4(b, 7, 15, 23, 31) ^ parity4(fv, 7, 15, 23, 31)
}

pub fn k1_inner(pair: &Pair, prefix: &[u32], kappa: u32) -> u32 {
    let k0 = prefix[0];
    let b = pair.p_left ^ pair.c_left ^ pair.c_right;
    let fv = f_function(pair.p_left ^ y0(pair, k0) ^ kappa);
    parity3(b, 5, 13, 21) ^ bit_at(fv, 15)
}

pub fn k1_outer(pair: &Pair, prefix: &[u32], kappa: u32) -> u32 {
    let k0 = prefix[0];
    let b = pair.p_left ^ pair.c_left ^ pair.c_right;
    let fv = f_function(pair.p_left ^ y0(pair, k0) ^ kappa);
    bit_at(b, 13) ^ parity4(fv, 7, 15, 23, 31)
}

pub fn k2_inner(pair: &Pair, prefix: &[u32], kappa: u32) -> u32 {
    let (k0, k1) = (prefix[0], prefix[1]);
    let a = pair.p_left ^ pair.p_right ^ pair.c_left;
    let y1v = y1(pair, k0, k1);
    let fv = f_function(pair.p_left ^ pair.p_right ^ y1v ^ kappa);
    parity3(a, 5, 13, 21) ^ bit_at(fv, 15)
}

pub fn k2_outer(pair: &Pair, prefix: &[u32], kappa: u32) -> u32 {
    let (k0, k1) = (prefix[0], prefix[1]);
    let a = pair.p_left ^ pair.p_right ^ pair.c_left;
    let y1v = y1(pair, k0, k1);
    let fv = f_function(pair.p_left ^ pair.p_right ^ y1v ^ kappa);
    bit_at(a, 13) ^ parity4(fv, 7, 15, 23, 31)
}

pub fn k3_inner(pair: &Pair, prefix: &[u32], kappa: u32) -> u32 {
    let (k0, k1, k2) = (prefix[0], prefix[1], prefix[2]);
    let a = pair.p_left ^ pair.p_right ^ pair.c_left;
    let b = pair.p_left ^ pair.c_left ^ pair.c_right;
    let y0v = y0(pair, k0);
    let y2v = y2(pair, k0, k1, k2);
    let fv = f_function(pair.p_left ^ y0v ^ y2v ^ kappa);
    parity3(b, 5, 13, 21) ^ bit_at(a, 15) ^ bit_at(fv, 15)
}

pub fn k3_outer(pair: &Pair, prefix: &[u32], kappa: u32) -> u32 {
    let (k0, k1, k2) = (prefix[0], prefix[1], prefix[2]);
    let a = pair.p_left ^ pair.p_right ^ pair.c_left;
    let b = pair.p_left ^ pair.c_left ^ pair.c_right;
    let y0v = y0(pair, k0);
    let y2v = y2(pair, k0, k1, k2);
    let fv = f_function(pair.p_left ^ y0v ^ y2v ^ kappa);
    bit_at(b, 13) ^ parity4(a, 7, 15, 23, 31) ^ parity4(fv, 7, 15, 23, 31)
}

/// The four cascaded levels, in search order.
pub const LEVELS: [LevelPredicates; 4] = [
    LevelPredicates {
        inner: k0_inner,
        outer: k0_outer,
    },
    LevelPredicates {
        inner: k1_inner,
        outer: k1_outer,
    },
    LevelPredicates {
        inner: k2_inner,
        outer: k2_outer,
    },
    LevelPredicates {
        inner: k3_inner,
        outer: k3_outer,
    },
];

/// Derives `(k4, k5)` from pair 0 given confirmed `(k0, k1, k2, k3)`, per
/// the FEAL-4 whitening equations.
pub fn derive_k4_k5(pair: &Pair, k0: u32, k1: u32, k2: u32, k3: u32) -> (u32, u32) {
    let y0v = y0(pair, k0);
    let y1v = y1(pair, k0, k1);
    let y2v = y2(pair, k0, k1, k2);
    let y3v = f_function(pair.p_left ^ y0v ^ y2v ^ k3);

    let k4 = pair.p_left ^ pair.p_right ^ y1v ^ y3v ^ pair.c_left;
    let k5 = pair.p_right ^ y1v ^ y3v ^ y0v ^ y2v ^ pair.c_right;
    (k4, k5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bit(v: u32, s: u32) -> u32 {
        bit_at(v, s)
    }

    #[test]
    fn bit_at_msb_convention() {
        assert_eq!(bit(0x8000_0000, 0), 1);
        assert_eq!(bit(0x8000_0000, 31), 0);
        assert_eq!(bit(0x0000_0001, 31), 1);
        assert_eq!(bit(0x0000_0001, 0), 0);
    }

    #[test]
    fn parity_helpers_match_manual_xor() {
        let v = 0b1010_1010_1010_1010_1010_1010_1010_1010u32;
        assert_eq!(parity3(v, 0, 1, 2), bit(v, 0) ^ bit(v, 1) ^ bit(v, 2));
        assert_eq!(
            parity4(v, 0, 7, 15, 31),
            bit(v, 0) ^ bit(v, 7) ^ bit(v, 15) ^ bit(v, 31)
        );
    }
}
