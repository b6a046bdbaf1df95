//! The FEAL-4 cipher primitive: the F-function and the 4-round Feistel
//! encrypt/decrypt pair the search engine uses only as an oracle during
//! final validation.

/// A round subkey tuple `(k0, k1, k2, k3, k4, k5)`.
pub type RoundKeys = [u32; 6];

/// 8-bit left rotation by two bit positions.
fn rol2(v: u32) -> u32 {
    ((v << 2) | (v >> 6)) & 0xFF
}

fn s0(a: u32, b: u32) -> u32 {
    rol2((a + b) & 0xFF)
}

fn s1(a: u32, b: u32) -> u32 {
    rol2((a + b + 1) & 0xFF)
}

/// The FEAL F-function, the only non-linear primitive the cipher has.
///
/// `x` is treated as four big-endian bytes `x0 x1 x2 x3`.
pub fn f_function(x: u32) -> u32 {
    let x0 = (x >> 24) & 0xFF;
    let x1 = (x >> 16) & 0xFF;
    let x2 = (x >> 8) & 0xFF;
    let x3 = x & 0xFF;

    let t1 = x1 ^ x0;
    let t2 = x2 ^ x3;
    let y1 = s1(t1, t2);
    let y0 = s0(x0, y1);
    let y2 = s0(y1, t2);
    let y3 = s1(y2, x3);

    (y0 << 24) | (y1 << 16) | (y2 << 8) | y3
}

/// Decrypts a single block given its two 32-bit halves and all six subkeys.
///
/// This is the exact inverse of [`encrypt_halves`]: the four Feistel rounds
/// are run in reverse key order (`k3, k2, k1, k0`) after undoing the `k4,k5`
/// output whitening.
pub fn decrypt_halves(c_left: u32, c_right: u32, keys: &RoundKeys) -> (u32, u32) {
    let mut r = c_left ^ keys[4];
    let mut l = r ^ c_right ^ keys[5];

    for &key in &[keys[3], keys[2], keys[1], keys[0]] {
        let new_l = r ^ f_function(l ^ key);
        let new_r = l;
        l = new_l;
        r = new_r;
    }

    r ^= l;
    (l, r)
}

/// Encrypts a single block given its two 32-bit halves and all six subkeys.
///
/// Provided for round-trip testing and for generating fixtures; the search
/// engine itself never needs an encrypt oracle.
pub fn encrypt_halves(p_left: u32, p_right: u32, keys: &RoundKeys) -> (u32, u32) {
    let mut l = p_left;
    let mut r = p_right ^ p_left;

    for &key in &[keys[0], keys[1], keys[2], keys[3]] {
        let new_l = r;
        let new_r = l ^ f_function(r ^ key);
        l = new_l;
        r = new_r;
    }

    let c_left = r ^ keys[4];
    let c_right = l ^ r ^ keys[5];
    (c_left, c_right)
}

fn word_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn bytes_be(words: (u32, u32)) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[0..4].copy_from_slice(&words.0.to_be_bytes());
    out[4..8].copy_from_slice(&words.1.to_be_bytes());
    out
}

/// Decrypts an 8-byte block, big-endian within each half.
pub fn decrypt_block(block: &[u8; 8], keys: &RoundKeys) -> [u8; 8] {
    let (l, r) = decrypt_halves(word_be(&block[0..4]), word_be(&block[4..8]), keys);
    bytes_be((l, r))
}

/// Encrypts an 8-byte block, big-endian within each half.
pub fn encrypt_block(block: &[u8; 8], keys: &RoundKeys) -> [u8; 8] {
    let (l, r) = encrypt_halves(word_be(&block[0..4]), word_be(&block[4..8]), keys);
    bytes_be((l, r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn f_function_zero() {
        // t1=t2=0 => y1=S1(0,0)=ROL2(1)=0x04, y0=S0(0,0x04)=ROL2(4)=0x10,
        // y2=S0(0x04,0)=ROL2(4)=0x10, y3=S1(0x10,0)=ROL2(0x11)=0x44.
        assert_eq!(f_function(0x0000_0000), 0x1004_1044);
    }

    #[test]
    fn f_function_known_vector() {
        // Worked by hand from the S0/S1 definitions: t1=3, t2=7, y1=0x2c,
        // y0=0xb4, y2=0xcc, y3=0x47.
        assert_eq!(f_function(0x0102_0304), 0xb42c_cc47);
    }

    #[test]
    fn round_trip_zero_key() {
        let keys = [0u32; 6];
        let block = [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef];
        let ct = encrypt_block(&block, &keys);
        assert_eq!(decrypt_block(&ct, &keys), block);
    }

    #[test]
    fn round_trip_random_keys_and_blocks() {
        let mut rng = StdRng::seed_from_u64(0xFEA1_4);
        for _ in 0..200 {
            let keys: RoundKeys = [
                rng.gen(),
                rng.gen(),
                rng.gen(),
                rng.gen(),
                rng.gen(),
                rng.gen(),
            ];
            let block: [u8; 8] = rng.gen();
            let ct = encrypt_block(&block, &keys);
            assert_eq!(decrypt_block(&ct, &keys), block);
        }
    }
}
