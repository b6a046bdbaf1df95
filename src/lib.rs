//! Known-plaintext linear cryptanalysis of FEAL-4.
//!
//! Given a corpus of plaintext/ciphertext pairs produced under one unknown
//! key, [`search::search`] recovers every 6-subkey tuple that decrypts the
//! whole corpus correctly, using the cascaded K0 -> K1 -> K2 -> K3 linear
//! approximation attack described in Matsui & Yamagishi's original analysis
//! of FEAL-4.

pub mod approx;
pub mod cipher;
pub mod corpus;
pub mod error;
pub mod search;
