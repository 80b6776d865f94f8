//! CipherCraft: partially-homomorphic public-key cryptosystems (Paillier, DGK,
//! ElGamal, Goldwasser–Micali) and a secure two-party comparison-and-arithmetic
//! protocol suite (DGK Protocol 1, Veugen/Joye Protocol 2, outsourced
//! multiplication/division, Top-K selection, private/encrypted equality)
//! layered over the first two.

pub mod comparison;
pub mod dgk;
pub mod elgamal;
pub mod gm;
pub mod keyfile;
pub mod ntl;
pub mod paillier;
pub mod transport;
