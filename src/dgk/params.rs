/// DGK key-generation parameters: plaintext bit length `ell`, security
/// parameter `t`, and modulus bit length `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Supported plaintext bit length; the plaintext space is `Z_u` with
    /// `u` a prime of `ell+3` bits.
    pub ell: u32,
    /// Security parameter: bit length of the prime factors `v_p`, `v_q` of
    /// the small subgroup order.
    pub t: u32,
    /// Modulus bit length (`n = p*q`).
    pub k: u32,
}

impl Default for Params {
    /// `ell=16, t=160, k=1024`
    fn default() -> Self {
        Self {
            ell: 16,
            t: 160,
            k: 1024,
        }
    }
}

impl Params {
    pub fn new(ell: u32, t: u32, k: u32) -> Self {
        Self { ell, t, k }
    }
}
