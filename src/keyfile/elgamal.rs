use rug::Integer;

use crate::elgamal::PublicKey;
use crate::keyfile::der_codec::{self, Reader};
use crate::keyfile::{oid, pem, KeyFileError};

const PUBLIC_MARKER: &str = "PUBLIC KEY";

/// Serializes an ElGamal public key as `p,g,h,additive` (`additive` encoded
/// as an `INTEGER` `0`/`1`), PEM-wrapped around a `SubjectPublicKeyInfo`
/// tagged with the ElGamal OID.
pub fn elgamal_public_to_pem(pk: &PublicKey) -> String {
    let seq = der_codec::encode_sequence(&[
        der_codec::encode_integer(pk.p()),
        der_codec::encode_integer(pk.g()),
        der_codec::encode_integer(pk.h()),
        der_codec::encode_integer(&Integer::from(pk.additive() as u32)),
    ]);
    pem::wrap(PUBLIC_MARKER, &der_codec::encode_spki(oid::ELGAMAL, &seq))
}

pub fn elgamal_public_from_pem(input: &str) -> Result<PublicKey, KeyFileError> {
    let der = pem::unwrap(PUBLIC_MARKER, input)?;
    let inner = der_codec::decode_spki(&der, oid::ELGAMAL)?;
    let mut seq = Reader::new(&inner).read_sequence()?;
    let p = seq.read_integer()?;
    let g = seq.read_integer()?;
    let h = seq.read_integer()?;
    let additive = seq.read_integer()?;
    if !seq.at_end() {
        return Err(KeyFileError::InvalidDer);
    }
    match additive.to_u8() {
        Some(0) => Ok(PublicKey::new_multiplicative(p, g, h)),
        Some(1) => Ok(PublicKey::new_additive(p, g, h)),
        _ => Err(KeyFileError::InvalidDer),
    }
}
