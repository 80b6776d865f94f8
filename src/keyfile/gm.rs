//! Goldwasser–Micali keys have no entry in the algorithm-OID table and are
//! not wrapped in a `SubjectPublicKeyInfo`/PKCS#8 envelope: just a bare DER
//! `SEQUENCE` inside the PEM markers.

use crate::gm::{PrivateKey, PublicKey};
use crate::keyfile::der_codec::{self, Reader};
use crate::keyfile::{pem, KeyFileError};

const PUBLIC_MARKER: &str = "PUBLIC KEY";
const PRIVATE_MARKER: &str = "PRIVATE KEY";

pub fn gm_public_to_pem(pk: &PublicKey) -> String {
    let seq = der_codec::encode_sequence(&[
        der_codec::encode_integer(pk.n()),
        der_codec::encode_integer(pk.y()),
    ]);
    pem::wrap(PUBLIC_MARKER, &seq)
}

pub fn gm_public_from_pem(input: &str) -> Result<PublicKey, KeyFileError> {
    let der = pem::unwrap(PUBLIC_MARKER, input)?;
    let mut seq = Reader::new(&der).read_sequence()?;
    let n = seq.read_integer()?;
    let y = seq.read_integer()?;
    if !seq.at_end() {
        return Err(KeyFileError::InvalidDer);
    }
    Ok(PublicKey::from_parts(n, y))
}

pub fn gm_private_to_pem(sk: &PrivateKey) -> String {
    let seq = der_codec::encode_sequence(&[
        der_codec::encode_integer(sk.p()),
        der_codec::encode_integer(sk.q()),
        der_codec::encode_integer(sk.public_key().n()),
        der_codec::encode_integer(sk.public_key().y()),
    ]);
    pem::wrap(PRIVATE_MARKER, &seq)
}

pub fn gm_private_from_pem(input: &str) -> Result<PrivateKey, KeyFileError> {
    let der = pem::unwrap(PRIVATE_MARKER, input)?;
    let mut seq = Reader::new(&der).read_sequence()?;
    let p = seq.read_integer()?;
    let q = seq.read_integer()?;
    let n = seq.read_integer()?;
    let y = seq.read_integer()?;
    if !seq.at_end() {
        return Err(KeyFileError::InvalidDer);
    }
    Ok(PrivateKey::from_parts(p, q, PublicKey::from_parts(n, y)))
}
