use rug::Integer;

use crate::dgk::{DecryptionKey, EncryptionKey, Params};
use crate::keyfile::der_codec::{self, Reader};
use crate::keyfile::{oid, pem, KeyFileError};

const PUBLIC_MARKER: &str = "PUBLIC KEY";
const PRIVATE_MARKER: &str = "PRIVATE KEY";

/// Serializes a DGK public key as `n,g,h,u,ell,t,k`, PEM-wrapped around a
/// `SubjectPublicKeyInfo` tagged with the DGK OID.
pub fn dgk_public_to_pem(ek: &EncryptionKey) -> String {
    let params = ek.params();
    let seq = der_codec::encode_sequence(&[
        der_codec::encode_integer(ek.n()),
        der_codec::encode_integer(ek.g()),
        der_codec::encode_integer(ek.h()),
        der_codec::encode_integer(ek.u()),
        der_codec::encode_integer(&Integer::from(params.ell)),
        der_codec::encode_integer(&Integer::from(params.t)),
        der_codec::encode_integer(&Integer::from(params.k)),
    ]);
    pem::wrap(PUBLIC_MARKER, &der_codec::encode_spki(oid::DGK, &seq))
}

pub fn dgk_public_from_pem(input: &str) -> Result<EncryptionKey, KeyFileError> {
    let der = pem::unwrap(PUBLIC_MARKER, input)?;
    let inner = der_codec::decode_spki(&der, oid::DGK)?;
    let mut seq = Reader::new(&inner).read_sequence()?;
    let key = read_public_fields(&mut seq)?;
    if !seq.at_end() {
        return Err(KeyFileError::InvalidDer);
    }
    Ok(key)
}

/// Serializes a DGK private key as `p,q,v_p,v_q,n,g,h,u,ell,t,k`, PEM-wrapped
/// around a `PrivateKeyInfo` tagged with the DGK OID.
pub fn dgk_private_to_pem(dk: &DecryptionKey) -> String {
    let ek = dk.encryption_key();
    let params = ek.params();
    let seq = der_codec::encode_sequence(&[
        der_codec::encode_integer(dk.p()),
        der_codec::encode_integer(dk.q()),
        der_codec::encode_integer(dk.v_p()),
        der_codec::encode_integer(dk.v_q()),
        der_codec::encode_integer(ek.n()),
        der_codec::encode_integer(ek.g()),
        der_codec::encode_integer(ek.h()),
        der_codec::encode_integer(ek.u()),
        der_codec::encode_integer(&Integer::from(params.ell)),
        der_codec::encode_integer(&Integer::from(params.t)),
        der_codec::encode_integer(&Integer::from(params.k)),
    ]);
    pem::wrap(PRIVATE_MARKER, &der_codec::encode_pkcs8(oid::DGK, &seq))
}

pub fn dgk_private_from_pem(input: &str) -> Result<DecryptionKey, KeyFileError> {
    let der = pem::unwrap(PRIVATE_MARKER, input)?;
    let inner = der_codec::decode_pkcs8(&der, oid::DGK)?;
    let mut seq = Reader::new(&inner).read_sequence()?;
    let p = seq.read_integer()?;
    let q = seq.read_integer()?;
    let v_p = seq.read_integer()?;
    let v_q = seq.read_integer()?;
    let ek = read_public_fields(&mut seq)?;
    if !seq.at_end() {
        return Err(KeyFileError::InvalidDer);
    }
    DecryptionKey::from_parts(ek, p, q, v_p, v_q).map_err(|_| KeyFileError::InvalidKeyMaterial)
}

fn read_public_fields(seq: &mut Reader<'_>) -> Result<EncryptionKey, KeyFileError> {
    let n = seq.read_integer()?;
    let g = seq.read_integer()?;
    let h = seq.read_integer()?;
    let u = seq.read_integer()?;
    let ell = to_u32(seq.read_integer()?)?;
    let t = to_u32(seq.read_integer()?)?;
    let k = to_u32(seq.read_integer()?)?;
    Ok(EncryptionKey::new(n, g, h, u, Params::new(ell, t, k)))
}

fn to_u32(value: Integer) -> Result<u32, KeyFileError> {
    value.to_u32().ok_or(KeyFileError::InvalidDer)
}
