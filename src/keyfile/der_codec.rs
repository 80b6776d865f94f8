//! A minimal, hand-written DER (distinguished encoding rules) TLV codec
//! covering exactly the constructs the key-file format needs: `INTEGER`,
//! `SEQUENCE`, `OBJECT IDENTIFIER`, `BIT STRING`, `OCTET STRING`, plus the
//! `SubjectPublicKeyInfo`/`PKCS#8 PrivateKeyInfo` envelope shapes. Kept
//! self-contained rather than routed through a general-purpose ASN.1 crate
//! since the wire format here is a fixed, small set of tags applied to
//! arbitrary-precision integers.

use rug::Integer;

use crate::keyfile::KeyFileError;

const TAG_INTEGER: u8 = 0x02;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_OCTET_STRING: u8 = 0x04;
const TAG_OID: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;

pub(crate) fn encode_integer(value: &Integer) -> Vec<u8> {
    tlv(TAG_INTEGER, &unsigned_content(value))
}

pub(crate) fn encode_sequence(children: &[Vec<u8>]) -> Vec<u8> {
    let mut body = Vec::new();
    for child in children {
        body.extend_from_slice(child);
    }
    tlv(TAG_SEQUENCE, &body)
}

pub(crate) fn encode_oid(dotted: &str) -> Vec<u8> {
    tlv(TAG_OID, &oid_content(dotted))
}

pub(crate) fn encode_bit_string(bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 1);
    body.push(0); // no unused trailing bits
    body.extend_from_slice(bytes);
    tlv(TAG_BIT_STRING, &body)
}

pub(crate) fn encode_octet_string(bytes: &[u8]) -> Vec<u8> {
    tlv(TAG_OCTET_STRING, bytes)
}

/// `SEQUENCE { SEQUENCE { OID }, BIT STRING { inner } }`, the
/// `SubjectPublicKeyInfo` shape used for public keys.
pub(crate) fn encode_spki(oid: &str, inner: &[u8]) -> Vec<u8> {
    let alg_id = encode_sequence(&[encode_oid(oid)]);
    encode_sequence(&[alg_id, encode_bit_string(inner)])
}

/// `SEQUENCE { INTEGER 0, SEQUENCE { OID }, OCTET STRING { inner } }`, the
/// `PKCS#8 PrivateKeyInfo` shape used for private keys.
pub(crate) fn encode_pkcs8(oid: &str, inner: &[u8]) -> Vec<u8> {
    let version = encode_integer(&Integer::from(0));
    let alg_id = encode_sequence(&[encode_oid(oid)]);
    encode_sequence(&[version, alg_id, encode_octet_string(inner)])
}

pub(crate) fn decode_spki(der: &[u8], expected_oid: &str) -> Result<Vec<u8>, KeyFileError> {
    let mut outer = Reader::new(der).read_sequence()?;
    let mut alg_id = outer.read_sequence()?;
    let oid = alg_id.read_oid()?;
    if oid != expected_oid {
        return Err(KeyFileError::OidMismatch);
    }
    outer.read_bit_string()
}

pub(crate) fn decode_pkcs8(der: &[u8], expected_oid: &str) -> Result<Vec<u8>, KeyFileError> {
    let mut outer = Reader::new(der).read_sequence()?;
    let version = outer.read_integer()?;
    if version != 0 {
        return Err(KeyFileError::InvalidDer);
    }
    let mut alg_id = outer.read_sequence()?;
    let oid = alg_id.read_oid()?;
    if oid != expected_oid {
        return Err(KeyFileError::OidMismatch);
    }
    outer.read_octet_string()
}

fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 8);
    out.push(tag);
    encode_length(content.len(), &mut out);
    out.extend_from_slice(content);
    out
}

fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let mut bytes = Vec::new();
    let mut n = len;
    while n > 0 {
        bytes.push((n & 0xff) as u8);
        n >>= 8;
    }
    bytes.reverse();
    out.push(0x80 | bytes.len() as u8);
    out.extend_from_slice(&bytes);
}

/// Big-endian minimal unsigned `INTEGER` content, with a leading `0x00`
/// inserted when the high bit of the most significant byte is set (so the
/// value doesn't read back as negative).
fn unsigned_content(value: &Integer) -> Vec<u8> {
    if value.cmp0().is_eq() {
        return vec![0];
    }
    let bytes = value.to_digits::<u8>(rug::integer::Order::Msf);
    if bytes.first().is_some_and(|&b| b & 0x80 != 0) {
        let mut padded = Vec::with_capacity(bytes.len() + 1);
        padded.push(0);
        padded.extend_from_slice(&bytes);
        padded
    } else {
        bytes
    }
}

fn oid_content(dotted: &str) -> Vec<u8> {
    let arcs: Vec<u32> = dotted
        .split('.')
        .map(|arc| arc.parse().expect("OID arc is a valid u32"))
        .collect();
    assert!(arcs.len() >= 2, "OID needs at least two arcs");
    let mut body = Vec::new();
    encode_base128(arcs[0] * 40 + arcs[1], &mut body);
    for &arc in &arcs[2..] {
        encode_base128(arc, &mut body);
    }
    body
}

fn encode_base128(value: u32, out: &mut Vec<u8>) {
    let mut groups = vec![(value & 0x7f) as u8];
    let mut rest = value >> 7;
    while rest > 0 {
        groups.push(((rest & 0x7f) as u8) | 0x80);
        rest >>= 7;
    }
    groups.reverse();
    out.extend_from_slice(&groups);
}

fn decode_oid_content(content: &[u8]) -> Result<String, KeyFileError> {
    let (&first, rest) = content.split_first().ok_or(KeyFileError::InvalidDer)?;
    let mut arcs = vec![(first / 40) as u32, (first % 40) as u32];
    let mut value: u32 = 0;
    for &byte in rest {
        value = (value << 7) | (byte & 0x7f) as u32;
        if byte & 0x80 == 0 {
            arcs.push(value);
            value = 0;
        }
    }
    Ok(arcs
        .into_iter()
        .map(|arc| arc.to_string())
        .collect::<Vec<_>>()
        .join("."))
}

/// A cursor over a DER byte slice, reading one TLV at a time.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn read_tlv(&mut self, expected_tag: u8) -> Result<&'a [u8], KeyFileError> {
        let tag = *self.data.get(self.pos).ok_or(KeyFileError::InvalidDer)?;
        if tag != expected_tag {
            return Err(KeyFileError::InvalidDer);
        }
        self.pos += 1;
        let len = self.read_length()?;
        let content = self
            .data
            .get(self.pos..self.pos + len)
            .ok_or(KeyFileError::InvalidDer)?;
        self.pos += len;
        Ok(content)
    }

    fn read_length(&mut self) -> Result<usize, KeyFileError> {
        let first = *self.data.get(self.pos).ok_or(KeyFileError::InvalidDer)?;
        self.pos += 1;
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }
        let n = (first & 0x7f) as usize;
        if n == 0 || n > std::mem::size_of::<usize>() {
            return Err(KeyFileError::InvalidDer);
        }
        let bytes = self
            .data
            .get(self.pos..self.pos + n)
            .ok_or(KeyFileError::InvalidDer)?;
        self.pos += n;
        let mut len: usize = 0;
        for &b in bytes {
            len = (len << 8) | b as usize;
        }
        Ok(len)
    }

    pub(crate) fn read_integer(&mut self) -> Result<Integer, KeyFileError> {
        let content = self.read_tlv(TAG_INTEGER)?;
        if content.is_empty() {
            return Err(KeyFileError::InvalidDer);
        }
        if content[0] & 0x80 != 0 {
            // Negative encodings never occur in this format; reject them
            // rather than silently misinterpreting magnitude.
            return Err(KeyFileError::InvalidDer);
        }
        Ok(Integer::from_digits(content, rug::integer::Order::Msf))
    }

    pub(crate) fn read_sequence(&mut self) -> Result<Reader<'a>, KeyFileError> {
        Ok(Reader::new(self.read_tlv(TAG_SEQUENCE)?))
    }

    pub(crate) fn read_oid(&mut self) -> Result<String, KeyFileError> {
        decode_oid_content(self.read_tlv(TAG_OID)?)
    }

    pub(crate) fn read_bit_string(&mut self) -> Result<Vec<u8>, KeyFileError> {
        let content = self.read_tlv(TAG_BIT_STRING)?;
        let (&unused, bits) = content.split_first().ok_or(KeyFileError::InvalidDer)?;
        if unused != 0 {
            return Err(KeyFileError::InvalidDer);
        }
        Ok(bits.to_vec())
    }

    pub(crate) fn read_octet_string(&mut self) -> Result<Vec<u8>, KeyFileError> {
        Ok(self.read_tlv(TAG_OCTET_STRING)?.to_vec())
    }
}
