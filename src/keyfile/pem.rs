//! 64-column MIME-style base64 PEM envelope around a DER payload.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::keyfile::KeyFileError;

const LINE_WIDTH: usize = 64;

pub(crate) fn wrap(marker: &str, der: &[u8]) -> String {
    let encoded = STANDARD.encode(der);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH + 32);
    out.push_str("-----BEGIN ");
    out.push_str(marker);
    out.push_str("-----\n");
    for chunk in encoded.as_bytes().chunks(LINE_WIDTH) {
        // `encoded` is base64 output, always ASCII.
        out.push_str(std::str::from_utf8(chunk).expect("base64 alphabet is ASCII"));
        out.push('\n');
    }
    out.push_str("-----END ");
    out.push_str(marker);
    out.push_str("-----\n");
    out
}

pub(crate) fn unwrap(marker: &str, pem: &str) -> Result<Vec<u8>, KeyFileError> {
    let begin = format!("-----BEGIN {marker}-----");
    let end = format!("-----END {marker}-----");
    let start = pem.find(&begin).ok_or(KeyFileError::InvalidPem)? + begin.len();
    let finish = pem[start..].find(&end).ok_or(KeyFileError::InvalidPem)? + start;
    let body: String = pem[start..finish].chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(body)?)
}
