//! Algorithm OIDs rooted at the IANA Private Enterprise Number
//! `1.3.6.1.4.1.10384` assigned to this crate's key-file format.

pub(crate) const DGK: &str = "1.3.6.1.4.1.10384.1";
pub(crate) const ELGAMAL: &str = "1.3.6.1.4.1.10384.2";
/// Declared for completeness; Goldwasser–Micali keys are not wrapped in an
/// OID-tagged envelope (see [`crate::keyfile::gm`]), so this OID is never
/// encoded on the wire.
#[allow(dead_code)]
pub(crate) const GM: &str = "1.3.6.1.4.1.10384.3";
pub(crate) const PAILLIER: &str = "1.3.6.1.4.1.10384.4";
