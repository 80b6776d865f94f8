use rug::{Complete, Integer};

use crate::dgk::{DecryptionKey, EncryptionKey, Params};

#[derive(serde::Serialize, serde::Deserialize)]
struct RawParams {
    ell: u32,
    t: u32,
    k: u32,
}

impl From<Params> for RawParams {
    fn from(p: Params) -> Self {
        Self {
            ell: p.ell,
            t: p.t,
            k: p.k,
        }
    }
}

impl From<RawParams> for Params {
    fn from(p: RawParams) -> Self {
        Params::new(p.ell, p.t, p.k)
    }
}

impl serde::Serialize for EncryptionKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (
            self.n(),
            self.g(),
            self.h(),
            self.u(),
            RawParams::from(self.params()),
        )
            .serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for EncryptionKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (n, g, h, u, params): (Integer, Integer, Integer, Integer, RawParams) =
            serde::Deserialize::deserialize(deserializer)?;
        Ok(EncryptionKey::new(n, g, h, u, params.into()))
    }
}

impl serde::Serialize for DecryptionKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let ek = self.encryption_key();
        (
            self.p(),
            self.q(),
            self.v_p(),
            self.v_q(),
            ek.g(),
            ek.h(),
            ek.u(),
            RawParams::from(ek.params()),
        )
            .serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for DecryptionKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (p, q, v_p, v_q, g, h, u, params): (
            Integer,
            Integer,
            Integer,
            Integer,
            Integer,
            Integer,
            Integer,
            RawParams,
        ) = serde::Deserialize::deserialize(deserializer)?;
        let n: Integer = (&p * &q).complete();
        let ek = EncryptionKey::new(n, g, h, u, params.into());
        DecryptionKey::from_parts(ek, p, q, v_p, v_q)
            .map_err(|_| <D::Error as serde::de::Error>::custom("invalid dgk key"))
    }
}
