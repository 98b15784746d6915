use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// Leading byte of an aliased (PNI) record. Plain (ACI) records carry no kind byte.
const PNI_KIND_BYTE: u8 = 0x01;
const PNI_STRING_PREFIX: &str = "PNI:";

pub const ACI_BINARY_LEN: usize = 16;
pub const PNI_BINARY_LEN: usize = 17;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceIdError {
    #[error("invalid service id length: {0}")]
    InvalidLength(usize),
    #[error("unknown service id kind byte: {0:#04x}")]
    UnknownKind(u8),
    #[error("invalid service id string: {0}")]
    InvalidString(String),
}

/// An anonymous recipient identity.
///
/// - `Aci` is the plain kind, encoded as the 16 raw UUID bytes.
/// - `Pni` is the aliased kind, encoded as the kind byte `0x01` followed by the UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceId {
    Aci(Uuid),
    Pni(Uuid),
}

impl ServiceId {
    pub fn uuid(&self) -> &Uuid {
        match self {
            ServiceId::Aci(uuid) | ServiceId::Pni(uuid) => uuid,
        }
    }

    pub fn is_aci(&self) -> bool {
        matches!(self, ServiceId::Aci(_))
    }

    /// Canonical binary record of this identity.
    pub fn service_id_binary(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PNI_BINARY_LEN);
        self.append_service_id_binary(&mut out);
        out
    }

    pub(crate) fn append_service_id_binary(&self, out: &mut Vec<u8>) {
        match self {
            ServiceId::Aci(uuid) => out.extend_from_slice(uuid.as_bytes()),
            ServiceId::Pni(uuid) => {
                out.push(PNI_KIND_BYTE);
                out.extend_from_slice(uuid.as_bytes());
            }
        }
    }

    pub(crate) fn binary_len(&self) -> usize {
        match self {
            ServiceId::Aci(_) => ACI_BINARY_LEN,
            ServiceId::Pni(_) => PNI_BINARY_LEN,
        }
    }

    /// Recovers an identity from a single canonical record.
    pub fn parse_from_service_id_binary(bytes: &[u8]) -> Result<Self, ServiceIdError> {
        match bytes.len() {
            ACI_BINARY_LEN => {
                let uuid = Uuid::from_slice(bytes)
                    .map_err(|_| ServiceIdError::InvalidLength(bytes.len()))?;
                Ok(ServiceId::Aci(uuid))
            }
            PNI_BINARY_LEN => {
                if bytes[0] != PNI_KIND_BYTE {
                    return Err(ServiceIdError::UnknownKind(bytes[0]));
                }
                let uuid = Uuid::from_slice(&bytes[1..])
                    .map_err(|_| ServiceIdError::InvalidLength(bytes.len()))?;
                Ok(ServiceId::Pni(uuid))
            }
            other => Err(ServiceIdError::InvalidLength(other)),
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceId::Aci(uuid) => write!(f, "{}", uuid.hyphenated()),
            ServiceId::Pni(uuid) => write!(f, "{}{}", PNI_STRING_PREFIX, uuid.hyphenated()),
        }
    }
}

impl FromStr for ServiceId {
    type Err = ServiceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (raw, is_pni) = match s.strip_prefix(PNI_STRING_PREFIX) {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        let uuid = Uuid::parse_str(raw).map_err(|_| ServiceIdError::InvalidString(s.to_string()))?;
        Ok(if is_pni {
            ServiceId::Pni(uuid)
        } else {
            ServiceId::Aci(uuid)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid() -> Uuid {
        Uuid::from_bytes([
            0x9d, 0x0b, 0x73, 0x6a, 0x1d, 0x10, 0x4a, 0x29, 0x8e, 0x1b, 0x0c, 0x2c, 0x3b, 0x9e,
            0x6d, 0x51,
        ])
    }

    #[test]
    fn aci_is_raw_uuid_bytes() {
        let aci = ServiceId::Aci(uuid());
        assert_eq!(aci.service_id_binary(), uuid().as_bytes().to_vec());
        assert_eq!(aci.binary_len(), ACI_BINARY_LEN);
    }

    #[test]
    fn pni_carries_kind_byte() {
        let pni = ServiceId::Pni(uuid());
        let binary = pni.service_id_binary();
        assert_eq!(binary.len(), PNI_BINARY_LEN);
        assert_eq!(binary[0], 0x01);
        assert_eq!(&binary[1..], uuid().as_bytes());
    }

    #[test]
    fn same_uuid_different_kind_encodes_differently() {
        assert_ne!(
            ServiceId::Aci(uuid()).service_id_binary(),
            ServiceId::Pni(uuid()).service_id_binary()
        );
    }

    #[test]
    fn parse_recovers_kind_and_value() {
        for id in [ServiceId::Aci(uuid()), ServiceId::Pni(uuid())] {
            let parsed = ServiceId::parse_from_service_id_binary(&id.service_id_binary()).unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(
            ServiceId::parse_from_service_id_binary(&[0u8; 15]),
            Err(ServiceIdError::InvalidLength(15))
        );
        let mut bad_kind = ServiceId::Pni(uuid()).service_id_binary();
        bad_kind[0] = 0x02;
        assert_eq!(
            ServiceId::parse_from_service_id_binary(&bad_kind),
            Err(ServiceIdError::UnknownKind(0x02))
        );
    }

    #[test]
    fn string_form() {
        let aci: ServiceId = "9d0b736a-1d10-4a29-8e1b-0c2c3b9e6d51".parse().unwrap();
        assert_eq!(aci, ServiceId::Aci(uuid()));
        let pni: ServiceId = "PNI:9d0b736a-1d10-4a29-8e1b-0c2c3b9e6d51".parse().unwrap();
        assert_eq!(pni, ServiceId::Pni(uuid()));
        assert_eq!(pni.to_string(), "PNI:9d0b736a-1d10-4a29-8e1b-0c2c3b9e6d51");
        assert!("not-a-uuid".parse::<ServiceId>().is_err());
    }
}
