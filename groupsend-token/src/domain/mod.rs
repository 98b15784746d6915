pub mod full_token;
pub mod identity_encoding;
pub mod service_id;
pub mod timestamp;

pub use full_token::{FormatError, FullToken, VerificationError, FULL_TOKEN_LEN, TAG_LEN};
pub use identity_encoding::{
    encode_identity_set, identity_binding, CanonicalIdentity, EncodingError,
};
pub use service_id::{ServiceId, ServiceIdError};
pub use timestamp::Timestamp;
