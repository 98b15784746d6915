pub mod clock;
pub mod crypto;
pub mod key_material;

pub use clock::{FixedClock, SystemClock};
pub use key_material::{DerivedKey, KeyMaterialError, ServerRootKey};
