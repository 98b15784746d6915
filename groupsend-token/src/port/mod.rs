pub mod clock;
pub mod key_provider;
pub mod token_authenticator;

pub use clock::Clock;
pub use key_provider::DerivedKeyProvider;
pub use token_authenticator::TokenAuthenticator;
