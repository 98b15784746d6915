pub mod token_issuer;
pub mod token_verifier;

pub use token_issuer::{issue_full_token, IssuanceError, TokenIssuer};
pub use token_verifier::TokenVerifier;
