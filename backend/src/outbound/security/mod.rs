//! Credential hashing and token signing adapters.

mod argon2_credential_hasher;
mod jwt_token_service;

pub use argon2_credential_hasher::Argon2CredentialHasher;
pub use jwt_token_service::JwtTokenService;
