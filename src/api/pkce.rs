// PKCE (RFC 7636) verifier and S256 challenge helpers
use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Unreserved URI characters a code verifier is drawn from.
pub const VERIFIER_CHARSET: &[u8; 66] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Length of every S256 challenge: 32 digest bytes, base64url without padding.
pub const CHALLENGE_LEN: usize = 43;

#[derive(Debug, Error)]
pub enum PkceError {
    #[error("secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),
    #[error("sha-256 digest unavailable: {0}")]
    DigestUnavailable(String),
}

/// Source of SHA-256 digests for challenge derivation.
pub trait ChallengeDigest {
    fn sha256(&self, data: &[u8]) -> Result<[u8; 32], PkceError>;
}

/// Digest backed by the `sha2` crate; never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Digest;

impl ChallengeDigest for Sha256Digest {
    fn sha256(&self, data: &[u8]) -> Result<[u8; 32], PkceError> {
        Ok(Sha256::digest(data).into())
    }
}

/// Map raw bytes onto the verifier alphabet with `byte % 66`, keeping order.
///
/// 256 is not a multiple of 66, so the first 58 characters come up slightly
/// more often. The skew is kept so identical bytes always give identical
/// verifiers.
pub fn verifier_from_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| VERIFIER_CHARSET[*b as usize % VERIFIER_CHARSET.len()] as char)
        .collect()
}

/// Generate a verifier of exactly `length` characters from the OS CSPRNG.
///
/// No range check is done here; callers that need RFC compliance must keep
/// `length` within 43..=128 themselves. A zero length yields an empty string.
pub fn generate_code_verifier(length: usize) -> Result<String, PkceError> {
    generate_code_verifier_with(&mut OsRng, length)
}

/// Same as [`generate_code_verifier`] but draws bytes from `rng`.
pub fn generate_code_verifier_with<R>(rng: &mut R, length: usize) -> Result<String, PkceError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let mut bytes = vec![0u8; length];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| PkceError::RandomnessUnavailable(e.to_string()))?;
    Ok(verifier_from_bytes(&bytes))
}

/// Derive the S256 code challenge for `verifier`.
pub fn generate_code_challenge(verifier: &str) -> Result<String, PkceError> {
    generate_code_challenge_with(&Sha256Digest, verifier)
}

pub fn generate_code_challenge_with<D>(digest: &D, verifier: &str) -> Result<String, PkceError>
where
    D: ChallengeDigest + ?Sized,
{
    let hash = digest.sha256(verifier.as_bytes())?;
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(hash))
}

/// A verifier together with the challenge derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    pub fn generate(length: usize) -> Result<Self, PkceError> {
        let verifier = generate_code_verifier(length)?;
        let challenge = generate_code_challenge(&verifier)?;
        Ok(Self { verifier, challenge })
    }
}
