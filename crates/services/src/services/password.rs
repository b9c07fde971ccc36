use bcrypt::{DEFAULT_COST, hash};
use thiserror::Error;

/// bcrypt cost factor for stored user passwords.
pub const BCRYPT_COST: u32 = DEFAULT_COST;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hash a password with bcrypt. The salt is embedded in the returned string.
///
/// bcrypt is CPU bound, so the work runs on the blocking thread pool.
pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_string();
    let hashed = tokio::task::spawn_blocking(move || hash(password, BCRYPT_COST)).await??;
    Ok(hashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_verifies_and_is_salted() {
        let a = hash_password("hunter2").await.unwrap();
        let b = hash_password("hunter2").await.unwrap();

        assert_ne!(a, b);
        assert!(a.starts_with("$2b$12$"));
        assert!(!a.contains("hunter2"));
        assert!(bcrypt::verify("hunter2", &a).unwrap());
        assert!(!bcrypt::verify("hunter3", &a).unwrap());
    }
}
