//! Password hashing via bcrypt.

use super::AuthError;
use crate::models::auth::UserWithPassword;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt (cost 10).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Check a plaintext password against a stored user's hash.
pub fn verify_user_password(user: &UserWithPassword, password: &str) -> Result<bool, AuthError> {
    verify_password(password, &user.password_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::User;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }

    #[test]
    fn verify_user_password_uses_stored_hash() {
        let user = UserWithPassword {
            user: User {
                id: 1,
                name: "Ann".into(),
                email: "ann@x.com".into(),
            },
            password_hash: hash_password("secret1").unwrap(),
        };
        assert!(verify_user_password(&user, "secret1").unwrap());
        assert!(!verify_user_password(&user, "Secret1").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("secret1", "not-a-bcrypt-hash"),
            Err(AuthError::Internal(_))
        ));
    }
}
