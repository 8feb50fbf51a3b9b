use crate::core::errors::FreewiseError;

/// One-way salted password hashing (bcrypt).
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        PasswordHasher { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, FreewiseError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| FreewiseError::InternalServerError(format!("Password hashing error: {}", e)))
    }

    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, FreewiseError> {
        bcrypt::verify(password, hash)
            .map_err(|e| FreewiseError::InternalServerError(format!("Password verification error: {}", e)))
    }
}
