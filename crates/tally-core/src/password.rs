//! bcrypt password hashes
//!
//! Stored form is the standard modular crypt string (`$2b$<cost>$...`), so
//! data files carrying hashes from other bcrypt implementations verify as-is.

use bcrypt::BcryptResult;

#[cfg(not(test))]
const COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const COST: u32 = 4;

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> BcryptResult<String> {
    bcrypt::hash(password, COST)
}

/// Check a password against a stored hash; malformed hashes never match
pub fn verify_password(password: &str, stored: &str) -> bool {
    match bcrypt::verify(password, stored) {
        Ok(matches) => matches,
        Err(e) => {
            log::warn!("Unreadable password hash: {}", e);
            false
        }
    }
}
