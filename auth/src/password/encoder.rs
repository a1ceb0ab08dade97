/// Password hashing capability.
///
/// Services depend on this trait rather than on a concrete algorithm, so the
/// credential check only ever sees "hash" and "verify".
pub trait PasswordEncoder: Send + Sync + 'static {
    /// Hash a plaintext password for storage.
    ///
    /// # Errors
    /// * `HashingFailed` - The underlying algorithm rejected the input
    fn hash(&self, password: &str) -> Result<String, super::PasswordError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// # Returns
    /// True if the password matches, false otherwise
    ///
    /// # Errors
    /// * `MalformedHash` - The stored value is not a hash this encoder understands
    fn verify(&self, password: &str, stored: &str) -> Result<bool, super::PasswordError>;
}
