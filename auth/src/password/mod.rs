pub mod argon2;
pub mod encoder;
pub mod errors;

pub use self::argon2::Argon2PasswordEncoder;
pub use encoder::PasswordEncoder;
pub use errors::PasswordError;
