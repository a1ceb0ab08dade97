pub mod cassandra;
pub mod memory;

pub use cassandra::CassandraUserDirectory;
pub use memory::InMemoryUserDirectory;
