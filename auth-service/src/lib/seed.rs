use std::collections::BTreeSet;

use auth::PasswordEncoder;

use crate::domain::identity::models::CredentialRecord;
use crate::domain::identity::ports::UserDirectory;

/// Accounts written on startup, with their roles.
pub const SEED_ACCOUNTS: [(&str, &[&str]); 2] = [("user", &["USER"]), ("admin", &["USER", "ADMIN"])];

/// Replace the directory contents with the seed accounts.
///
/// Every account shares `password`, stored hashed with `encoder`.
pub async fn seed_directory<UD, PE>(
    directory: &UD,
    encoder: &PE,
    password: &str,
) -> Result<(), anyhow::Error>
where
    UD: UserDirectory,
    PE: PasswordEncoder,
{
    tracing::info!("Start users initialization");

    directory.delete_all().await?;

    for (username, roles) in SEED_ACCOUNTS {
        let record = CredentialRecord {
            username: username.to_string(),
            password: encoder.hash(password)?,
            email: format!("{}@example.com", username),
            active: true,
            roles: roles.iter().map(|role| role.to_string()).collect::<BTreeSet<_>>(),
        };

        directory.save(record).await?;
        tracing::debug!(%username, ?roles, "Seeded user");
    }

    tracing::info!(users = SEED_ACCOUNTS.len(), "Done users initialization");
    Ok(())
}
