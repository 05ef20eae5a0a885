use crate::config::Config;
use crate::constants::seed;
use crate::db::{NewUser, Store};
use crate::entities::users::Role;

struct DemoAccount {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    phone: &'static str,
    membership: &'static str,
    role: Role,
}

const ACCOUNTS: [DemoAccount; 2] = [
    DemoAccount {
        name: seed::ADMIN_NAME,
        email: seed::ADMIN_EMAIL,
        password: seed::ADMIN_PASSWORD,
        phone: seed::ADMIN_PHONE,
        membership: seed::ADMIN_MEMBERSHIP,
        role: Role::Admin,
    },
    DemoAccount {
        name: seed::MEMBER_NAME,
        email: seed::MEMBER_EMAIL,
        password: seed::MEMBER_PASSWORD,
        phone: seed::MEMBER_PHONE,
        membership: seed::MEMBER_MEMBERSHIP,
        role: Role::User,
    },
];

/// Existing accounts are left as they are.
pub async fn cmd_seed(config: &Config) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    for account in &ACCOUNTS {
        if store.email_exists(account.email).await? {
            println!("• {} already exists", account.email);
            continue;
        }

        store
            .create_user(
                NewUser {
                    name: account.name.to_string(),
                    email: account.email.to_string(),
                    password: account.password.to_string(),
                    phone: account.phone.to_string(),
                    membership_type: Some(account.membership.to_string()),
                    role: account.role,
                },
                &config.security,
            )
            .await?;
        println!("✓ Created {} / {}", account.email, account.password);
    }

    println!("Database seeded.");
    Ok(())
}
