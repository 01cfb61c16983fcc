use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::PersonRole;
use crate::repositories;

/// Creates or repairs the configured superuser account at startup so a fresh
/// deployment always has an admin login.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let username = &admin.first_superuser_username;
    let now = primitive_now_utc();

    let Some(person) = repositories::people::find_by_username(state.db(), username).await? else {
        let hashed_password = security::hash_password(&admin.first_superuser_password)?;
        repositories::people::create(
            state.db(),
            &Uuid::new_v4().to_string(),
            repositories::people::CreatePerson {
                username,
                hashed_password,
                full_name: "Administrator",
                role: PersonRole::Admin,
                is_active: true,
                now,
            },
        )
        .await?;
        tracing::info!("Created default superuser {username}");
        return Ok(());
    };

    let password_ok =
        security::verify_password(&admin.first_superuser_password, &person.hashed_password)
            .unwrap_or(false);

    let hashed_password = if password_ok {
        None
    } else {
        Some(security::hash_password(&admin.first_superuser_password)?)
    };
    let role = (person.role != PersonRole::Admin).then_some(PersonRole::Admin);
    let is_active = (!person.is_active).then_some(true);

    if hashed_password.is_none() && role.is_none() && is_active.is_none() {
        tracing::info!("Default superuser already up to date");
        return Ok(());
    }

    repositories::people::update(
        state.db(),
        &person.id,
        repositories::people::UpdatePerson {
            full_name: None,
            role,
            is_active,
            hashed_password,
            now,
        },
    )
    .await?;
    tracing::info!("Updated default superuser {username}");

    Ok(())
}
