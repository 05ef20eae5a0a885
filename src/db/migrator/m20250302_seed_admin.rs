use crate::constants::seed;
use crate::db::repositories::user::hash_password;
use crate::entities::prelude::*;
use crate::entities::users;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = crate::db::now_timestamp();
        let today = now[..10].to_string();

        let password_hash = hash_password(seed::ADMIN_PASSWORD, None)
            .map_err(|e| DbErr::Custom(format!("Failed to hash default admin password: {e}")))?;

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                users::Column::Name,
                users::Column::Email,
                users::Column::PasswordHash,
                users::Column::Role,
                users::Column::Phone,
                users::Column::MembershipType,
                users::Column::JoiningDate,
                users::Column::IsActive,
                users::Column::CreatedAt,
                users::Column::UpdatedAt,
            ])
            .values_panic([
                seed::ADMIN_NAME.into(),
                seed::ADMIN_EMAIL.into(),
                password_hash.into(),
                "admin".into(),
                seed::ADMIN_PHONE.into(),
                seed::ADMIN_MEMBERSHIP.into(),
                today.into(),
                true.into(),
                now.clone().into(),
                now.into(),
            ])
            .on_conflict(
                OnConflict::column(users::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = sea_orm_migration::sea_query::Query::delete()
            .from_table(Users)
            .and_where(Expr::col(users::Column::Email).eq(seed::ADMIN_EMAIL))
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
