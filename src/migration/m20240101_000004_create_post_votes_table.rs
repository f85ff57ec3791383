use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum PostVotes {
    Table,
    UserId,
    PostId,
    Value,
    Deleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostVotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostVotes::UserId).integer().not_null())
                    .col(ColumnDef::new(PostVotes::PostId).integer().not_null())
                    .col(
                        ColumnDef::new(PostVotes::Value)
                            .small_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(PostVotes::Value).between(-1, 1)),
                    )
                    .col(
                        ColumnDef::new(PostVotes::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PostVotes::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PostVotes::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // One vote per (user, post)
                    .primary_key(
                        Index::create()
                            .name("pk_post_votes")
                            .col(PostVotes::UserId)
                            .col(PostVotes::PostId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_votes_user_id")
                            .from(PostVotes::Table, PostVotes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_votes_post_id")
                            .from(PostVotes::Table, PostVotes::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_votes_post_id")
                    .table(PostVotes::Table)
                    .col(PostVotes::PostId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostVotes::Table).to_owned())
            .await
    }
}
