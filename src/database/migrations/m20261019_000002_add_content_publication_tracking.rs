use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(SeoContentItems::Table)
                    .add_column(
                        ColumnDef::new(SeoContentItems::ImageStatus)
                            .string()
                            .not_null()
                            .default("none"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(SeoContentItems::Table)
                    .add_column(ColumnDef::new(SeoContentItems::ImageError).text())
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(SeoContentItems::Table)
                    .add_column(ColumnDef::new(SeoContentItems::WordpressPostId).big_integer())
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(SeoContentItems::Table)
                    .add_column(ColumnDef::new(SeoContentItems::WordpressPostUrl).string())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for column in [
            SeoContentItems::ImageStatus,
            SeoContentItems::ImageError,
            SeoContentItems::WordpressPostId,
            SeoContentItems::WordpressPostUrl,
        ] {
            manager
                .alter_table(
                    Table::alter()
                        .table(SeoContentItems::Table)
                        .drop_column(column)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum SeoContentItems {
    Table,
    ImageStatus,
    ImageError,
    WordpressPostId,
    WordpressPostUrl,
}
