use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Projects::Title).string().not_null())
                    .col(ColumnDef::new(Projects::Language).string())
                    .col(ColumnDef::new(Projects::InfoLanguage).string())
                    .col(ColumnDef::new(Projects::SettingsLanguage).string())
                    .col(ColumnDef::new(Projects::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Projects::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Hypotheses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Hypotheses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Hypotheses::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Hypotheses::Title).string().not_null())
                    .col(ColumnDef::new(Hypotheses::Description).text())
                    .col(ColumnDef::new(Hypotheses::LeanCanvas).text())
                    .col(ColumnDef::new(Hypotheses::Icp).text())
                    .col(ColumnDef::new(Hypotheses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Hypotheses::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hypotheses_project_id")
                            .from(Hypotheses::Table, Hypotheses::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SeoClusters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SeoClusters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SeoClusters::ProjectId).integer().not_null())
                    .col(ColumnDef::new(SeoClusters::HypothesisId).integer().not_null())
                    .col(ColumnDef::new(SeoClusters::Title).string().not_null())
                    .col(ColumnDef::new(SeoClusters::Intent).string().not_null())
                    .col(
                        ColumnDef::new(SeoClusters::Keywords)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(SeoClusters::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(SeoClusters::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(SeoClusters::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(SeoClusters::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seo_clusters_project_id")
                            .from(SeoClusters::Table, SeoClusters::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SeoBacklogIdeas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SeoBacklogIdeas::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SeoBacklogIdeas::ProjectId).integer().not_null())
                    .col(
                        ColumnDef::new(SeoBacklogIdeas::HypothesisId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SeoBacklogIdeas::Title).string().not_null())
                    .col(ColumnDef::new(SeoBacklogIdeas::Description).text())
                    .col(ColumnDef::new(SeoBacklogIdeas::Category).string().not_null())
                    .col(
                        ColumnDef::new(SeoBacklogIdeas::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(SeoBacklogIdeas::ClusterId).integer())
                    .col(ColumnDef::new(SeoBacklogIdeas::ScheduledDate).timestamp())
                    .col(ColumnDef::new(SeoBacklogIdeas::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(SeoBacklogIdeas::UpdatedBy).integer().not_null())
                    .col(
                        ColumnDef::new(SeoBacklogIdeas::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SeoBacklogIdeas::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seo_backlog_ideas_project_id")
                            .from(SeoBacklogIdeas::Table, SeoBacklogIdeas::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_seo_backlog_ideas_scope")
                    .table(SeoBacklogIdeas::Table)
                    .col(SeoBacklogIdeas::ProjectId)
                    .col(SeoBacklogIdeas::HypothesisId)
                    .col(SeoBacklogIdeas::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SeoContentItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SeoContentItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SeoContentItems::ProjectId).integer().not_null())
                    .col(
                        ColumnDef::new(SeoContentItems::HypothesisId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SeoContentItems::BacklogIdeaId).integer())
                    .col(ColumnDef::new(SeoContentItems::Title).string().not_null())
                    .col(ColumnDef::new(SeoContentItems::Category).string().not_null())
                    .col(
                        ColumnDef::new(SeoContentItems::Format)
                            .string()
                            .not_null()
                            .default("article"),
                    )
                    .col(ColumnDef::new(SeoContentItems::Outline).text())
                    .col(
                        ColumnDef::new(SeoContentItems::Content)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(SeoContentItems::ImageUrl).string())
                    .col(
                        ColumnDef::new(SeoContentItems::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(SeoContentItems::OwnerId).integer())
                    .col(ColumnDef::new(SeoContentItems::ReviewerId).integer())
                    .col(ColumnDef::new(SeoContentItems::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(SeoContentItems::UpdatedBy).integer().not_null())
                    .col(
                        ColumnDef::new(SeoContentItems::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SeoContentItems::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seo_content_items_project_id")
                            .from(SeoContentItems::Table, SeoContentItems::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one content item per backlog idea; NULLs do not collide.
        manager
            .create_index(
                Index::create()
                    .name("idx_seo_content_items_backlog_idea")
                    .table(SeoContentItems::Table)
                    .col(SeoContentItems::BacklogIdeaId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SeoSprintSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SeoSprintSettings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SeoSprintSettings::ProjectId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SeoSprintSettings::HypothesisId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SeoSprintSettings::WeeklyCadence)
                            .integer()
                            .not_null()
                            .default(2),
                    )
                    .col(
                        ColumnDef::new(SeoSprintSettings::PublishDays)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(SeoSprintSettings::WordpressBaseUrl).string())
                    .col(ColumnDef::new(SeoSprintSettings::WordpressUsername).string())
                    .col(ColumnDef::new(SeoSprintSettings::WordpressAppPassword).string())
                    .col(
                        ColumnDef::new(SeoSprintSettings::WordpressDefaultCategoryId)
                            .big_integer(),
                    )
                    .col(
                        ColumnDef::new(SeoSprintSettings::WordpressDefaultTagIds)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(SeoSprintSettings::WordpressPostType).string())
                    .col(
                        ColumnDef::new(SeoSprintSettings::CreatedBy)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SeoSprintSettings::UpdatedBy)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SeoSprintSettings::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SeoSprintSettings::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_seo_sprint_settings_scope")
                    .table(SeoSprintSettings::Table)
                    .col(SeoSprintSettings::ProjectId)
                    .col(SeoSprintSettings::HypothesisId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SeoSprintSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SeoContentItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SeoBacklogIdeas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SeoClusters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hypotheses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    OwnerId,
    Title,
    Language,
    InfoLanguage,
    SettingsLanguage,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Hypotheses {
    Table,
    Id,
    ProjectId,
    Title,
    Description,
    LeanCanvas,
    Icp,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SeoClusters {
    Table,
    Id,
    ProjectId,
    HypothesisId,
    Title,
    Intent,
    Keywords,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SeoBacklogIdeas {
    Table,
    Id,
    ProjectId,
    HypothesisId,
    Title,
    Description,
    Category,
    Status,
    ClusterId,
    ScheduledDate,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SeoContentItems {
    Table,
    Id,
    ProjectId,
    HypothesisId,
    BacklogIdeaId,
    Title,
    Category,
    Format,
    Outline,
    Content,
    ImageUrl,
    Status,
    OwnerId,
    ReviewerId,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SeoSprintSettings {
    Table,
    Id,
    ProjectId,
    HypothesisId,
    WeeklyCadence,
    PublishDays,
    WordpressBaseUrl,
    WordpressUsername,
    WordpressAppPassword,
    WordpressDefaultCategoryId,
    WordpressDefaultTagIds,
    WordpressPostType,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}
