//! Migration to create students table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Students::FatherName).string_len(255).null())
                    .col(ColumnDef::new(Students::LastName).string_len(255).null())
                    .col(ColumnDef::new(Students::Address).string_len(500).null())
                    .col(
                        ColumnDef::new(Students::Phone)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::Birthdate).date().null())
                    .col(ColumnDef::new(Students::Gender).string_len(20).null())
                    .col(ColumnDef::new(Students::Source).string_len(255).null())
                    .col(ColumnDef::new(Students::GraduationYear).integer().null())
                    .col(ColumnDef::new(Students::Notes).text().null())
                    .col(
                        ColumnDef::new(Students::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_students_name")
                    .table(Students::Table)
                    .col(Students::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_students_graduation_year")
                    .table(Students::Table)
                    .col(Students::GraduationYear)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Students {
    Table,
    Id,
    Name,
    FatherName,
    LastName,
    Address,
    Phone,
    Birthdate,
    Gender,
    Source,
    GraduationYear,
    Notes,
    CreatedAt,
}
