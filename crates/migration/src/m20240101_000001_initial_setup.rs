use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create installation_processes table
        manager
            .create_table(
                Table::create()
                    .table(InstallationProcesses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InstallationProcesses::OrderId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InstallationProcesses::DeviceId).string())
                    .col(ColumnDef::new(InstallationProcesses::Operator).string())
                    .col(ColumnDef::new(InstallationProcesses::Provider).string())
                    .col(ColumnDef::new(InstallationProcesses::Location).json_binary())
                    .col(ColumnDef::new(InstallationProcesses::Boot).json_binary())
                    .col(
                        ColumnDef::new(InstallationProcesses::Confirmed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(InstallationProcesses::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(InstallationProcesses::State)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(InstallationProcesses::Version)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstallationProcesses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_installation_processes_device_id")
                    .table(InstallationProcesses::Table)
                    .col(InstallationProcesses::DeviceId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_installation_processes_state")
                    .table(InstallationProcesses::Table)
                    .col(InstallationProcesses::State)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Create installation_events table (append-only)
        manager
            .create_table(
                Table::create()
                    .table(InstallationEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InstallationEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InstallationEvents::OrderId).string().not_null())
                    .col(ColumnDef::new(InstallationEvents::EventType).string().not_null())
                    .col(
                        ColumnDef::new(InstallationEvents::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstallationEvents::Payload)
                            .json_binary()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_installation_event_process")
                            .from(InstallationEvents::Table, InstallationEvents::OrderId)
                            .to(InstallationProcesses::Table, InstallationProcesses::OrderId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create devices table
        manager
            .create_table(
                Table::create()
                    .table(Devices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Devices::DeviceId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Devices::Operator).string())
                    .col(ColumnDef::new(Devices::Provider).string())
                    .col(ColumnDef::new(Devices::Location).json_binary())
                    .col(ColumnDef::new(Devices::OpeningHours).json_binary().not_null())
                    .col(ColumnDef::new(Devices::Settings).json_binary().not_null())
                    .col(ColumnDef::new(Devices::Version).big_integer().not_null())
                    .col(
                        ColumnDef::new(Devices::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_devices_operator")
                    .table(Devices::Table)
                    .col(Devices::Operator)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Create device_events table (append-only)
        manager
            .create_table(
                Table::create()
                    .table(DeviceEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeviceEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeviceEvents::DeviceId).string().not_null())
                    .col(ColumnDef::new(DeviceEvents::EventType).string().not_null())
                    .col(
                        ColumnDef::new(DeviceEvents::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeviceEvents::Payload).json_binary().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_device_event_device")
                            .from(DeviceEvents::Table, DeviceEvents::DeviceId)
                            .to(Devices::Table, Devices::DeviceId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create configs table (named JSON blobs)
        manager
            .create_table(
                Table::create()
                    .table(Configs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Configs::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Configs::Value).json_binary().not_null())
                    .col(
                        ColumnDef::new(Configs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Configs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeviceEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Devices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InstallationEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InstallationProcesses::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum InstallationProcesses {
    Table,
    OrderId,
    DeviceId,
    Operator,
    Provider,
    Location,
    Boot,
    Confirmed,
    Completed,
    State,
    Version,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InstallationEvents {
    Table,
    Id,
    OrderId,
    EventType,
    OccurredAt,
    Payload,
}

#[derive(DeriveIden)]
enum Devices {
    Table,
    DeviceId,
    Operator,
    Provider,
    Location,
    OpeningHours,
    Settings,
    Version,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DeviceEvents {
    Table,
    Id,
    DeviceId,
    EventType,
    OccurredAt,
    Payload,
}

#[derive(DeriveIden)]
enum Configs {
    Table,
    Name,
    Value,
    UpdatedAt,
}
