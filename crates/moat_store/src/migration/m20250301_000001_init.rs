use sea_orm_migration::prelude::*;

use crate::db::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customer::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customer::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomerCommonName::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomerCommonName::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomerCommonName::CustomerId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomerCommonName::CommonName)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_customer_common_name_common_name")
                    .table(CustomerCommonName::Table)
                    .col(CustomerCommonName::CommonName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Identifier::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Identifier::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Identifier::CustomerId).integer().not_null())
                    .col(ColumnDef::new(Identifier::AliasName).string().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_identifier_customer_id")
                    .table(Identifier::Table)
                    .col(Identifier::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MitigationScope::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MitigationScope::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MitigationScope::CustomerId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MitigationScope::MitigationId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MitigationScope::Lifetime).integer().not_null())
                    .col(ColumnDef::new(MitigationScope::Status).integer().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_mitigation_scope_customer_id")
                    .table(MitigationScope::Table)
                    .col(MitigationScope::CustomerId)
                    .col(MitigationScope::MitigationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SignalSessionConfiguration::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SignalSessionConfiguration::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SignalSessionConfiguration::CustomerId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SignalSessionConfiguration::SessionId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SignalSessionConfiguration::HeartbeatInterval)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SignalSessionConfiguration::MissingHbAllowed)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SignalSessionConfiguration::MaxRetransmit)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SignalSessionConfiguration::AckTimeout)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SignalSessionConfiguration::AckRandomFactor)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SignalSessionConfiguration::TriggerMitigation)
                            .boolean()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_signal_session_configuration_customer_id")
                    .table(SignalSessionConfiguration::Table)
                    .col(SignalSessionConfiguration::CustomerId)
                    .col(SignalSessionConfiguration::SessionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ParameterValue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParameterValue::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ParameterValue::CustomerId).integer())
                    .col(ColumnDef::new(ParameterValue::IdentifierId).big_integer())
                    .col(ColumnDef::new(ParameterValue::MitigationScopeId).big_integer())
                    .col(ColumnDef::new(ParameterValue::Type).string().not_null())
                    .col(ColumnDef::new(ParameterValue::StringValue).string())
                    .col(ColumnDef::new(ParameterValue::IntValue).integer())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_parameter_value_customer_id")
                    .table(ParameterValue::Table)
                    .col(ParameterValue::CustomerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_parameter_value_identifier_id")
                    .table(ParameterValue::Table)
                    .col(ParameterValue::IdentifierId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_parameter_value_mitigation_scope_id")
                    .table(ParameterValue::Table)
                    .col(ParameterValue::MitigationScopeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Prefix::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prefix::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prefix::CustomerId).integer())
                    .col(ColumnDef::new(Prefix::IdentifierId).big_integer())
                    .col(ColumnDef::new(Prefix::MitigationScopeId).big_integer())
                    .col(ColumnDef::new(Prefix::AccessControlListEntryId).big_integer())
                    .col(ColumnDef::new(Prefix::Type).string().not_null())
                    .col(ColumnDef::new(Prefix::Addr).string().not_null())
                    .col(ColumnDef::new(Prefix::PrefixLen).integer().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_prefix_customer_id")
                    .table(Prefix::Table)
                    .col(Prefix::CustomerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_prefix_identifier_id")
                    .table(Prefix::Table)
                    .col(Prefix::IdentifierId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_prefix_mitigation_scope_id")
                    .table(Prefix::Table)
                    .col(Prefix::MitigationScopeId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_prefix_access_control_list_entry_id")
                    .table(Prefix::Table)
                    .col(Prefix::AccessControlListEntryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PortRange::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PortRange::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PortRange::IdentifierId).big_integer())
                    .col(ColumnDef::new(PortRange::MitigationScopeId).big_integer())
                    .col(ColumnDef::new(PortRange::LowerPort).integer().not_null())
                    .col(ColumnDef::new(PortRange::UpperPort).integer().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_port_range_identifier_id")
                    .table(PortRange::Table)
                    .col(PortRange::IdentifierId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_port_range_mitigation_scope_id")
                    .table(PortRange::Table)
                    .col(PortRange::MitigationScopeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccessControlList::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessControlList::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccessControlList::CustomerId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccessControlList::Name).string().not_null())
                    .col(ColumnDef::new(AccessControlList::Type).string().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_access_control_list_customer_id")
                    .table(AccessControlList::Table)
                    .col(AccessControlList::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccessControlListEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessControlListEntry::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccessControlListEntry::AccessControlListId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessControlListEntry::RuleName)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_access_control_list_entry_list_id")
                    .table(AccessControlListEntry::Table)
                    .col(AccessControlListEntry::AccessControlListId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AclRuleAction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AclRuleAction::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AclRuleAction::AccessControlListEntryId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AclRuleAction::Type).string().not_null())
                    .col(ColumnDef::new(AclRuleAction::Action).string().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_acl_rule_action_entry_id")
                    .table(AclRuleAction::Table)
                    .col(AclRuleAction::AccessControlListEntryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AclRuleAction::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(AccessControlListEntry::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(AccessControlList::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(PortRange::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Prefix::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ParameterValue::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(SignalSessionConfiguration::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(MitigationScope::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Identifier::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(CustomerCommonName::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Customer::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
