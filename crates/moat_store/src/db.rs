use sea_orm::sea_query;
use sea_orm_migration::prelude::Iden;

#[derive(Iden, Clone, Copy)]
pub enum Customer {
    Table,
    Id,
    Name,
}

#[derive(Iden, Clone, Copy)]
pub enum CustomerCommonName {
    Table,
    Id,
    CustomerId,
    CommonName,
}

#[derive(Iden, Clone, Copy)]
pub enum Identifier {
    Table,
    Id,
    CustomerId,
    AliasName,
}

#[derive(Iden, Clone, Copy)]
pub enum MitigationScope {
    Table,
    Id,
    CustomerId,
    MitigationId,
    Lifetime,
    Status,
}

#[derive(Iden, Clone, Copy)]
pub enum SignalSessionConfiguration {
    Table,
    Id,
    CustomerId,
    SessionId,
    HeartbeatInterval,
    MissingHbAllowed,
    MaxRetransmit,
    AckTimeout,
    AckRandomFactor,
    TriggerMitigation,
}

#[derive(Iden, Clone, Copy)]
pub enum ParameterValue {
    Table,
    Id,
    CustomerId,
    IdentifierId,
    MitigationScopeId,
    Type,
    StringValue,
    IntValue,
}

#[derive(Iden, Clone, Copy)]
pub enum Prefix {
    Table,
    Id,
    CustomerId,
    IdentifierId,
    MitigationScopeId,
    AccessControlListEntryId,
    Type,
    Addr,
    PrefixLen,
}

#[derive(Iden, Clone, Copy)]
pub enum PortRange {
    Table,
    Id,
    IdentifierId,
    MitigationScopeId,
    LowerPort,
    UpperPort,
}

#[derive(Iden, Clone, Copy)]
pub enum AccessControlList {
    Table,
    Id,
    CustomerId,
    Name,
    Type,
}

#[derive(Iden, Clone, Copy)]
pub enum AccessControlListEntry {
    Table,
    Id,
    AccessControlListId,
    RuleName,
}

#[derive(Iden, Clone, Copy)]
pub enum AclRuleAction {
    Table,
    Id,
    AccessControlListEntryId,
    Type,
    Action,
}

#[derive(Iden, Clone, Copy)]
pub enum AcctV5 {
    Table,
    AgentId,
    ClassId,
    MacSrc,
    MacDst,
    Vlan,
    IpSrc,
    IpDst,
    SrcPort,
    DstPort,
    IpProto,
    Tos,
    Packets,
    Bytes,
    Flows,
    StampInserted,
    StampUpdated,
}
