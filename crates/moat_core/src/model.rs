use chrono::NaiveDateTime;

use crate::{OrderedIntSet, OrderedStringSet, PortRange, Prefix};

/// Network identity a customer registers with the service: resolvable names
/// plus the address ranges mitigation targets must fall within.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomerNetworkInfo {
    pub fqdn: OrderedStringSet,
    pub uri: OrderedStringSet,
    pub e164: OrderedStringSet,
    pub address_ranges: Vec<Prefix>,
}

impl CustomerNetworkInfo {
    /// True iff the prefix lies inside one of the registered address ranges.
    pub fn covers(&self, prefix: &Prefix) -> bool {
        self.address_ranges.iter().any(|range| range.includes(prefix))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub common_names: OrderedStringSet,
    pub network_info: CustomerNetworkInfo,
}

/// A named set of traffic selectors a customer can reference from a
/// mitigation request. At most one identifier exists per customer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Identifier {
    pub customer_id: i32,
    pub alias_name: String,
    pub ip: Vec<Prefix>,
    pub prefix: Vec<Prefix>,
    pub port_ranges: Vec<PortRange>,
    pub fqdn: OrderedStringSet,
    pub uri: OrderedStringSet,
    pub e164: OrderedStringSet,
    pub traffic_protocol: OrderedIntSet,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(i32)]
pub enum MitigationStatus {
    #[default]
    InProgress = 1,
    SuccessfullyMitigated = 2,
    Stopped = 3,
    ExceedCapability = 4,
    ActiveButTerminating = 5,
    Terminated = 6,
    Withdrawn = 7,
    Triggered = 8,
}

impl MitigationStatus {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::InProgress),
            2 => Some(Self::SuccessfullyMitigated),
            3 => Some(Self::Stopped),
            4 => Some(Self::ExceedCapability),
            5 => Some(Self::ActiveButTerminating),
            6 => Some(Self::Terminated),
            7 => Some(Self::Withdrawn),
            8 => Some(Self::Triggered),
            _ => None,
        }
    }
}

/// One mitigation request's scope, keyed by `(customer_id, mitigation_id)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MitigationScope {
    pub customer_id: i32,
    pub mitigation_id: i32,
    pub lifetime: i32,
    pub status: MitigationStatus,
    pub fqdn: OrderedStringSet,
    pub uri: OrderedStringSet,
    pub e164: OrderedStringSet,
    pub alias: OrderedStringSet,
    pub target_protocol: OrderedIntSet,
    pub target_ip: Vec<Prefix>,
    pub target_prefix: Vec<Prefix>,
    pub target_port_ranges: Vec<PortRange>,
}

/// One access-list rule: a source/destination network match plus the
/// forwarding actions applied on a hit.
#[derive(Clone, Debug, PartialEq)]
pub struct Ace {
    pub rule_name: String,
    pub source_network: Prefix,
    pub destination_network: Prefix,
    pub deny_actions: Vec<String>,
    pub permit_actions: Vec<String>,
    pub rate_limit_actions: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccessControlList {
    pub customer_id: i32,
    pub acl_name: String,
    pub acl_type: String,
    pub entries: Vec<Ace>,
}

/// Signaling-session parameters negotiated per `(customer_id, session_id)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignalSessionConfiguration {
    pub customer_id: i32,
    pub session_id: i32,
    pub heartbeat_interval: i32,
    pub missing_hb_allowed: i32,
    pub max_retransmit: i32,
    pub ack_timeout: f64,
    pub ack_random_factor: f64,
    pub trigger_mitigation: bool,
}

/// A flow-accounting row produced by the external traffic meter; read-only
/// from this crate's perspective. `packets` keeps the meter's 32-bit column
/// width while `bytes` accumulates in 64 bits, so sustained high-volume flows
/// can wrap `packets` long before `bytes`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountingRecord {
    pub agent_id: i32,
    pub class_id: String,
    pub mac_src: String,
    pub mac_dst: String,
    pub vlan: i32,
    pub ip_src: String,
    pub ip_dst: String,
    pub src_port: i32,
    pub dst_port: i32,
    pub ip_proto: String,
    pub tos: i32,
    pub packets: i32,
    pub bytes: i64,
    pub flows: i32,
    pub inserted_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Sum packet and byte counters over a result set. No overflow checking:
/// packets accumulates in the column's own 32-bit width, bytes in 64 bits.
pub fn total_packets_and_bytes(records: &[AccountingRecord]) -> (i32, i64) {
    let mut packets: i32 = 0;
    let mut bytes: i64 = 0;
    for record in records {
        packets += record.packets;
        bytes += record.bytes;
    }
    (packets, bytes)
}

#[cfg(test)]
mod tests {
    use super::{total_packets_and_bytes, AccountingRecord, MitigationStatus};

    #[test]
    fn totals_sum_both_counters() {
        let records: Vec<AccountingRecord> = [(10, 100), (20, 300), (30, 500)]
            .into_iter()
            .map(|(packets, bytes)| AccountingRecord {
                packets,
                bytes,
                ..Default::default()
            })
            .collect();
        assert_eq!(total_packets_and_bytes(&records), (60, 900));
    }

    #[test]
    fn totals_over_empty_input_are_zero() {
        assert_eq!(total_packets_and_bytes(&[]), (0, 0));
    }

    #[test]
    fn mitigation_status_round_trips() {
        for status in [
            MitigationStatus::InProgress,
            MitigationStatus::Terminated,
            MitigationStatus::Triggered,
        ] {
            assert_eq!(MitigationStatus::from_i32(status.as_i32()), Some(status));
        }
        assert_eq!(MitigationStatus::from_i32(99), None);
    }
}
