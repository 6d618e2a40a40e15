//! Existence heuristics: does a logically equivalent remote object already
//! exist?

use crate::remote::{PatchConfigRecord, TicketRecord};

/// Terminal status label of a fully executed patch configuration.
pub const EXECUTED_STATUS_LABEL: &str = "dc.db.config.status.executed";

/// Conservative dedup heuristic for patch configurations.
///
/// A remote config counts as "the desired one" when its name starts with the
/// desired name, it is not soft-deleted, its target count equals the
/// requested host count, and it has not already executed. Host-set identity
/// is deliberately not checked — same name prefix and same host *count* is
/// treated as already satisfied even when the actual hosts differ.
pub fn patch_config_exists(
    configs: &[PatchConfigRecord],
    name: &str,
    host_count: usize,
) -> bool {
    configs.iter().any(|config| {
        config.collection_name.starts_with(name)
            && !config.is_collection_deleted
            && config.total_target_count == host_count as i64
            && config.status_label != EXECUTED_STATUS_LABEL
    })
}

/// Find an open ticket equivalent to the desired one.
///
/// The subject must start with the desired name and the free-text short
/// description must contain every requested host and patch-type label as a
/// substring. First match wins; ties are not disambiguated.
pub fn find_ticket<'a>(
    tickets: &'a [TicketRecord],
    name: &str,
    hosts: &[String],
    patch_types: &[String],
) -> Option<&'a TicketRecord> {
    tickets.iter().find(|ticket| {
        ticket.subject.starts_with(name)
            && ticket.status.name == "Open"
            && hosts.iter().all(|h| ticket.short_description.contains(h))
            && patch_types
                .iter()
                .all(|t| ticket.short_description.contains(t))
    })
}
