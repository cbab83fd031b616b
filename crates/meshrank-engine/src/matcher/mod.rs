//! Connection policy selection.
//!
//! Picks, for every destination service of a proxy, the single most specific
//! connection policy:
//!
//! 1. Policies are sorted by name (stable), then filtered by their `sources`:
//!    a policy survives if any source selector matches the proxy, and keeps
//!    the rank of its best such selector.
//! 2. For each distinct destination service, every surviving policy's
//!    `destinations` are matched against `{service: <name>}`. The aggregate
//!    rank (destination rank combined with the policy's best source rank)
//!    decides the winner.
//!
//! In both phases the running best is only replaced by a strictly greater
//! rank, so ties go to the policy that sorts first by name.

use std::collections::{BTreeMap, BTreeSet};

use meshrank_core::dataplane::{Dataplane, Proxy, ServiceName};
use meshrank_core::policy::{sorted_by_name, ConnectionPolicy};
use meshrank_core::tags::{pick_highest, SelectorRank, TagSet};

/// Selected policy per destination service. A missing entry means no policy applies.
pub type ConnectionPolicyMap<'a, P> = BTreeMap<ServiceName, &'a P>;

/// A policy whose `sources` match the proxy.
struct SourceCandidate<'a, P: ?Sized> {
    policy: &'a P,
    best_source_rank: SelectorRank,
}

/// Selection over the outbound interfaces of `dataplane`.
pub fn select_outbound_connection_policies<'a, P, I>(
    dataplane: &Dataplane,
    policies: I,
) -> ConnectionPolicyMap<'a, P>
where
    P: ConnectionPolicy + ?Sized + 'a,
    I: IntoIterator<Item = &'a P>,
{
    select_connection_policies(dataplane, dataplane.outbound_services(), policies)
}

/// Selects a single most specific policy for each service in `destinations`.
///
/// `destinations` is drained once; repeated service names are resolved on
/// first occurrence only.
pub fn select_connection_policies<'a, D, S, P, I>(
    proxy: &D,
    destinations: impl IntoIterator<Item = S>,
    policies: I,
) -> ConnectionPolicyMap<'a, P>
where
    D: Proxy + ?Sized,
    S: AsRef<str>,
    P: ConnectionPolicy + ?Sized + 'a,
    I: IntoIterator<Item = &'a P>,
{
    let candidates = candidates_by_source(proxy, policies);
    tracing::debug!(candidates = candidates.len(), "source candidates selected");

    let mut seen = BTreeSet::new();
    let mut selected = ConnectionPolicyMap::new();
    for service in destinations {
        let service = service.as_ref();
        if !seen.insert(service.to_owned()) {
            // several outbound interfaces towards the same service
            continue;
        }
        match best_for_destination(&candidates, service) {
            Some((candidate, rank)) => {
                tracing::trace!(
                    service,
                    policy = candidate.policy.name(),
                    exact = rank.exact_matches(),
                    wildcard = rank.wildcard_matches(),
                    "policy selected"
                );
                selected.insert(service.to_owned(), candidate.policy);
            }
            None => tracing::trace!(service, "no policy matches"),
        }
    }
    selected
}

fn candidates_by_source<'a, D, P, I>(proxy: &D, policies: I) -> Vec<SourceCandidate<'a, P>>
where
    D: Proxy + ?Sized,
    P: ConnectionPolicy + ?Sized + 'a,
    I: IntoIterator<Item = &'a P>,
{
    sorted_by_name(policies)
        .into_iter()
        .filter_map(|policy| {
            let best = pick_highest(
                policy
                    .sources()
                    .iter()
                    .filter(|source| proxy.matches(&source.matcher))
                    .map(|source| (source, source.matcher.rank())),
            );
            best.map(|(_, best_source_rank)| SourceCandidate {
                policy,
                best_source_rank,
            })
        })
        .collect()
}

fn best_for_destination<'c, 'a, P>(
    candidates: &'c [SourceCandidate<'a, P>],
    service: &str,
) -> Option<(&'c SourceCandidate<'a, P>, SelectorRank)>
where
    P: ConnectionPolicy + ?Sized,
{
    let outbound = TagSet::for_service(service);
    let outbound = &outbound;
    pick_highest(candidates.iter().flat_map(move |candidate| {
        candidate
            .policy
            .destinations()
            .iter()
            .filter_map(move |destination| {
                destination
                    .matcher
                    .matched_rank(outbound)
                    .map(|rank| (candidate, rank.combined_with(candidate.best_source_rank)))
            })
    }))
}
