//! Caller identity and security identifiers.
use crate::errors::LookupResult;
use crate::lookups::{CatalogLookups, GroupSearchCriteria, RequestContext};
use tracing::debug;

pub const GUEST: &str = "guest";
pub const REGISTERED: &str = "registered";

/// User acting on the request; anonymous callers are `guest`.
pub async fn current_user(
    lookups: &dyn CatalogLookups,
    context: &RequestContext,
) -> LookupResult<String> {
    match &context.token {
        Some(token) => lookups.resolve_user(token).await,
        None => Ok(GUEST.to_string()),
    }
}

/// Security identifiers held by `user`.
///
/// The pseudo users `guest` and `registered` hold only themselves. Any other
/// user is registered and additionally holds the concept id of every group it
/// belongs to. Membership is confirmed from the members of each search hit.
pub async fn security_identifiers(
    lookups: &dyn CatalogLookups,
    user: &str,
) -> LookupResult<Vec<String>> {
    if user == GUEST || user == REGISTERED {
        return Ok(vec![user.to_string()]);
    }
    let groups = lookups
        .search_groups(&GroupSearchCriteria::with_member(user))
        .await?;
    let mut sids = Vec::with_capacity(groups.len() + 1);
    sids.push(REGISTERED.to_string());
    sids.extend(
        groups
            .into_iter()
            .filter(|group| group.members.iter().any(|member| member == user))
            .map(|group| group.concept_id),
    );
    debug!(user, sids = ?sids, "resolved security identifiers");
    Ok(sids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLookups;

    #[tokio::test]
    async fn anonymous_caller_is_guest() {
        let lookups = FakeLookups::new();
        let user = current_user(&lookups, &RequestContext::anonymous())
            .await
            .expect("user");
        assert_eq!(user, GUEST);
    }

    #[tokio::test]
    async fn token_resolves_through_lookups() {
        let lookups = FakeLookups::new().with_token("tok-1", "alice");
        let user = current_user(&lookups, &RequestContext::with_token("tok-1"))
            .await
            .expect("user");
        assert_eq!(user, "alice");

        let unknown = current_user(&lookups, &RequestContext::with_token("tok-2")).await;
        assert!(unknown.is_err());
    }

    #[tokio::test]
    async fn pseudo_users_hold_only_themselves() {
        let lookups = FakeLookups::new().with_group("AG1-CMR", None, &["guest", "registered"]);
        for user in [GUEST, REGISTERED] {
            let sids = security_identifiers(&lookups, user).await.expect("sids");
            assert_eq!(sids, vec![user.to_string()]);
        }
    }

    #[tokio::test]
    async fn named_users_are_registered_plus_groups() {
        let lookups = FakeLookups::new()
            .with_group("AG1-CMR", None, &["alice", "bob"])
            .with_group("AG2-CMR", Some("PROV1"), &["alice"])
            .with_group("AG3-CMR", Some("PROV1"), &["bob"]);

        let sids = security_identifiers(&lookups, "alice").await.expect("sids");
        assert_eq!(sids, vec!["registered", "AG1-CMR", "AG2-CMR"]);

        let sids = security_identifiers(&lookups, "carol").await.expect("sids");
        assert_eq!(sids, vec!["registered"]);
    }

    #[tokio::test]
    async fn search_hits_without_the_user_grant_nothing() {
        let lookups = FakeLookups::new()
            .loose_group_search()
            .with_group("AG1-CMR", None, &["alice"])
            .with_group("AG2-CMR", Some("PROV1"), &["bob"]);

        let sids = security_identifiers(&lookups, "alice").await.expect("sids");
        assert_eq!(sids, vec!["registered", "AG1-CMR"]);
    }

    #[tokio::test]
    async fn group_search_failures_propagate() {
        let lookups = FakeLookups::new().unavailable();
        assert!(security_identifiers(&lookups, "alice").await.is_err());
    }
}
