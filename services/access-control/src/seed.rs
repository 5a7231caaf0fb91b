//! Startup seeding of providers, collections, groups and ACLs.
//!
//! Seeds bypass validation and authorization: they exist to grant the first
//! administrators the permissions every later request is checked against.
use crate::config::SeedData;
use crate::store::AccessControlStore;
use anyhow::Context;

pub async fn apply_seed(store: &dyn AccessControlStore, seed: &SeedData) -> anyhow::Result<()> {
    for provider_id in &seed.providers {
        store
            .add_provider(provider_id)
            .await
            .with_context(|| format!("seed provider {provider_id}"))?;
    }
    for (provider_id, entry_titles) in &seed.collections {
        for entry_title in entry_titles {
            store
                .add_collection(provider_id, entry_title)
                .await
                .with_context(|| format!("seed collection {provider_id}/{entry_title}"))?;
        }
    }
    for group in &seed.groups {
        let created = store
            .create_group(group.clone())
            .await
            .with_context(|| format!("seed group {}", group.name))?;
        tracing::info!(concept_id = %created.concept_id, name = %group.name, "seeded group");
    }
    for acl in &seed.acls {
        let created = store
            .create_acl(acl.clone())
            .await
            .with_context(|| format!("seed acl {}", acl.identity.uniqueness_key()))?;
        tracing::info!(concept_id = %created.concept_id, "seeded acl");
    }
    Ok(())
}
