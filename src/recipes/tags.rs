use crate::config::UnknownTags;
use crate::error::{RecipeError, Result};
use crate::model::TagId;
use crate::store::StoreTransaction;
use log::warn;

/// Resolve requested tag ids against the tag table.
///
/// With [`UnknownTags::Reject`] a missing id fails the write. With
/// [`UnknownTags::CreatePlaceholder`] an empty tag is inserted under that id.
pub(crate) async fn resolve_tags(
    tx: &mut dyn StoreTransaction,
    ids: &[TagId],
    policy: UnknownTags,
) -> Result<Vec<TagId>> {
    let mut resolved = Vec::with_capacity(ids.len());
    for &id in ids {
        if tx.find_tag(id).await?.is_none() {
            match policy {
                UnknownTags::Reject => return Err(RecipeError::not_found("Tag", id)),
                UnknownTags::CreatePlaceholder => {
                    warn!("Creating placeholder tag for unknown id {}", id);
                    tx.insert_placeholder_tag(id).await?;
                }
            }
        }
        resolved.push(id);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTag;
    use crate::store::{MemoryStore, Store};

    #[tokio::test]
    async fn test_reject_unknown_tag() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let result = resolve_tags(tx.as_mut(), &[TagId(3)], UnknownTags::Reject).await;
        assert!(matches!(
            result,
            Err(RecipeError::NotFound { entity: "Tag", id: 3 })
        ));
    }

    #[tokio::test]
    async fn test_placeholder_created_once() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let ids = resolve_tags(
            tx.as_mut(),
            &[TagId(3), TagId(3)],
            UnknownTags::CreatePlaceholder,
        )
        .await
        .unwrap();

        assert_eq!(ids, vec![TagId(3), TagId(3)]);
        assert_eq!(tx.list_tags().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_existing_tags_pass_through() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let tag = tx
            .insert_tag(NewTag {
                name: "Dinner".to_string(),
                color: "#8775D2".to_string(),
                slug: "dinner".to_string(),
            })
            .await
            .unwrap();

        let ids = resolve_tags(tx.as_mut(), &[tag.id], UnknownTags::Reject)
            .await
            .unwrap();
        assert_eq!(ids, vec![tag.id]);
    }
}
