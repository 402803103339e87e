use crate::models::LikeTally;
use anyhow::{anyhow, Result};

/// Checks a subject tag before it becomes part of a cache key.
pub fn validate_subject_tag(tag: &str) -> Result<()> {
    if tag.trim().is_empty() {
        return Err(anyhow!("Subject tag cannot be empty"));
    }

    if tag.len() > 100 {
        return Err(anyhow!("Subject tag too long (max 100 characters)"));
    }

    // '/' would split the id into a sub-collection path in the document store
    if tag.contains('/') {
        return Err(anyhow!("Subject tag cannot contain '/'"));
    }

    Ok(())
}

pub fn validate_category(category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(anyhow!("Category name cannot be empty"));
    }

    if category.len() > 100 {
        return Err(anyhow!("Category name too long (max 100 characters)"));
    }

    if category.contains('/') {
        return Err(anyhow!("Category name cannot contain '/'"));
    }

    Ok(())
}

pub fn validate_poll_item_id(item_id: &str) -> Result<()> {
    if !LikeTally::ITEM_IDS.contains(&item_id) {
        return Err(anyhow!(
            "Unknown poll item '{}' (expected one of {})",
            item_id,
            LikeTally::ITEM_IDS.join(", ")
        ));
    }
    Ok(())
}
