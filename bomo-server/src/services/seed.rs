//! Demo data
//!
//! Populates an empty database with a starter tag set.

use shared::models::TagCreate;

use super::error::TagResult;
use super::tag_service::TagService;

const ROOT_TAGS: &[(&str, &str)] = &[
    ("读书笔记", "#2563eb"),
    ("个人成长", "#059669"),
    ("技术", "#7c3aed"),
    ("思考", "#d97706"),
    ("日记", "#db2777"),
];

const TECH_ROOT: &str = "技术";

const TECH_TAGS: &[(&str, &str)] = &[
    ("JavaScript", "#f59e0b"),
    ("React", "#06b6d4"),
    ("Next.js", "#000000"),
];

/// Insert the demo tags unless any tag already exists; returns how many were created
pub async fn seed_demo_tags(tags: &TagService) -> TagResult<usize> {
    if !tags.is_empty().await? {
        tracing::debug!("Tags present, skipping demo data");
        return Ok(0);
    }

    let roots = tags
        .create_batch(
            ROOT_TAGS
                .iter()
                .map(|(name, color)| TagCreate::new(*name).with_color(*color))
                .collect(),
        )
        .await?;

    let mut created = roots.len();
    if let Some(tech) = roots.iter().find(|d| d.tag.name == TECH_ROOT) {
        let children = tags
            .create_batch(
                TECH_TAGS
                    .iter()
                    .map(|(name, color)| TagCreate::new(*name).under(tech.tag.id).with_color(*color))
                    .collect(),
            )
            .await?;
        created += children.len();
    }

    tracing::info!(created, "Seeded demo tags");
    Ok(created)
}
