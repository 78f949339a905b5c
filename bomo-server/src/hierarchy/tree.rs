//! Forest assembly

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use shared::models::{Tag, TagNode};

/// Note count per tag id; missing ids count as zero
pub type NoteCounts = HashMap<i64, i64>;

/// Sibling order: case-insensitive name, then exact name
pub(crate) fn name_order(a: &Tag, b: &Tag) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Nest a flat tag list into a forest
///
/// Tags whose parent is absent from the list become roots. Every input tag
/// appears exactly once in the output; should the list contain a parent
/// loop, the loop is cut at its alphabetically first member.
pub fn assemble_tree(flat: &[Tag], notes: &NoteCounts) -> Vec<TagNode> {
    let ids: HashSet<i64> = flat.iter().map(|t| t.id).collect();
    let mut kids: HashMap<i64, Vec<&Tag>> = HashMap::new();
    let mut roots: Vec<&Tag> = Vec::new();
    for tag in flat {
        match tag.parent_id {
            Some(parent_id) if ids.contains(&parent_id) && parent_id != tag.id => {
                kids.entry(parent_id).or_default().push(tag)
            }
            _ => roots.push(tag),
        }
    }
    for siblings in kids.values_mut() {
        siblings.sort_by(|a, b| name_order(a, b));
    }
    roots.sort_by(|a, b| name_order(a, b));

    let mut builder = Builder {
        kids: &kids,
        notes,
        placed: HashSet::with_capacity(flat.len()),
    };
    let mut forest: Vec<TagNode> = roots.iter().filter_map(|t| builder.node(t)).collect();

    if builder.placed.len() < ids.len() {
        let mut stranded: Vec<&Tag> = flat
            .iter()
            .filter(|t| !builder.placed.contains(&t.id))
            .collect();
        stranded.sort_by(|a, b| name_order(a, b));
        for tag in stranded {
            if let Some(node) = builder.node(tag) {
                forest.push(node);
            }
        }
    }
    forest
}

struct Builder<'a> {
    kids: &'a HashMap<i64, Vec<&'a Tag>>,
    notes: &'a NoteCounts,
    placed: HashSet<i64>,
}

impl Builder<'_> {
    fn node(&mut self, tag: &Tag) -> Option<TagNode> {
        if !self.placed.insert(tag.id) {
            return None;
        }
        let kids = self.kids;
        let children: Vec<TagNode> = kids
            .get(&tag.id)
            .into_iter()
            .flatten()
            .filter_map(|child| self.node(child))
            .collect();
        Some(TagNode {
            tag: tag.clone(),
            note_count: self.notes.get(&tag.id).copied().unwrap_or(0),
            child_count: children.len() as i64,
            children,
        })
    }
}
