//! Category hierarchy: tree building, path resolution and reparenting rules over a flat
//! snapshot of categories supplied by the persistence layer.

pub mod seed;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::category::{Category, CategoryId};
use crate::errors::DomainError;

pub use seed::{seed_categories, CategorySeed, CATEGORY_SEEDS};

pub const PATH_SEPARATOR: &str = " > ";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub name: String,
    pub sort_order: i32,
    pub depth: usize,
    pub path: String,
    pub children: Vec<CategoryNode>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category_id: CategoryId,
    pub name: String,
    pub path: String,
    pub item_count: u64,
}

#[derive(Clone, Debug, Default)]
pub struct CategoryHierarchy {
    categories: HashMap<CategoryId, Category>,
}

impl CategoryHierarchy {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            categories: categories
                .into_iter()
                .map(|category| (category.id.clone(), category))
                .collect(),
        }
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    pub fn name_of(&self, id: &CategoryId) -> Option<&str> {
        self.categories.get(id).map(|category| category.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Builds the forest of active categories. Roots are categories without a parent; a
    /// category whose parent is not in the active set is dropped with a warning.
    pub fn build_tree(&self) -> Vec<CategoryNode> {
        let mut roots: Vec<&Category> = Vec::new();
        let mut children: HashMap<&CategoryId, Vec<&Category>> = HashMap::new();

        for category in self.categories.values().filter(|category| category.is_active) {
            match &category.parent_id {
                None => roots.push(category),
                Some(parent_id) if self.is_active(parent_id) => {
                    children.entry(parent_id).or_default().push(category);
                }
                Some(parent_id) => {
                    warn!(
                        event_name = "catalog.category.orphan_dropped",
                        category_id = %category.id.0,
                        parent_id = %parent_id.0,
                        "category references a missing parent and was left out of the tree"
                    );
                }
            }
        }

        sort_siblings(&mut roots);
        roots.into_iter().map(|root| build_node(root, &children, "", 0)).collect()
    }

    /// Resolves `root > ... > name` for a category. The upward walk stops at the first
    /// repeated id, so a corrupted parent cycle yields a partial path instead of looping.
    pub fn resolve_path(&self, id: &CategoryId) -> Option<String> {
        let start = self.categories.get(id)?;
        let mut names = vec![start.name.as_str()];
        let mut visited = HashSet::from([&start.id]);
        let mut cursor = start.parent_id.as_ref();

        while let Some(parent_id) = cursor {
            if !visited.insert(parent_id) {
                warn!(
                    event_name = "catalog.category.cycle_detected",
                    category_id = %id.0,
                    repeated_id = %parent_id.0,
                    "category parent chain contains a cycle; returning partial path"
                );
                break;
            }
            let Some(parent) = self.categories.get(parent_id) else {
                break;
            };
            names.push(parent.name.as_str());
            cursor = parent.parent_id.as_ref();
        }

        names.reverse();
        Some(names.join(PATH_SEPARATOR))
    }

    pub fn active_children(&self, id: &CategoryId) -> Vec<&Category> {
        let mut children: Vec<&Category> = self
            .categories
            .values()
            .filter(|category| category.is_active && category.parent_id.as_ref() == Some(id))
            .collect();
        sort_siblings(&mut children);
        children
    }

    /// A category can be removed only when no active child and no active item refers to it.
    pub fn can_delete(&self, id: &CategoryId, active_item_count: u64) -> bool {
        active_item_count == 0 && self.active_children(id).is_empty()
    }

    /// Returns true when `candidate` sits somewhere below `ancestor`.
    pub fn is_descendant(&self, candidate: &CategoryId, ancestor: &CategoryId) -> bool {
        let mut visited = HashSet::new();
        let mut cursor = self.categories.get(candidate).and_then(|c| c.parent_id.as_ref());

        while let Some(parent_id) = cursor {
            if parent_id == ancestor {
                return true;
            }
            if !visited.insert(parent_id) {
                return false;
            }
            cursor = self.categories.get(parent_id).and_then(|c| c.parent_id.as_ref());
        }
        false
    }

    /// Checks that `parent_id` can hold a new child.
    pub fn validate_parent(&self, parent_id: Option<&CategoryId>) -> Result<(), DomainError> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        if self.is_active(parent_id) {
            Ok(())
        } else {
            Err(DomainError::InvalidInput(format!(
                "parent category `{}` does not exist or is inactive",
                parent_id.0
            )))
        }
    }

    /// Reparents a category, rejecting any move that would make it its own ancestor.
    pub fn move_category(
        &mut self,
        id: &CategoryId,
        new_parent_id: Option<CategoryId>,
        now: DateTime<Utc>,
    ) -> Result<Category, DomainError> {
        if !self.categories.contains_key(id) {
            return Err(DomainError::not_found("category", id.0.clone()));
        }

        if let Some(parent_id) = &new_parent_id {
            if parent_id == id {
                return Err(DomainError::InvalidInput(format!(
                    "category `{}` cannot be its own parent",
                    id.0
                )));
            }
            self.validate_parent(Some(parent_id))?;
            if self.is_descendant(parent_id, id) || self.has_cycle_above(parent_id) {
                return Err(DomainError::InvalidInput(format!(
                    "moving `{}` under `{}` would create a cycle",
                    id.0, parent_id.0
                )));
            }
        }

        let category = self
            .categories
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("category", id.0.clone()))?;
        category.parent_id = new_parent_id;
        category.updated_at = now;
        Ok(category.clone())
    }

    /// Soft-deletes a category after `can_delete` passes.
    pub fn deactivate(
        &mut self,
        id: &CategoryId,
        active_item_count: u64,
        now: DateTime<Utc>,
    ) -> Result<Category, DomainError> {
        if !self.categories.contains_key(id) {
            return Err(DomainError::not_found("category", id.0.clone()));
        }
        if !self.active_children(id).is_empty() {
            return Err(DomainError::InvalidOperation(format!(
                "category `{}` still has active child categories",
                id.0
            )));
        }
        if active_item_count > 0 {
            return Err(DomainError::InvalidOperation(format!(
                "category `{}` is still used by {active_item_count} clothing item(s)",
                id.0
            )));
        }

        let category = self
            .categories
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("category", id.0.clone()))?;
        category.is_active = false;
        category.updated_at = now;
        Ok(category.clone())
    }

    /// Active item counts per category, listed depth-first in tree order.
    pub fn stats(&self, item_counts: &HashMap<CategoryId, u64>) -> Vec<CategoryStat> {
        let mut stats = Vec::new();
        for root in self.build_tree() {
            collect_stats(&root, item_counts, &mut stats);
        }
        stats
    }

    fn is_active(&self, id: &CategoryId) -> bool {
        self.categories.get(id).is_some_and(|category| category.is_active)
    }

    fn has_cycle_above(&self, id: &CategoryId) -> bool {
        let mut visited = HashSet::from([id]);
        let mut cursor = self.categories.get(id).and_then(|c| c.parent_id.as_ref());
        while let Some(parent_id) = cursor {
            if !visited.insert(parent_id) {
                return true;
            }
            cursor = self.categories.get(parent_id).and_then(|c| c.parent_id.as_ref());
        }
        false
    }
}

fn sort_siblings(categories: &mut [&Category]) {
    categories.sort_by(|left, right| left.sibling_key().cmp(&right.sibling_key()));
}

fn build_node(
    category: &Category,
    children: &HashMap<&CategoryId, Vec<&Category>>,
    parent_path: &str,
    depth: usize,
) -> CategoryNode {
    let path = if parent_path.is_empty() {
        category.name.clone()
    } else {
        format!("{parent_path}{PATH_SEPARATOR}{}", category.name)
    };

    let mut direct: Vec<&Category> = children.get(&category.id).cloned().unwrap_or_default();
    sort_siblings(&mut direct);

    let nodes =
        direct.into_iter().map(|child| build_node(child, children, &path, depth + 1)).collect();

    CategoryNode {
        id: category.id.clone(),
        name: category.name.clone(),
        sort_order: category.sort_order,
        depth,
        path,
        children: nodes,
    }
}

fn collect_stats(
    node: &CategoryNode,
    item_counts: &HashMap<CategoryId, u64>,
    out: &mut Vec<CategoryStat>,
) {
    out.push(CategoryStat {
        category_id: node.id.clone(),
        name: node.name.clone(),
        path: node.path.clone(),
        item_count: item_counts.get(&node.id).copied().unwrap_or(0),
    });
    for child in &node.children {
        collect_stats(child, item_counts, out);
    }
}
