use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
        parent_id: Option<CategoryId>,
        sort_order: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            description: None,
            parent_id,
            sort_order,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Sibling ordering key: `sort_order` first, then name, then id so equal names stay stable.
    pub fn sibling_key(&self) -> (i32, &str, &CategoryId) {
        (self.sort_order, self.name.as_str(), &self.id)
    }
}
