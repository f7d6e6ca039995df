#[derive(Debug, Clone)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub user_id: i64,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Category {
    pub fn new(name: String, user_id: i64) -> Self {
        let now = super::now_timestamp();
        Self {
            id: None,
            name,
            user_id,
            is_deleted: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
