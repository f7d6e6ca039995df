#[derive(Debug, Clone)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn new(username: String) -> Self {
        let now = super::now_timestamp();
        Self {
            id: None,
            username,
            is_deleted: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.username)
    }
}
