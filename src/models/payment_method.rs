#[derive(Debug, Clone)]
pub struct PaymentMethod {
    pub id: Option<i64>,
    pub name: String,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl PaymentMethod {
    pub fn new(name: String) -> Self {
        let now = super::now_timestamp();
        Self {
            id: None,
            name,
            is_deleted: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
