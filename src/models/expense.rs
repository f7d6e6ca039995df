use rust_decimal::Decimal;

/// A normalized expense row. References its user, category, and payment
/// method by id; names are resolved only when the row is denormalized
/// into the reporting store.
#[derive(Debug, Clone)]
pub struct Expense {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category_id: i64,
    pub payment_method_id: i64,
    pub amount: Decimal,
    pub expense_date: String,
    pub description: String,
    pub tag: String,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Expense {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: i64,
        category_id: i64,
        payment_method_id: i64,
        amount: Decimal,
        expense_date: String,
        description: String,
        tag: String,
    ) -> Self {
        let now = super::now_timestamp();
        Self {
            id: None,
            user_id,
            category_id,
            payment_method_id,
            amount,
            expense_date,
            description,
            tag,
            is_deleted: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
