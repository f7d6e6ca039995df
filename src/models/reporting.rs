use rust_decimal::Decimal;

/// A flattened expense row in the reporting store.
///
/// The id mirrors the source expense id (never autogenerated); names are
/// resolved at sync time. If a category or user is later renamed, rows
/// denormalized before the rename stay stale until their source expense
/// is touched again — an accepted trade for join-free reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub expense_id: i64,
    pub username: String,
    pub category_name: String,
    pub payment_method_name: String,
    pub amount: Decimal,
    pub expense_date: String,
    pub description: String,
    pub tag: String,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A changed source expense joined to its referenced names, as read by the
/// denormalizer. Names are `None` when the reference cannot be resolved.
#[derive(Debug, Clone)]
pub struct ChangedExpense {
    pub expense: super::Expense,
    pub username: Option<String>,
    pub category_name: Option<String>,
    pub payment_method_name: Option<String>,
}

impl ChangedExpense {
    /// The reporting record for this row, or the name of the first
    /// unresolvable reference.
    pub fn into_record(self) -> Result<ExpenseRecord, &'static str> {
        let e = self.expense;
        let Some(expense_id) = e.id else {
            return Err("expense id");
        };
        let Some(username) = self.username else {
            return Err("user");
        };
        let Some(category_name) = self.category_name else {
            return Err("category");
        };
        let Some(payment_method_name) = self.payment_method_name else {
            return Err("payment method");
        };
        Ok(ExpenseRecord {
            expense_id,
            username,
            category_name,
            payment_method_name,
            amount: e.amount,
            expense_date: e.expense_date,
            description: e.description,
            tag: e.tag,
            is_deleted: e.is_deleted,
            created_at: e.created_at,
            updated_at: e.updated_at,
        })
    }
}
