mod category;
mod expense;
mod payment_method;
mod reporting;
mod user;

pub use category::Category;
pub use expense::Expense;
pub use payment_method::PaymentMethod;
pub use reporting::{ChangedExpense, ExpenseRecord};
pub use user::User;

/// Current UTC instant in the canonical on-disk timestamp format.
/// Fixed-width, so lexicographic order matches chronological order.
pub fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
