use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::ExpenseRecord;

/// The report catalog. Each variant carries its own parameters; everything
/// else comes from the current reporting-store snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Report {
    TopExpenses {
        limit: u32,
        from: NaiveDate,
        to: NaiveDate,
    },
    CategorySpending {
        category: String,
    },
    AboveAverageExpenses,
    MonthlyCategorySpending,
    HighestSpenderPerMonth,
    FrequentCategory,
    PaymentMethodUsage,
    TagExpenses,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthlyCategoryRow {
    pub month: String,
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthlySpenderRow {
    pub month: String,
    pub username: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryCountRow {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MethodUsageRow {
    pub method: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TagCountRow {
    pub tag: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ReportOutput {
    TopExpenses(Vec<ExpenseRecord>),
    CategorySpending { category: String, total: Decimal },
    AboveAverageExpenses(Vec<ExpenseRecord>),
    MonthlyCategorySpending(Vec<MonthlyCategoryRow>),
    HighestSpenderPerMonth(Vec<MonthlySpenderRow>),
    FrequentCategory(Vec<CategoryCountRow>),
    PaymentMethodUsage(Vec<MethodUsageRow>),
    TagExpenses(Vec<TagCountRow>),
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .map_err(|_| Error::InvalidParameter(format!("invalid date '{s}', expected YYYY-MM-DD")))
}

/// Runs one report against the current reporting-store snapshot. Read-only;
/// parameters are validated before any query executes, so a rejected report
/// produces no partial result.
pub(crate) fn run_report(db: &Database, report: &Report) -> Result<ReportOutput> {
    match report {
        Report::TopExpenses { limit, from, to } => {
            if *limit < 1 {
                return Err(Error::InvalidParameter("limit must be at least 1".into()));
            }
            if from > to {
                return Err(Error::InvalidParameter(format!(
                    "date range start {from} is after end {to}"
                )));
            }
            let rows = db.report_top_expenses(
                *limit,
                &from.format("%Y-%m-%d").to_string(),
                &to.format("%Y-%m-%d").to_string(),
            )?;
            Ok(ReportOutput::TopExpenses(rows))
        }
        Report::CategorySpending { category } => {
            // Category existence is checked against the normalized table;
            // the reporting store only knows names that have been synced.
            if db.get_category_by_name(category)?.is_none() {
                return Err(Error::UnknownCategory(category.clone()));
            }
            let total = db.report_category_spending(category)?;
            Ok(ReportOutput::CategorySpending {
                category: category.clone(),
                total,
            })
        }
        Report::AboveAverageExpenses => {
            let rows = db.report_above_average_expenses()?;
            Ok(ReportOutput::AboveAverageExpenses(rows))
        }
        Report::MonthlyCategorySpending => {
            let rows = db
                .report_monthly_category_spending()?
                .into_iter()
                .map(|(month, category, total)| MonthlyCategoryRow {
                    month,
                    category,
                    total,
                })
                .collect();
            Ok(ReportOutput::MonthlyCategorySpending(rows))
        }
        Report::HighestSpenderPerMonth => {
            // Rows arrive ordered (month, total desc, username asc), so the
            // first row of each month is its winner.
            let mut winners: Vec<MonthlySpenderRow> = Vec::new();
            for (month, username, total) in db.report_monthly_user_totals()? {
                if winners.last().map(|w| w.month.as_str()) != Some(month.as_str()) {
                    winners.push(MonthlySpenderRow {
                        month,
                        username,
                        total,
                    });
                }
            }
            Ok(ReportOutput::HighestSpenderPerMonth(winners))
        }
        Report::FrequentCategory => {
            let rows = db
                .report_frequent_category()?
                .into_iter()
                .map(|(category, count)| CategoryCountRow { category, count })
                .collect();
            Ok(ReportOutput::FrequentCategory(rows))
        }
        Report::PaymentMethodUsage => {
            let rows = db
                .report_payment_method_usage()?
                .into_iter()
                .map(|(method, total)| MethodUsageRow { method, total })
                .collect();
            Ok(ReportOutput::PaymentMethodUsage(rows))
        }
        Report::TagExpenses => {
            let rows = db
                .report_tag_expenses()?
                .into_iter()
                .map(|(tag, count)| TagCountRow { tag, count })
                .collect();
            Ok(ReportOutput::TagExpenses(rows))
        }
    }
}
