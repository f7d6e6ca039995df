use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::db::Database;
use crate::error::Error;
use crate::models::{Category, Expense, PaymentMethod, User};
use crate::reports::{self, Report, ReportOutput};
use crate::sync::{self, DeletePolicy, SyncOptions};

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    match args[1].as_str() {
        "user" => cli_user(&args[2..], db),
        "category" => cli_category(&args[2..], db),
        "method" => cli_method(&args[2..], db),
        "expense" => cli_expense(&args[2..], db),
        "sync" => cli_sync(&args[2..], db),
        "report" => cli_report(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("spendbook {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("spendbook — shared expense tracker with denormalized reporting");
    println!();
    println!("Usage: spendbook <command>");
    println!();
    println!("Commands:");
    println!("  user add <name>               Register a user");
    println!("  user list                     List users");
    println!("  category add <name> --user <username>");
    println!("  category list                 List categories");
    println!("  category rename <old> <new>   Rename a category");
    println!("  category delete <name>        Soft-delete a category");
    println!("  method add <name>             Add a payment method");
    println!("  method list                   List payment methods");
    println!("  expense add --user <u> --category <c> --method <m>");
    println!("              --amount <n> --tag <t> [--date YYYY-MM-DD] [--desc text]");
    println!("  expense list [--all]          List expenses (--all includes deleted)");
    println!("  expense tag <id> <tag>        Re-tag an expense");
    println!("  expense delete <id>           Soft-delete an expense");
    println!("  sync [--keep-deleted]         Refresh the reporting store");
    println!("  report <name> [args]          Run a report:");
    println!("    top <n> <from> <to>         Top N expenses in a date range");
    println!("    category <name>             Total spending for a category");
    println!("    above-average               Expenses above their category mean");
    println!("    monthly-category            Spending by month and category");
    println!("    highest-spender             Top spender per month");
    println!("    frequent-category           Categories by usage count");
    println!("    payment-methods             Spending by payment method");
    println!("    tags                        Expense counts by tag");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

// ── Admin commands ───────────────────────────────────────────

fn cli_user(args: &[String], db: &mut Database) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => {
            let name = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("Usage: spendbook user add <name>"))?;
            db.insert_user(&User::new(name.clone()))?;
            println!("User '{name}' added");
            Ok(())
        }
        Some("list") => {
            for user in db.get_users()? {
                println!("{:<4} {}", user.id.unwrap_or(0), user.username);
            }
            Ok(())
        }
        _ => anyhow::bail!("Usage: spendbook user <add|list>"),
    }
}

fn cli_category(args: &[String], db: &mut Database) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => {
            let name = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("Usage: spendbook category add <name> --user <username>"))?;
            let username = flag(&args[2..], "--user")
                .ok_or_else(|| anyhow::anyhow!("--user <username> is required"))?;
            let user = db
                .get_user_by_name(username)?
                .ok_or_else(|| anyhow::anyhow!("User '{username}' not found"))?;
            let user_id = user.id.ok_or_else(|| anyhow::anyhow!("User has no ID"))?;
            db.insert_category(&Category::new(name.clone(), user_id))?;
            println!("Category '{name}' added");
            Ok(())
        }
        Some("list") => {
            for cat in db.get_categories()? {
                println!("{:<4} {}", cat.id.unwrap_or(0), cat.name);
            }
            Ok(())
        }
        Some("delete") => {
            let name = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("Usage: spendbook category delete <name>"))?;
            let cat = db
                .get_category_by_name(name)?
                .ok_or_else(|| Error::UnknownCategory(name.clone()))?;
            let id = cat.id.ok_or_else(|| anyhow::anyhow!("Category has no ID"))?;
            db.soft_delete_category(id)?;
            println!("Category '{name}' deleted");
            Ok(())
        }
        Some("rename") => {
            let (old, new) = match (args.get(1), args.get(2)) {
                (Some(o), Some(n)) => (o, n),
                _ => anyhow::bail!("Usage: spendbook category rename <old> <new>"),
            };
            let cat = db
                .get_category_by_name(old)?
                .ok_or_else(|| Error::UnknownCategory(old.clone()))?;
            let id = cat.id.ok_or_else(|| anyhow::anyhow!("Category has no ID"))?;
            db.rename_category(id, new)?;
            println!("Category '{old}' renamed to '{new}'");
            println!("Note: reporting rows keep the old name until their expenses are re-synced");
            Ok(())
        }
        _ => anyhow::bail!("Usage: spendbook category <add|list|rename|delete>"),
    }
}

fn cli_method(args: &[String], db: &mut Database) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => {
            let name = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("Usage: spendbook method add <name>"))?;
            db.insert_payment_method(&PaymentMethod::new(name.clone()))?;
            println!("Payment method '{name}' added");
            Ok(())
        }
        Some("list") => {
            for method in db.get_payment_methods()? {
                println!("{:<4} {}", method.id.unwrap_or(0), method.name);
            }
            Ok(())
        }
        _ => anyhow::bail!("Usage: spendbook method <add|list>"),
    }
}

// ── Expenses ─────────────────────────────────────────────────

fn cli_expense(args: &[String], db: &mut Database) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => cli_expense_add(&args[1..], db),
        Some("list") => {
            let include_deleted = args.iter().any(|a| a == "--all");
            let expenses = db.get_expenses(include_deleted)?;
            if expenses.is_empty() {
                println!("No expenses");
                return Ok(());
            }
            println!(
                "{:<6} {:<12} {:>10}  {:<12} Description",
                "ID", "Date", "Amount", "Tag"
            );
            println!("{}", "─".repeat(60));
            for e in &expenses {
                let marker = if e.is_deleted { " (deleted)" } else { "" };
                println!(
                    "{:<6} {:<12} {:>10}  {:<12} {}{marker}",
                    e.id.unwrap_or(0),
                    e.expense_date,
                    format!("${:.2}", e.amount),
                    e.tag,
                    e.description,
                );
            }
            Ok(())
        }
        Some("tag") => {
            let (id, tag) = match (args.get(1), args.get(2)) {
                (Some(i), Some(t)) => (i, t),
                _ => anyhow::bail!("Usage: spendbook expense tag <id> <tag>"),
            };
            let id: i64 = id.parse().map_err(|_| {
                Error::InvalidParameter(format!("invalid expense id '{id}'"))
            })?;
            if db.update_expense_tag(id, tag)? {
                println!("Expense {id} tagged '{tag}'");
            } else {
                println!("No live expense with id {id}");
            }
            Ok(())
        }
        Some("delete") => {
            let id = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("Usage: spendbook expense delete <id>"))?;
            let id: i64 = id.parse().map_err(|_| {
                Error::InvalidParameter(format!("invalid expense id '{id}'"))
            })?;
            if db.soft_delete_expense(id)? {
                println!("Expense {id} deleted (will leave reports on next sync)");
            } else {
                println!("No live expense with id {id}");
            }
            Ok(())
        }
        _ => anyhow::bail!("Usage: spendbook expense <add|list|tag|delete>"),
    }
}

fn cli_expense_add(args: &[String], db: &mut Database) -> Result<()> {
    let username = flag(args, "--user")
        .ok_or_else(|| anyhow::anyhow!("--user <username> is required"))?;
    let category_name = flag(args, "--category")
        .ok_or_else(|| anyhow::anyhow!("--category <name> is required"))?;
    let method_name = flag(args, "--method")
        .ok_or_else(|| anyhow::anyhow!("--method <name> is required"))?;
    let amount_str = flag(args, "--amount")
        .ok_or_else(|| anyhow::anyhow!("--amount <n> is required"))?;
    let tag = flag(args, "--tag")
        .ok_or_else(|| anyhow::anyhow!("--tag <t> is required"))?;
    let date = match flag(args, "--date") {
        Some(d) => reports::parse_date(d)?.format("%Y-%m-%d").to_string(),
        None => chrono::Local::now().format("%Y-%m-%d").to_string(),
    };
    let description = flag(args, "--desc").unwrap_or("").to_string();

    let amount = Decimal::from_str(amount_str)
        .map_err(|_| Error::InvalidParameter(format!("invalid amount '{amount_str}'")))?;

    let user = db
        .get_user_by_name(username)?
        .ok_or_else(|| anyhow::anyhow!("User '{username}' not found"))?;
    let categories = db.get_categories()?;
    let category = Category::find_by_name(&categories, category_name)
        .ok_or_else(|| Error::UnknownCategory(category_name.to_string()))?;
    let method = db
        .get_payment_method_by_name(method_name)?
        .ok_or_else(|| anyhow::anyhow!("Payment method '{method_name}' not found"))?;

    let expense = Expense::new(
        user.id.ok_or_else(|| anyhow::anyhow!("User has no ID"))?,
        category.id.ok_or_else(|| anyhow::anyhow!("Category has no ID"))?,
        method.id.ok_or_else(|| anyhow::anyhow!("Payment method has no ID"))?,
        amount,
        date,
        description,
        tag.to_string(),
    );
    let id = db.insert_expense(&expense)?;
    println!("Expense {id} added (${amount:.2}, run 'spendbook sync' to refresh reports)");
    Ok(())
}

// ── Sync & reports ───────────────────────────────────────────

fn cli_sync(args: &[String], db: &mut Database) -> Result<()> {
    let options = SyncOptions {
        delete_policy: if args.iter().any(|a| a == "--keep-deleted") {
            DeletePolicy::Flag
        } else {
            DeletePolicy::Prune
        },
    };
    let outcome = sync::synchronize(db, &options)?;
    println!(
        "Sync complete: {} updated, {} removed, {} skipped",
        outcome.updated, outcome.removed, outcome.skipped
    );
    println!("Watermark: {}", outcome.watermark);
    Ok(())
}

fn cli_report(args: &[String], db: &mut Database) -> Result<()> {
    let report = match args.first().map(String::as_str) {
        Some("top") => {
            let (n, from, to) = match (args.get(1), args.get(2), args.get(3)) {
                (Some(n), Some(f), Some(t)) => (n, f, t),
                _ => anyhow::bail!("Usage: spendbook report top <n> <from> <to>"),
            };
            let limit: u32 = n
                .parse()
                .map_err(|_| Error::InvalidParameter(format!("invalid count '{n}'")))?;
            Report::TopExpenses {
                limit,
                from: reports::parse_date(from)?,
                to: reports::parse_date(to)?,
            }
        }
        Some("category") => {
            let name = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("Usage: spendbook report category <name>"))?;
            Report::CategorySpending {
                category: name.clone(),
            }
        }
        Some("above-average") => Report::AboveAverageExpenses,
        Some("monthly-category") => Report::MonthlyCategorySpending,
        Some("highest-spender") => Report::HighestSpenderPerMonth,
        Some("frequent-category") => Report::FrequentCategory,
        Some("payment-methods") => Report::PaymentMethodUsage,
        Some("tags") => Report::TagExpenses,
        _ => anyhow::bail!("Unknown report. See 'spendbook --help' for the catalog"),
    };

    print_report(&reports::run_report(db, &report)?);
    Ok(())
}

fn print_report(output: &ReportOutput) {
    match output {
        ReportOutput::TopExpenses(rows) => {
            if rows.is_empty() {
                println!("No expenses in range");
                return;
            }
            println!(
                "{:<6} {:<12} {:>10}  {:<16} {:<12} Description",
                "ID", "Date", "Amount", "Category", "User"
            );
            println!("{}", "─".repeat(76));
            for r in rows {
                println!(
                    "{:<6} {:<12} {:>10}  {:<16} {:<12} {}",
                    r.expense_id,
                    r.expense_date,
                    format!("${:.2}", r.amount),
                    r.category_name,
                    r.username,
                    r.description,
                );
            }
        }
        ReportOutput::CategorySpending { category, total } => {
            println!("Total spending for '{category}': ${total:.2}");
        }
        ReportOutput::AboveAverageExpenses(rows) => {
            if rows.is_empty() {
                println!("No expenses above their category average");
                return;
            }
            println!(
                "{:<6} {:<12} {:>10}  {:<16} {:<12} Description",
                "ID", "Date", "Amount", "Category", "User"
            );
            println!("{}", "─".repeat(76));
            for r in rows {
                println!(
                    "{:<6} {:<12} {:>10}  {:<16} {:<12} {}",
                    r.expense_id,
                    r.expense_date,
                    format!("${:.2}", r.amount),
                    r.category_name,
                    r.username,
                    r.description,
                );
            }
        }
        ReportOutput::MonthlyCategorySpending(rows) => {
            for row in rows {
                println!("{:<9} {:<20} ${:.2}", row.month, row.category, row.total);
            }
        }
        ReportOutput::HighestSpenderPerMonth(rows) => {
            for row in rows {
                println!("{:<9} {:<16} ${:.2}", row.month, row.username, row.total);
            }
        }
        ReportOutput::FrequentCategory(rows) => {
            for row in rows {
                println!("{:<20} {}", row.category, row.count);
            }
        }
        ReportOutput::PaymentMethodUsage(rows) => {
            for row in rows {
                println!("{:<20} ${:.2}", row.method, row.total);
            }
        }
        ReportOutput::TagExpenses(rows) => {
            for row in rows {
                println!("{:<20} {}", row.tag, row.count);
            }
        }
    }
}
