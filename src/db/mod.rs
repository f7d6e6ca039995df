mod schema;

use anyhow::Context;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::*;

pub(crate) struct Database {
    conn: Connection,
}

fn record_from_row(row: &rusqlite::Row) -> rusqlite::Result<ExpenseRecord> {
    let amount_str: String = row.get(4)?;
    Ok(ExpenseRecord {
        expense_id: row.get(0)?,
        username: row.get(1)?,
        category_name: row.get(2)?,
        payment_method_name: row.get(3)?,
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        expense_date: row.get(5)?,
        description: row.get(6)?,
        tag: row.get(7)?,
        is_deleted: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const RECORD_COLUMNS: &str = "expense_id, username, category_name, payment_method_name, \
     amount, expense_date, description, tag, is_deleted, created_at, updated_at";

impl Database {
    pub(crate) fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_default_payment_methods()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_payment_methods()?;
        Ok(db)
    }

    fn migrate(&mut self) -> anyhow::Result<()> {
        // Check if schema_version table exists
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        // Existing database - check version and apply migrations
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_default_payment_methods(&mut self) -> anyhow::Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM payment_methods", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let defaults = [
            "Bank Transfer",
            "Cash",
            "Credit Card",
            "Debit Card",
            "Mobile Payment",
        ];

        let now = now_timestamp();
        let tx = self.conn.transaction()?;
        for name in &defaults {
            tx.execute(
                "INSERT OR IGNORE INTO payment_methods (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
                params![name, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Users ─────────────────────────────────────────────────

    pub(crate) fn insert_user(&self, user: &User) -> Result<i64> {
        let run = || -> rusqlite::Result<i64> {
            self.conn.execute(
                "INSERT INTO users (username, is_deleted, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user.username, user.is_deleted, user.created_at, user.updated_at],
            )?;
            Ok(self.conn.last_insert_rowid())
        };
        run().map_err(|e| Error::write("insert user", e))
    }

    pub(crate) fn get_users(&self) -> Result<Vec<User>> {
        let run = || -> rusqlite::Result<Vec<User>> {
            let mut stmt = self.conn.prepare(
                "SELECT user_id, username, is_deleted, created_at, updated_at
                 FROM users WHERE is_deleted = 0 ORDER BY username",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(User {
                    id: Some(row.get(0)?),
                    username: row.get(1)?,
                    is_deleted: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })?;
            rows.collect()
        };
        run().map_err(|e| Error::read("list users", e))
    }

    pub(crate) fn get_user_by_name(&self, username: &str) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT user_id, username, is_deleted, created_at, updated_at
             FROM users WHERE username = ?1 AND is_deleted = 0",
            params![username],
            |row| {
                Ok(User {
                    id: Some(row.get(0)?),
                    username: row.get(1)?,
                    is_deleted: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            },
        );
        match result {
            Ok(u) => Ok(Some(u)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::read("find user", e)),
        }
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        let run = || -> rusqlite::Result<i64> {
            self.conn.execute(
                "INSERT INTO categories (category_name, user_id, is_deleted, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![cat.name, cat.user_id, cat.is_deleted, cat.created_at, cat.updated_at],
            )?;
            Ok(self.conn.last_insert_rowid())
        };
        run().map_err(|e| Error::write("insert category", e))
    }

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let run = || -> rusqlite::Result<Vec<Category>> {
            let mut stmt = self.conn.prepare(
                "SELECT category_id, category_name, user_id, is_deleted, created_at, updated_at
                 FROM categories WHERE is_deleted = 0 ORDER BY category_name",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(Category {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    user_id: row.get(2)?,
                    is_deleted: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            })?;
            rows.collect()
        };
        run().map_err(|e| Error::read("list categories", e))
    }

    pub(crate) fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let result = self.conn.query_row(
            "SELECT category_id, category_name, user_id, is_deleted, created_at, updated_at
             FROM categories WHERE category_name = ?1 AND is_deleted = 0",
            params![name],
            |row| {
                Ok(Category {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    user_id: row.get(2)?,
                    is_deleted: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            },
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::read("find category", e)),
        }
    }

    /// Renames a category without touching its expenses. Reporting rows
    /// denormalized under the old name stay stale until their source
    /// expenses are next updated and re-synced.
    pub(crate) fn rename_category(&self, id: i64, new_name: &str) -> Result<bool> {
        let run = || -> rusqlite::Result<usize> {
            self.conn.execute(
                "UPDATE categories SET category_name = ?1, updated_at = ?2 WHERE category_id = ?3",
                params![new_name, now_timestamp(), id],
            )
        };
        let changed = run().map_err(|e| Error::write("rename category", e))?;
        Ok(changed > 0)
    }

    /// Soft-deletes a category. Expenses still referencing it become
    /// referential gaps that the next sync reports and skips.
    pub(crate) fn soft_delete_category(&self, id: i64) -> Result<bool> {
        let run = || -> rusqlite::Result<usize> {
            self.conn.execute(
                "UPDATE categories SET is_deleted = 1, updated_at = ?1 WHERE category_id = ?2 AND is_deleted = 0",
                params![now_timestamp(), id],
            )
        };
        let changed = run().map_err(|e| Error::write("delete category", e))?;
        Ok(changed > 0)
    }

    // ── Payment methods ───────────────────────────────────────

    pub(crate) fn insert_payment_method(&self, method: &PaymentMethod) -> Result<i64> {
        let run = || -> rusqlite::Result<i64> {
            self.conn.execute(
                "INSERT INTO payment_methods (name, is_deleted, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![method.name, method.is_deleted, method.created_at, method.updated_at],
            )?;
            Ok(self.conn.last_insert_rowid())
        };
        run().map_err(|e| Error::write("insert payment method", e))
    }

    pub(crate) fn get_payment_methods(&self) -> Result<Vec<PaymentMethod>> {
        let run = || -> rusqlite::Result<Vec<PaymentMethod>> {
            let mut stmt = self.conn.prepare(
                "SELECT payment_method_id, name, is_deleted, created_at, updated_at
                 FROM payment_methods WHERE is_deleted = 0 ORDER BY name",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(PaymentMethod {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    is_deleted: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })?;
            rows.collect()
        };
        run().map_err(|e| Error::read("list payment methods", e))
    }

    pub(crate) fn get_payment_method_by_name(&self, name: &str) -> Result<Option<PaymentMethod>> {
        let result = self.conn.query_row(
            "SELECT payment_method_id, name, is_deleted, created_at, updated_at
             FROM payment_methods WHERE name = ?1 AND is_deleted = 0",
            params![name],
            |row| {
                Ok(PaymentMethod {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    is_deleted: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            },
        );
        match result {
            Ok(m) => Ok(Some(m)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::read("find payment method", e)),
        }
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn insert_expense(&self, expense: &Expense) -> Result<i64> {
        if expense.amount < Decimal::ZERO {
            return Err(Error::InvalidParameter(
                "amount must be non-negative".into(),
            ));
        }
        let run = || -> rusqlite::Result<i64> {
            self.conn.execute(
                "INSERT INTO expenses (user_id, category_id, payment_method_id, amount,
                                       expense_date, description, tag, is_deleted, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    expense.user_id,
                    expense.category_id,
                    expense.payment_method_id,
                    expense.amount.to_string(),
                    expense.expense_date,
                    expense.description,
                    expense.tag,
                    expense.is_deleted,
                    expense.created_at,
                    expense.updated_at,
                ],
            )?;
            Ok(self.conn.last_insert_rowid())
        };
        run().map_err(|e| Error::write("insert expense", e))
    }

    pub(crate) fn get_expenses(&self, include_deleted: bool) -> Result<Vec<Expense>> {
        let sql = if include_deleted {
            "SELECT expense_id, user_id, category_id, payment_method_id, amount,
                    expense_date, description, tag, is_deleted, created_at, updated_at
             FROM expenses ORDER BY expense_date DESC, expense_id DESC"
        } else {
            "SELECT expense_id, user_id, category_id, payment_method_id, amount,
                    expense_date, description, tag, is_deleted, created_at, updated_at
             FROM expenses WHERE is_deleted = 0 ORDER BY expense_date DESC, expense_id DESC"
        };
        let run = || -> rusqlite::Result<Vec<Expense>> {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map([], |row| {
                let amount_str: String = row.get(4)?;
                Ok(Expense {
                    id: Some(row.get(0)?),
                    user_id: row.get(1)?,
                    category_id: row.get(2)?,
                    payment_method_id: row.get(3)?,
                    amount: Decimal::from_str(&amount_str).unwrap_or_default(),
                    expense_date: row.get(5)?,
                    description: row.get(6)?,
                    tag: row.get(7)?,
                    is_deleted: row.get(8)?,
                    created_at: row.get(9)?,
                    updated_at: row.get(10)?,
                })
            })?;
            rows.collect()
        };
        run().map_err(|e| Error::read("list expenses", e))
    }

    /// Re-tags an expense and bumps `updated_at` so the next sync picks it up.
    pub(crate) fn update_expense_tag(&self, id: i64, tag: &str) -> Result<bool> {
        let run = || -> rusqlite::Result<usize> {
            self.conn.execute(
                "UPDATE expenses SET tag = ?1, updated_at = ?2 WHERE expense_id = ?3 AND is_deleted = 0",
                params![tag, now_timestamp(), id],
            )
        };
        let changed = run().map_err(|e| Error::write("update expense tag", e))?;
        Ok(changed > 0)
    }

    /// Moves an expense to another category and bumps `updated_at`.
    #[cfg(test)]
    pub(crate) fn update_expense_category(&self, id: i64, category_id: i64) -> Result<bool> {
        let run = || -> rusqlite::Result<usize> {
            self.conn.execute(
                "UPDATE expenses SET category_id = ?1, updated_at = ?2 WHERE expense_id = ?3 AND is_deleted = 0",
                params![category_id, now_timestamp(), id],
            )
        };
        let changed = run().map_err(|e| Error::write("update expense category", e))?;
        Ok(changed > 0)
    }

    /// Soft delete: flags the row and bumps `updated_at` so the next sync
    /// observes the deletion.
    pub(crate) fn soft_delete_expense(&self, id: i64) -> Result<bool> {
        let run = || -> rusqlite::Result<usize> {
            self.conn.execute(
                "UPDATE expenses SET is_deleted = 1, updated_at = ?1 WHERE expense_id = ?2 AND is_deleted = 0",
                params![now_timestamp(), id],
            )
        };
        let changed = run().map_err(|e| Error::write("delete expense", e))?;
        Ok(changed > 0)
    }

    // ── Sync ──────────────────────────────────────────────────

    pub(crate) fn get_last_sync_time(&self) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT last_sync_time FROM sync_metadata WHERE id = 1",
            [],
            |row| row.get(0),
        );
        match result {
            Ok(ts) => Ok(Some(ts)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::read("read sync watermark", e)),
        }
    }

    /// Every expense changed since the watermark, joined to its referenced
    /// names. LEFT JOINs so referential gaps surface as `None` instead of
    /// silently dropping the row.
    pub(crate) fn changed_expenses_since(
        &self,
        since: Option<&str>,
    ) -> Result<Vec<ChangedExpense>> {
        let run = || -> rusqlite::Result<Vec<ChangedExpense>> {
            let mut stmt = self.conn.prepare(
                "SELECT e.expense_id, e.user_id, e.category_id, e.payment_method_id, e.amount,
                        e.expense_date, e.description, e.tag, e.is_deleted, e.created_at, e.updated_at,
                        u.username, c.category_name, p.name
                 FROM expenses e
                 LEFT JOIN users u ON u.user_id = e.user_id AND u.is_deleted = 0
                 LEFT JOIN categories c ON c.category_id = e.category_id AND c.is_deleted = 0
                 LEFT JOIN payment_methods p ON p.payment_method_id = e.payment_method_id AND p.is_deleted = 0
                 WHERE ?1 IS NULL OR e.updated_at > ?1
                 ORDER BY e.updated_at, e.expense_id",
            )?;
            let rows = stmt.query_map(params![since], |row| {
                let amount_str: String = row.get(4)?;
                Ok(ChangedExpense {
                    expense: Expense {
                        id: Some(row.get(0)?),
                        user_id: row.get(1)?,
                        category_id: row.get(2)?,
                        payment_method_id: row.get(3)?,
                        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
                        expense_date: row.get(5)?,
                        description: row.get(6)?,
                        tag: row.get(7)?,
                        is_deleted: row.get(8)?,
                        created_at: row.get(9)?,
                        updated_at: row.get(10)?,
                    },
                    username: row.get(11)?,
                    category_name: row.get(12)?,
                    payment_method_name: row.get(13)?,
                })
            })?;
            rows.collect()
        };
        run().map_err(|e| Error::read("read changed expenses", e))
    }

    /// Applies one sync batch as a single transaction: upserts keyed by the
    /// source expense id, removals, then the watermark advance. Either all
    /// of it commits or none of it does.
    pub(crate) fn apply_sync_batch(
        &mut self,
        upserts: &[ExpenseRecord],
        removals: &[i64],
        watermark: &str,
    ) -> Result<()> {
        let run = |conn: &mut Connection| -> rusqlite::Result<()> {
            let tx = conn.transaction()?;
            for r in upserts {
                tx.execute(
                    "INSERT INTO expense_reports (expense_id, username, category_name, payment_method_name,
                                                  amount, expense_date, description, tag, is_deleted,
                                                  created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                     ON CONFLICT(expense_id) DO UPDATE SET
                         username = excluded.username,
                         category_name = excluded.category_name,
                         payment_method_name = excluded.payment_method_name,
                         amount = excluded.amount,
                         expense_date = excluded.expense_date,
                         description = excluded.description,
                         tag = excluded.tag,
                         is_deleted = excluded.is_deleted,
                         created_at = excluded.created_at,
                         updated_at = excluded.updated_at",
                    params![
                        r.expense_id,
                        r.username,
                        r.category_name,
                        r.payment_method_name,
                        r.amount.to_string(),
                        r.expense_date,
                        r.description,
                        r.tag,
                        r.is_deleted,
                        r.created_at,
                        r.updated_at,
                    ],
                )?;
            }
            for id in removals {
                tx.execute(
                    "DELETE FROM expense_reports WHERE expense_id = ?1",
                    params![id],
                )?;
            }
            tx.execute(
                "INSERT INTO sync_metadata (id, last_sync_time) VALUES (1, ?1)
                 ON CONFLICT(id) DO UPDATE SET last_sync_time = ?1",
                params![watermark],
            )?;
            tx.commit()
        };
        run(&mut self.conn).map_err(|e| Error::write("apply sync batch", e))
    }

    pub(crate) fn get_report_records(&self) -> Result<Vec<ExpenseRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM expense_reports ORDER BY expense_id"
        );
        let run = || -> rusqlite::Result<Vec<ExpenseRecord>> {
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map([], record_from_row)?;
            rows.collect()
        };
        run().map_err(|e| Error::read("list reporting records", e))
    }

    #[cfg(test)]
    pub(crate) fn get_report_record(&self, expense_id: i64) -> Result<Option<ExpenseRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM expense_reports WHERE expense_id = ?1"
        );
        let result = self
            .conn
            .query_row(&sql, params![expense_id], record_from_row);
        match result {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::read("read reporting record", e)),
        }
    }

    // ── Reports ───────────────────────────────────────────────
    //
    // All report queries run against the denormalized store only and
    // exclude rows flagged as deleted.

    pub(crate) fn report_top_expenses(
        &self,
        limit: u32,
        from: &str,
        to: &str,
    ) -> Result<Vec<ExpenseRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM expense_reports
             WHERE is_deleted = 0 AND expense_date BETWEEN ?1 AND ?2
             ORDER BY CAST(amount AS REAL) DESC, expense_id ASC
             LIMIT ?3"
        );
        let run = || -> rusqlite::Result<Vec<ExpenseRecord>> {
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params![from, to, limit], record_from_row)?;
            rows.collect()
        };
        run().map_err(|e| Error::read("top expenses report", e))
    }

    pub(crate) fn report_category_spending(&self, category: &str) -> Result<Decimal> {
        let total: String = self
            .conn
            .query_row(
                "SELECT CAST(COALESCE(SUM(amount), 0) AS TEXT) FROM expense_reports
                 WHERE is_deleted = 0 AND category_name = ?1",
                params![category],
                |row| row.get(0),
            )
            .map_err(|e| Error::read("category spending report", e))?;
        Ok(Decimal::from_str(&total).unwrap_or_default())
    }

    pub(crate) fn report_above_average_expenses(&self) -> Result<Vec<ExpenseRecord>> {
        let sql = "SELECT r.expense_id, r.username, r.category_name, r.payment_method_name,
                    r.amount, r.expense_date, r.description, r.tag, r.is_deleted,
                    r.created_at, r.updated_at
             FROM expense_reports r
             JOIN (SELECT category_name, AVG(CAST(amount AS REAL)) AS mean
                   FROM expense_reports WHERE is_deleted = 0
                   GROUP BY category_name) av
               ON av.category_name = r.category_name
             WHERE r.is_deleted = 0 AND CAST(r.amount AS REAL) > av.mean
             ORDER BY r.expense_id ASC";
        let run = || -> rusqlite::Result<Vec<ExpenseRecord>> {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map([], record_from_row)?;
            rows.collect()
        };
        run().map_err(|e| Error::read("above average report", e))
    }

    pub(crate) fn report_monthly_category_spending(
        &self,
    ) -> Result<Vec<(String, String, Decimal)>> {
        let run = || -> rusqlite::Result<Vec<(String, String, Decimal)>> {
            let mut stmt = self.conn.prepare(
                "SELECT strftime('%Y-%m', expense_date) AS month, category_name,
                        CAST(SUM(amount) AS TEXT)
                 FROM expense_reports WHERE is_deleted = 0
                 GROUP BY month, category_name
                 ORDER BY month ASC, category_name ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                let total: String = row.get(2)?;
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    Decimal::from_str(&total).unwrap_or_default(),
                ))
            })?;
            rows.collect()
        };
        run().map_err(|e| Error::read("monthly category report", e))
    }

    /// Per-month per-user totals, ordered so the first row of each month is
    /// its winner: total descending, then username ascending for ties.
    pub(crate) fn report_monthly_user_totals(&self) -> Result<Vec<(String, String, Decimal)>> {
        let run = || -> rusqlite::Result<Vec<(String, String, Decimal)>> {
            let mut stmt = self.conn.prepare(
                "SELECT strftime('%Y-%m', expense_date) AS month, username,
                        CAST(SUM(amount) AS TEXT)
                 FROM expense_reports WHERE is_deleted = 0
                 GROUP BY month, username
                 ORDER BY month ASC, SUM(CAST(amount AS REAL)) DESC, username ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                let total: String = row.get(2)?;
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    Decimal::from_str(&total).unwrap_or_default(),
                ))
            })?;
            rows.collect()
        };
        run().map_err(|e| Error::read("highest spender report", e))
    }

    pub(crate) fn report_frequent_category(&self) -> Result<Vec<(String, i64)>> {
        let run = || -> rusqlite::Result<Vec<(String, i64)>> {
            let mut stmt = self.conn.prepare(
                "SELECT category_name, COUNT(*) AS uses
                 FROM expense_reports WHERE is_deleted = 0
                 GROUP BY category_name
                 ORDER BY uses DESC, category_name ASC",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        };
        run().map_err(|e| Error::read("frequent category report", e))
    }

    pub(crate) fn report_payment_method_usage(&self) -> Result<Vec<(String, Decimal)>> {
        let run = || -> rusqlite::Result<Vec<(String, Decimal)>> {
            let mut stmt = self.conn.prepare(
                "SELECT payment_method_name, CAST(SUM(amount) AS TEXT)
                 FROM expense_reports WHERE is_deleted = 0
                 GROUP BY payment_method_name
                 ORDER BY SUM(CAST(amount AS REAL)) DESC, payment_method_name ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                let total: String = row.get(1)?;
                Ok((row.get(0)?, Decimal::from_str(&total).unwrap_or_default()))
            })?;
            rows.collect()
        };
        run().map_err(|e| Error::read("payment method report", e))
    }

    pub(crate) fn report_tag_expenses(&self) -> Result<Vec<(String, i64)>> {
        let run = || -> rusqlite::Result<Vec<(String, i64)>> {
            let mut stmt = self.conn.prepare(
                "SELECT tag, COUNT(*) AS uses
                 FROM expense_reports WHERE is_deleted = 0
                 GROUP BY tag
                 ORDER BY uses DESC, tag ASC",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        };
        run().map_err(|e| Error::read("tag report", e))
    }
}

#[cfg(test)]
mod tests;
