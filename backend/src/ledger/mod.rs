//! Debt ledger
//!
//! A fixed catalog of lenders and the collection of debts taken against
//! them. Computes compounding amounts due, applies payments, and derives
//! escalating consequences when a debt goes overdue.
//!
//! # Time base
//!
//! Every operation takes `now_ms` on the game-time axis
//! ([`GameClock::game_time_ms`]); the ledger never reads the host clock.
//! A day is [`MS_PER_DAY`] on that axis. Interest compounds per whole day
//! past the due date: a debt inside its grace window owes exactly its
//! principal.
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 whole currency units
//! 2. Debts are never removed; settled ones stay with `is_paid = true`
//! 3. Amount due is non-decreasing in elapsed overdue time
//!
//! [`GameClock::game_time_ms`]: crate::core::time::GameClock::game_time_ms

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use crate::core::time::MS_PER_DAY;

/// Errors that can occur during ledger operations
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("unknown lender: {0}")]
    UnknownLender(String),

    #[error("loan amount {amount} outside lender bounds [{min}, {max}]")]
    InvalidLoanAmount { amount: i64, min: i64, max: i64 },
}

/// A lender profile. The catalog is fixed and immutable for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lender {
    pub name: String,
    /// Daily interest rate applied past the due date (e.g. 0.10 = 10%/day)
    pub base_interest: f64,
    /// Smallest loan this lender will quote (currency units)
    pub min_loan: i64,
    /// Largest loan this lender will quote (currency units)
    pub max_loan: i64,
    /// Days between issuance and the due date
    pub grace_period_days: u32,
    /// 1-10, controls consequence severity once overdue
    pub aggressiveness: u8,
}

/// A single loan instance.
///
/// Serializes camelCase: this struct is the `debts[]` element of the
/// persisted save shape, verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    /// Principal remaining (currency units)
    pub amount: i64,
    /// Daily rate snapshot taken at issuance
    pub interest: f64,
    /// Due date on the game-time axis (ms)
    pub due_date: i64,
    pub lender: String,
    pub is_paid: bool,
}

/// Approved terms returned by [`Ledger::quote_loan`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoanTerms {
    pub lender: String,
    pub interest: f64,
    /// Absolute due date on the game-time axis (ms)
    pub due_date: i64,
}

/// Narrative consequence of an overdue debt, by lender aggressiveness tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consequence {
    DeathThreat,
    Pursuit,
    ViolenceThreat,
    Intimidation,
    PersistentCollection,
    Warning,
}

impl Consequence {
    /// Display label for the presentation layer.
    pub fn label(self) -> &'static str {
        match self {
            Consequence::DeathThreat => "DEATH THREAT",
            Consequence::Pursuit => "PURSUIT",
            Consequence::ViolenceThreat => "THREAT OF VIOLENCE",
            Consequence::Intimidation => "INTIMIDATION",
            Consequence::PersistentCollection => "PERSISTENT COLLECTION",
            Consequence::Warning => "WARNINGS",
        }
    }
}

/// One overdue debt surfaced by [`Ledger::tick`].
///
/// The caller decides how to present it, e.g. sampling one consequence at
/// random per notice.
#[derive(Debug, Clone, PartialEq)]
pub struct OverdueNotice {
    pub debt_id: String,
    pub lender: String,
    pub amount_due: i64,
    pub consequences: Vec<Consequence>,
}

/// The debt ledger: lender catalog plus full debt history
///
/// # Example
/// ```
/// use trade_simulator_core_rs::Ledger;
/// use trade_simulator_core_rs::core::time::MS_PER_DAY;
///
/// let mut ledger = Ledger::new();
/// let terms = ledger.quote_loan("Easy Eddie", 600, 0).unwrap();
/// assert_eq!(terms.due_date, 5 * MS_PER_DAY);
///
/// let id = ledger.issue_loan(&terms, 600);
/// let debt = ledger.find_debt(&id).unwrap();
/// assert_eq!(ledger.amount_due(debt, 0), 600); // not yet overdue
/// ```
#[derive(Debug, Clone)]
pub struct Ledger {
    lenders: Vec<Lender>,
    debts: Vec<Debt>,
}

impl Ledger {
    /// Create a ledger with the default lender catalog and no debts.
    pub fn new() -> Self {
        Self::with_lenders(default_lenders())
    }

    /// Create a ledger with a custom lender catalog (tests, scenario setup).
    pub fn with_lenders(lenders: Vec<Lender>) -> Self {
        Self {
            lenders,
            debts: Vec::new(),
        }
    }

    /// The fixed lender catalog.
    pub fn lenders(&self) -> &[Lender] {
        &self.lenders
    }

    /// All debts, settled ones included (history is retained for display).
    pub fn debts(&self) -> &[Debt] {
        &self.debts
    }

    /// Look up a debt by id.
    pub fn find_debt(&self, debt_id: &str) -> Option<&Debt> {
        self.debts.iter().find(|d| d.id == debt_id)
    }

    /// Quote terms for a loan of `amount` from `lender_name`.
    ///
    /// Fails if the lender is unknown or the amount is outside the lender's
    /// `[min_loan, max_loan]` bounds. The due date is `now + grace days`.
    pub fn quote_loan(
        &self,
        lender_name: &str,
        amount: i64,
        now_ms: i64,
    ) -> Result<LoanTerms, LedgerError> {
        let lender = self
            .lenders
            .iter()
            .find(|l| l.name == lender_name)
            .ok_or_else(|| LedgerError::UnknownLender(lender_name.to_string()))?;

        if amount < lender.min_loan || amount > lender.max_loan {
            return Err(LedgerError::InvalidLoanAmount {
                amount,
                min: lender.min_loan,
                max: lender.max_loan,
            });
        }

        Ok(LoanTerms {
            lender: lender.name.clone(),
            interest: lender.base_interest,
            due_date: now_ms + lender.grace_period_days as i64 * MS_PER_DAY,
        })
    }

    /// Append a new unpaid debt under the quoted terms. No cap on the
    /// number of concurrent debts. Returns the new debt's id.
    pub fn issue_loan(&mut self, terms: &LoanTerms, amount: i64) -> String {
        let id = Uuid::new_v4().to_string();
        self.debts.push(Debt {
            id: id.clone(),
            amount,
            interest: terms.interest,
            due_date: terms.due_date,
            lender: terms.lender.clone(),
            is_paid: false,
        });
        id
    }

    /// Total currently owed on a debt.
    ///
    /// Zero for a settled debt. Otherwise
    /// `floor(principal × (1 + rate)^days_overdue)` with whole days overdue;
    /// inside the grace window this is exactly the principal (interest
    /// accrues only past the due date, by design).
    pub fn amount_due(&self, debt: &Debt, now_ms: i64) -> i64 {
        if debt.is_paid {
            return 0;
        }
        let days_overdue = days_overdue(debt, now_ms);
        if days_overdue == 0 {
            return debt.amount;
        }
        (debt.amount as f64 * (1.0 + debt.interest).powi(days_overdue as i32)).floor() as i64
    }

    /// Pay toward a debt out of `available` funds.
    ///
    /// If `available` covers the full amount due, the debt is marked paid
    /// and the exact amount due is returned (the caller deducts that much,
    /// not more). Otherwise the principal is reduced by `available` and
    /// `available` is returned; due date and rate are preserved. An unknown
    /// id pays nothing and returns 0.
    pub fn pay_debt(&mut self, debt_id: &str, available: i64, now_ms: i64) -> i64 {
        let Some(index) = self.debts.iter().position(|d| d.id == debt_id) else {
            return 0;
        };
        if available <= 0 {
            return 0;
        }

        let total_due = self.amount_due(&self.debts[index], now_ms);
        let debt = &mut self.debts[index];
        if available >= total_due {
            debt.is_paid = true;
            total_due
        } else {
            debt.amount -= available;
            available
        }
    }

    /// Consequence tags for a debt, ordered most severe first.
    ///
    /// Empty unless the debt is unpaid and strictly past its due date.
    pub fn consequences_for(&self, debt: &Debt, now_ms: i64) -> Vec<Consequence> {
        if debt.is_paid || now_ms <= debt.due_date {
            return Vec::new();
        }
        let Some(lender) = self.lenders.iter().find(|l| l.name == debt.lender) else {
            return Vec::new();
        };

        if lender.aggressiveness >= 8 {
            vec![Consequence::DeathThreat, Consequence::Pursuit]
        } else if lender.aggressiveness >= 5 {
            vec![Consequence::ViolenceThreat, Consequence::Intimidation]
        } else {
            vec![Consequence::PersistentCollection, Consequence::Warning]
        }
    }

    /// Sweep all debts and surface one notice per unpaid overdue debt.
    pub fn tick(&self, now_ms: i64) -> Vec<OverdueNotice> {
        self.debts
            .iter()
            .filter(|d| !d.is_paid && now_ms > d.due_date)
            .map(|d| OverdueNotice {
                debt_id: d.id.clone(),
                lender: d.lender.clone(),
                amount_due: self.amount_due(d, now_ms),
                consequences: self.consequences_for(d, now_ms),
            })
            .collect()
    }

    /// Replace the whole debt collection (restore path).
    pub fn restore_debts(&mut self, debts: Vec<Debt>) {
        self.debts = debts;
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole days a debt is past due; zero inside the grace window.
fn days_overdue(debt: &Debt, now_ms: i64) -> i64 {
    ((now_ms - debt.due_date) / MS_PER_DAY).max(0)
}

/// The fixed default lender catalog.
pub fn default_lenders() -> Vec<Lender> {
    vec![
        Lender {
            name: "Crazy Tony".to_string(),
            base_interest: 0.15,
            min_loan: 1_000,
            max_loan: 10_000,
            grace_period_days: 3,
            aggressiveness: 8,
        },
        Lender {
            name: "Easy Eddie".to_string(),
            base_interest: 0.10,
            min_loan: 500,
            max_loan: 5_000,
            grace_period_days: 5,
            aggressiveness: 4,
        },
        Lender {
            name: "Aunt Rosa".to_string(),
            base_interest: 0.05,
            min_loan: 100,
            max_loan: 2_000,
            grace_period_days: 7,
            aggressiveness: 2,
        },
    ]
}
