//! Balance-sheet module for moneyflow scenarios.
//!
//! Models the slice of double-entry accounting that parameterizes flow
//! scenes: named balance sheets accumulate debit/credit postings over a
//! closed set of account categories, and pure money-multiplier functions
//! turn a reserve ratio into the whole-block lending rounds a scene feeds
//! its inputs with.
//!
//! # Design
//!
//! - Categories are a closed enumeration ([`AccountKind`]); iteration over
//!   a sheet's entries follows declaration order, so rendering is
//!   deterministic.
//! - Sheets are plain accumulating state; recomputation (totals, balance
//!   checks) is explicit and pure, never triggered from field access.
//! - Multiplier arithmetic uses the same [`Fixed64`] rounding rule as flow
//!   connections, so a ledger-driven scene and a hand-built one agree on
//!   every block count.

use std::collections::BTreeMap;

use moneyflow_core::fixed::{Fixed64, block_count};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Accounts and sides
// ---------------------------------------------------------------------------

/// Balance-sheet categories. A closed set; `Ord` follows declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AccountKind {
    Cash,
    Reserves,
    Loans,
    Bonds,
    Deposits,
    Debt,
    Equity,
}

impl AccountKind {
    /// Every category, in declaration order.
    pub const ALL: [AccountKind; 7] = [
        AccountKind::Cash,
        AccountKind::Reserves,
        AccountKind::Loans,
        AccountKind::Bonds,
        AccountKind::Deposits,
        AccountKind::Debt,
        AccountKind::Equity,
    ];
}

/// The two sides of a balance sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Debit,
    Credit,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// One double-entry posting: `amount` blocks debited to one category and
/// credited to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub description: String,
    pub amount: u32,
    pub debit: AccountKind,
    pub credit: AccountKind,
}

impl Transaction {
    pub fn new(
        description: impl Into<String>,
        amount: u32,
        debit: AccountKind,
        credit: AccountKind,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            debit,
            credit,
        }
    }
}

// ---------------------------------------------------------------------------
// BalanceSheet
// ---------------------------------------------------------------------------

/// A named double-entry balance sheet.
///
/// Posting accumulates into both sides, so the sheet is balanced by
/// construction; [`is_balanced`](BalanceSheet::is_balanced) re-checks it
/// explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    name: String,
    debits: BTreeMap<AccountKind, u32>,
    credits: BTreeMap<AccountKind, u32>,
    transactions: Vec<Transaction>,
}

impl BalanceSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            debits: BTreeMap::new(),
            credits: BTreeMap::new(),
            transactions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Post a transaction, accumulating its amount on both sides.
    pub fn post(&mut self, transaction: Transaction) {
        *self.debits.entry(transaction.debit).or_default() += transaction.amount;
        *self.credits.entry(transaction.credit).or_default() += transaction.amount;
        self.transactions.push(transaction);
    }

    /// Accumulated amount for one category on one side.
    pub fn balance(&self, kind: AccountKind, side: Side) -> u32 {
        let entries = match side {
            Side::Debit => &self.debits,
            Side::Credit => &self.credits,
        };
        entries.get(&kind).copied().unwrap_or(0)
    }

    /// Sum of one whole side.
    pub fn total(&self, side: Side) -> u32 {
        let entries = match side {
            Side::Debit => &self.debits,
            Side::Credit => &self.credits,
        };
        entries.values().sum()
    }

    /// Nonzero entries of one side, in category declaration order.
    pub fn entries(&self, side: Side) -> impl Iterator<Item = (AccountKind, u32)> + '_ {
        let entries = match side {
            Side::Debit => &self.debits,
            Side::Credit => &self.credits,
        };
        entries.iter().map(|(&kind, &amount)| (kind, amount))
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn last_transaction(&self) -> Option<&Transaction> {
        self.transactions.last()
    }

    /// True when both sides sum to the same total.
    pub fn is_balanced(&self) -> bool {
        self.total(Side::Debit) == self.total(Side::Credit)
    }
}

// ---------------------------------------------------------------------------
// Money-multiplier arithmetic
// ---------------------------------------------------------------------------

/// Errors from multiplier arithmetic.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("reserve ratio must be positive")]
    ZeroReserveRatio,
}

/// Theoretical money multiplier for a reserve ratio `r`: `1 / r`.
pub fn multiplier(reserve_ratio: Fixed64) -> Result<Fixed64, LedgerError> {
    if reserve_ratio <= Fixed64::ZERO {
        return Err(LedgerError::ZeroReserveRatio);
    }
    Ok(Fixed64::ONE / reserve_ratio)
}

/// Whole-block amounts re-lent in each of up to `iterations` rounds of the
/// money-multiplier process, starting from `initial` deposited blocks.
///
/// Round `k` re-lends round `k-1` minus the reserve fraction, rounded to
/// whole blocks with the same rule flow connections use. Stops early once a
/// round rounds to zero.
pub fn lending_rounds(
    initial: u32,
    reserve_ratio: Fixed64,
    iterations: u32,
) -> Result<Vec<u32>, LedgerError> {
    if reserve_ratio <= Fixed64::ZERO {
        return Err(LedgerError::ZeroReserveRatio);
    }
    let retained = Fixed64::ONE - reserve_ratio;
    let mut rounds = Vec::with_capacity(iterations as usize);
    let mut current = initial;
    for _ in 0..iterations {
        current = block_count(Fixed64::from_num(current) * retained);
        if current == 0 {
            break;
        }
        rounds.push(current);
    }
    Ok(rounds)
}
