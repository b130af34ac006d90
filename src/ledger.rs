use std::sync::{Mutex, PoisonError};

use bigdecimal::{BigDecimal, Signed, Zero};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use crate::database::filter::Condition;
use crate::database::{to_fields, Collection, Document, Fields, Repository, StoreError};
use crate::error::ServiceError;
use crate::money;
use crate::records::{LedgerEntry, LedgerKind};
use crate::session::Session;

/// A debit for one order: the order document and the ledger line it produces.
#[derive(Debug, Clone)]
pub struct Charge {
    pub collection: Collection,
    pub record: Fields,
    pub amount: BigDecimal,
    pub kind: LedgerKind,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Receipt {
    pub order: Option<Document>,
    pub entry: LedgerEntry,
    pub balance: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub credits: BigDecimal,
    pub debits: BigDecimal,
    pub expected: BigDecimal,
    pub actual: BigDecimal,
    pub consistent: bool,
}

pub fn record(repo: &dyn Repository, entry: &LedgerEntry) -> Result<LedgerEntry, StoreError> {
    repo.create(Collection::PaymentHistory, to_fields(entry)?)?.decode()
}

/// The user's ledger, newest first.
pub fn entries_for(repo: &dyn Repository, user_id: &str) -> Result<Vec<LedgerEntry>, StoreError> {
    let mut entries = repo
        .query(Collection::PaymentHistory, &[Condition::eq("userId", user_id)])?
        .iter()
        .map(Document::decode)
        .collect::<Result<Vec<LedgerEntry>, _>>()?;
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(entries)
}

/// Serialises balance changes inside this process. The steps after the
/// balance check are not rolled back: a failure part way leaves the earlier
/// writes in place and is logged with the step that failed.
pub struct Ledger {
    min_top_up: BigDecimal,
    guard: Mutex<()>,
}

impl Ledger {
    pub fn new(min_top_up: BigDecimal) -> Self {
        Self {
            min_top_up,
            guard: Mutex::new(()),
        }
    }

    pub fn charge(&self, session: &Session, charge: Charge) -> Result<Receipt, ServiceError> {
        if charge.amount.is_negative() {
            return Err(ServiceError::bad_parameter("amount"));
        }
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let repo = session.repository();
        let user_id = session.user_id();

        let available = session.credit()?;
        if charge.amount > available {
            info!(user_id, needed = %charge.amount, available = %available, "insufficient credit");
            return Err(ServiceError::InsufficientCredit {
                needed: charge.amount,
                available,
            });
        }

        let order = repo.create(charge.collection, charge.record).map_err(|e| {
            error!(user_id, step = "order", "charge failed: {e}");
            e
        })?;
        let entry = record(
            repo,
            &LedgerEntry {
                id: String::new(),
                user_id: user_id.to_string(),
                date: Utc::now(),
                description: charge.description,
                amount: charge.amount.clone(),
                kind: charge.kind,
            },
        )
        .map_err(|e| {
            error!(user_id, order_id = %order.id, step = "ledger entry", "charge failed: {e}");
            e
        })?;
        let balance = money::round(&(available - &charge.amount));
        session.update_credit(&balance).map_err(|e| {
            error!(user_id, order_id = %order.id, step = "balance", "charge failed: {e}");
            e
        })?;

        info!(
            user_id,
            order_id = %order.id,
            amount = %charge.amount,
            kind = charge.kind.as_str(),
            "charged"
        );
        Ok(Receipt {
            order: Some(order),
            entry,
            balance,
        })
    }

    pub fn top_up(&self, session: &Session, amount: &BigDecimal) -> Result<Receipt, ServiceError> {
        if amount < &self.min_top_up {
            return Err(ServiceError::bad_parameter("value"));
        }
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let user_id = session.user_id();

        let balance = money::round(&(session.credit()? + amount));
        session.update_credit(&balance)?;
        let entry = record(
            session.repository(),
            &LedgerEntry {
                id: String::new(),
                user_id: user_id.to_string(),
                date: Utc::now(),
                description: "Credit Top-up".to_string(),
                amount: amount.clone(),
                kind: LedgerKind::Credit,
            },
        )
        .map_err(|e| {
            error!(user_id, step = "ledger entry", "top-up failed: {e}");
            e
        })?;

        info!(user_id, amount = %amount, "topped up");
        Ok(Receipt {
            order: None,
            entry,
            balance,
        })
    }

    pub fn history(&self, session: &Session) -> Result<Vec<LedgerEntry>, ServiceError> {
        Ok(entries_for(session.repository(), session.user_id())?)
    }

    /// Recomputes credits minus debits and compares it with the stored balance.
    pub fn reconcile(&self, session: &Session) -> Result<Reconciliation, ServiceError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = entries_for(session.repository(), session.user_id())?;
        let (credits, debits) = entries.iter().fold(
            (BigDecimal::zero(), BigDecimal::zero()),
            |(credits, debits), entry| {
                if entry.kind.is_debit() {
                    (credits, debits + &entry.amount)
                } else {
                    (credits + &entry.amount, debits)
                }
            },
        );
        let expected = &credits - &debits;
        let actual = session.credit()?;
        Ok(Reconciliation {
            consistent: expected == actual,
            credits,
            debits,
            expected,
            actual,
        })
    }
}
