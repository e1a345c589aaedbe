use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use super::error::StorageError;
use super::traits::Ledger;
use crate::domain::{
    AccountId, AmountType, DateRange, DomainError, TransactionDraft, TransactionId,
    TransactionKind, TransactionRecord,
};

/// DashMap-based concurrent ledger.
///
/// Rows are immutable once appended; the loan lifecycle mutations go through
/// `approve_loan` and `mark_loan_paid` only.
pub struct ConcurrentLedger<A: AmountType> {
    records: DashMap<TransactionId, TransactionRecord<A>>,
    next_id: AtomicU64,
}

impl<A: AmountType> ConcurrentLedger<A> {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Number of rows in the ledger
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Validate a draft and stamp it with an id and timestamp.
    fn seal(&self, draft: TransactionDraft<A>) -> Result<TransactionRecord<A>, StorageError> {
        // Ledger rows always carry a strictly positive amount
        if draft.amount <= A::zero() {
            return Err(StorageError::Domain(DomainError::InvalidAmount));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(TransactionRecord {
            id,
            account_id: draft.account_id,
            recipient_account_id: draft.recipient_account_id,
            kind: draft.kind,
            amount: draft.amount,
            balance_after: draft.balance_after,
            loan_approved: draft.loan_approved,
            timestamp: draft.timestamp.unwrap_or_else(Utc::now),
        })
    }
}

impl<A: AmountType> Default for ConcurrentLedger<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AmountType> Ledger<A> for ConcurrentLedger<A> {
    fn append(&self, draft: TransactionDraft<A>) -> Result<TransactionRecord<A>, StorageError> {
        let record = self.seal(draft)?;
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn append_all(
        &self,
        drafts: Vec<TransactionDraft<A>>,
    ) -> Result<Vec<TransactionRecord<A>>, StorageError> {
        // Seal everything before inserting anything, so a rejected draft
        // leaves the ledger untouched.
        let records = drafts
            .into_iter()
            .map(|draft| self.seal(draft))
            .collect::<Result<Vec<_>, _>>()?;

        for record in &records {
            self.records.insert(record.id, record.clone());
        }
        Ok(records)
    }

    fn get(&self, id: TransactionId) -> Option<TransactionRecord<A>> {
        self.records.get(&id).map(|entry| entry.clone())
    }

    fn approve_loan(&self, id: TransactionId) -> Result<TransactionRecord<A>, StorageError> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or(StorageError::RecordNotFound(id))?;

        if entry.kind != TransactionKind::Loan || entry.loan_approved {
            return Err(StorageError::InvalidRecordState(id));
        }

        entry.loan_approved = true;
        Ok(entry.clone())
    }

    fn mark_loan_paid(
        &self,
        id: TransactionId,
        balance_after: A,
    ) -> Result<TransactionRecord<A>, StorageError> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or(StorageError::RecordNotFound(id))?;

        // Only approved Loan rows are payable; a LoanPaid row means the
        // payoff already happened.
        if entry.kind != TransactionKind::Loan || !entry.loan_approved {
            return Err(StorageError::InvalidRecordState(id));
        }

        entry.kind = TransactionKind::LoanPaid;
        entry.balance_after = balance_after;
        Ok(entry.clone())
    }

    fn history(
        &self,
        account_id: AccountId,
        range: Option<DateRange>,
    ) -> Vec<TransactionRecord<A>> {
        let mut rows: Vec<TransactionRecord<A>> = self
            .records
            .iter()
            .filter(|entry| entry.account_id == account_id)
            .filter(|entry| range.is_none_or(|r| r.contains(entry.timestamp)))
            .map(|entry| entry.clone())
            .collect();

        // Most recent first; id breaks ties between same-instant rows
        rows.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        rows
    }

    fn sum_amount(&self, range: DateRange) -> Result<A, StorageError> {
        let mut total = A::zero();
        for entry in self.records.iter() {
            if range.contains(entry.timestamp) {
                total = total
                    .checked_add(entry.amount)
                    .ok_or(StorageError::Domain(DomainError::Overflow))?;
            }
        }
        Ok(total)
    }

    fn count_approved_loans(&self, account_id: AccountId) -> usize {
        self.records
            .iter()
            .filter(|entry| entry.account_id == account_id && entry.is_payable_loan())
            .count()
    }
}

// Implement Ledger for Arc<ConcurrentLedger> so the engine and external
// collaborators (approval, reports) can share one ledger.
impl<A: AmountType> Ledger<A> for std::sync::Arc<ConcurrentLedger<A>> {
    fn append(&self, draft: TransactionDraft<A>) -> Result<TransactionRecord<A>, StorageError> {
        (**self).append(draft)
    }

    fn append_all(
        &self,
        drafts: Vec<TransactionDraft<A>>,
    ) -> Result<Vec<TransactionRecord<A>>, StorageError> {
        (**self).append_all(drafts)
    }

    fn get(&self, id: TransactionId) -> Option<TransactionRecord<A>> {
        (**self).get(id)
    }

    fn approve_loan(&self, id: TransactionId) -> Result<TransactionRecord<A>, StorageError> {
        (**self).approve_loan(id)
    }

    fn mark_loan_paid(
        &self,
        id: TransactionId,
        balance_after: A,
    ) -> Result<TransactionRecord<A>, StorageError> {
        (**self).mark_loan_paid(id, balance_after)
    }

    fn history(
        &self,
        account_id: AccountId,
        range: Option<DateRange>,
    ) -> Vec<TransactionRecord<A>> {
        (**self).history(account_id, range)
    }

    fn sum_amount(&self, range: DateRange) -> Result<A, StorageError> {
        (**self).sum_amount(range)
    }

    fn count_approved_loans(&self, account_id: AccountId) -> usize {
        (**self).count_approved_loans(account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FixedPoint;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn deposit_draft(account_id: AccountId, amount: i64) -> TransactionDraft<FixedPoint> {
        TransactionDraft::new(
            account_id,
            TransactionKind::Deposit,
            FixedPoint::from_raw(amount),
            FixedPoint::from_raw(amount),
        )
    }

    fn dated(
        draft: TransactionDraft<FixedPoint>,
        y: i32,
        m: u32,
        d: u32,
    ) -> TransactionDraft<FixedPoint> {
        draft.at(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn append_assigns_sequential_ids() {
        let ledger = ConcurrentLedger::new();

        let first = ledger.append(deposit_draft(1, 100)).unwrap();
        let second = ledger.append(deposit_draft(1, 200)).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn append_assigns_timestamp_when_absent() {
        let ledger = ConcurrentLedger::new();

        let before = Utc::now();
        let record = ledger.append(deposit_draft(1, 100)).unwrap();
        let after = Utc::now();

        assert!(record.timestamp >= before && record.timestamp <= after);
    }

    #[test]
    fn append_keeps_explicit_timestamp() {
        let ledger = ConcurrentLedger::new();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();

        let record = ledger.append(deposit_draft(1, 100).at(ts)).unwrap();

        assert_eq!(record.timestamp, ts);
    }

    #[test]
    fn append_rejects_non_positive_amount() {
        let ledger = ConcurrentLedger::new();

        let draft = TransactionDraft::new(
            1,
            TransactionKind::Deposit,
            FixedPoint::zero(),
            FixedPoint::zero(),
        );
        let result = ledger.append(draft);

        assert!(matches!(
            result,
            Err(StorageError::Domain(DomainError::InvalidAmount))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn append_all_is_all_or_nothing() {
        let ledger = ConcurrentLedger::new();

        let bad = TransactionDraft::new(
            2,
            TransactionKind::Transfer,
            FixedPoint::zero(),
            FixedPoint::zero(),
        );
        let result = ledger.append_all(vec![deposit_draft(1, 100), bad]);

        assert!(result.is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn append_all_persists_every_row() {
        let ledger = ConcurrentLedger::new();

        let records = ledger
            .append_all(vec![deposit_draft(1, 100), deposit_draft(2, 200)])
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.get(records[0].id).is_some());
        assert!(ledger.get(records[1].id).is_some());
    }

    #[test]
    fn get_returns_none_for_unknown_id() {
        let ledger = ConcurrentLedger::<FixedPoint>::new();
        assert!(ledger.get(999).is_none());
    }

    #[test]
    fn approve_loan_flips_flag() {
        let ledger = ConcurrentLedger::new();
        let loan = ledger
            .append(TransactionDraft::new(
                1,
                TransactionKind::Loan,
                FixedPoint::from_raw(5_000),
                FixedPoint::from_raw(1_000),
            ))
            .unwrap();
        assert!(!loan.loan_approved);

        let approved = ledger.approve_loan(loan.id).unwrap();
        assert!(approved.loan_approved);
        assert_eq!(approved.kind, TransactionKind::Loan);
        assert!(ledger.get(loan.id).unwrap().loan_approved);
    }

    #[test]
    fn approve_loan_twice_fails() {
        let ledger = ConcurrentLedger::new();
        let loan = ledger
            .append(TransactionDraft::new(
                1,
                TransactionKind::Loan,
                FixedPoint::from_raw(5_000),
                FixedPoint::from_raw(1_000),
            ))
            .unwrap();

        ledger.approve_loan(loan.id).unwrap();
        let result = ledger.approve_loan(loan.id);

        assert!(matches!(
            result,
            Err(StorageError::InvalidRecordState(id)) if id == loan.id
        ));
    }

    #[test]
    fn approve_non_loan_row_fails() {
        let ledger = ConcurrentLedger::new();
        let deposit = ledger.append(deposit_draft(1, 100)).unwrap();

        let result = ledger.approve_loan(deposit.id);
        assert!(matches!(result, Err(StorageError::InvalidRecordState(_))));
    }

    #[test]
    fn approve_missing_row_fails() {
        let ledger = ConcurrentLedger::<FixedPoint>::new();
        assert!(matches!(
            ledger.approve_loan(42),
            Err(StorageError::RecordNotFound(42))
        ));
    }

    #[test]
    fn mark_loan_paid_retags_and_snapshots() {
        let ledger = ConcurrentLedger::new();
        let loan = ledger
            .append(TransactionDraft::new(
                1,
                TransactionKind::Loan,
                FixedPoint::from_raw(5_000),
                FixedPoint::from_raw(10_000),
            ))
            .unwrap();
        ledger.approve_loan(loan.id).unwrap();

        let paid = ledger
            .mark_loan_paid(loan.id, FixedPoint::from_raw(5_000))
            .unwrap();

        assert_eq!(paid.kind, TransactionKind::LoanPaid);
        assert!(paid.loan_approved);
        assert_eq!(paid.balance_after, FixedPoint::from_raw(5_000));
        // Amount and account stay untouched
        assert_eq!(paid.amount, FixedPoint::from_raw(5_000));
        assert_eq!(paid.account_id, 1);
    }

    #[test]
    fn mark_loan_paid_requires_approval() {
        let ledger = ConcurrentLedger::new();
        let loan = ledger
            .append(TransactionDraft::new(
                1,
                TransactionKind::Loan,
                FixedPoint::from_raw(5_000),
                FixedPoint::from_raw(10_000),
            ))
            .unwrap();

        let result = ledger.mark_loan_paid(loan.id, FixedPoint::from_raw(5_000));
        assert!(matches!(result, Err(StorageError::InvalidRecordState(_))));
    }

    #[test]
    fn mark_loan_paid_twice_fails() {
        let ledger = ConcurrentLedger::new();
        let loan = ledger
            .append(TransactionDraft::new(
                1,
                TransactionKind::Loan,
                FixedPoint::from_raw(5_000),
                FixedPoint::from_raw(10_000),
            ))
            .unwrap();
        ledger.approve_loan(loan.id).unwrap();
        ledger
            .mark_loan_paid(loan.id, FixedPoint::from_raw(5_000))
            .unwrap();

        let result = ledger.mark_loan_paid(loan.id, FixedPoint::from_raw(0));
        assert!(matches!(result, Err(StorageError::InvalidRecordState(_))));
    }

    #[test]
    fn mark_loan_paid_missing_row_fails() {
        let ledger = ConcurrentLedger::<FixedPoint>::new();
        assert!(matches!(
            ledger.mark_loan_paid(42, FixedPoint::zero()),
            Err(StorageError::RecordNotFound(42))
        ));
    }

    #[test]
    fn history_filters_by_account_most_recent_first() {
        let ledger = ConcurrentLedger::new();
        ledger
            .append(dated(deposit_draft(1, 100), 2024, 3, 1))
            .unwrap();
        ledger
            .append(dated(deposit_draft(2, 999), 2024, 3, 2))
            .unwrap();
        ledger
            .append(dated(deposit_draft(1, 300), 2024, 3, 3))
            .unwrap();

        let rows = ledger.history(1, None);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, FixedPoint::from_raw(300));
        assert_eq!(rows[1].amount, FixedPoint::from_raw(100));
    }

    #[test]
    fn history_date_range_is_inclusive() {
        let ledger = ConcurrentLedger::new();
        ledger
            .append(dated(deposit_draft(1, 100), 2024, 3, 1))
            .unwrap();
        ledger
            .append(dated(deposit_draft(1, 200), 2024, 3, 15))
            .unwrap();
        ledger
            .append(dated(deposit_draft(1, 300), 2024, 3, 31))
            .unwrap();
        ledger
            .append(dated(deposit_draft(1, 400), 2024, 4, 1))
            .unwrap();

        let range = DateRange::new(day(2024, 3, 1), day(2024, 3, 31));
        let rows = ledger.history(1, Some(range));

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.amount != FixedPoint::from_raw(400)));
    }

    #[test]
    fn history_has_no_duplicate_rows() {
        let ledger = ConcurrentLedger::new();
        for _ in 0..5 {
            ledger
                .append(dated(deposit_draft(1, 100), 2024, 3, 1))
                .unwrap();
        }

        let rows = ledger.history(1, None);
        let mut ids: Vec<_> = rows.iter().map(|r| r.id).collect();
        ids.dedup();

        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn sum_amount_spans_all_accounts() {
        let ledger = ConcurrentLedger::new();
        ledger
            .append(dated(deposit_draft(1, 100), 2024, 3, 10))
            .unwrap();
        ledger
            .append(dated(deposit_draft(2, 250), 2024, 3, 20))
            .unwrap();
        ledger
            .append(dated(deposit_draft(3, 999), 2024, 4, 1))
            .unwrap();

        let range = DateRange::new(day(2024, 3, 1), day(2024, 3, 31));
        let total = ledger.sum_amount(range).unwrap();

        // Accounts 1 and 2 both fall in range; the aggregate is not
        // per-account.
        assert_eq!(total, FixedPoint::from_raw(350));
    }

    #[test]
    fn count_approved_loans_ignores_pending_and_paid() {
        let ledger = ConcurrentLedger::new();

        let pending = ledger
            .append(TransactionDraft::new(
                1,
                TransactionKind::Loan,
                FixedPoint::from_raw(1_000),
                FixedPoint::zero(),
            ))
            .unwrap();
        let approved = ledger
            .append(TransactionDraft::new(
                1,
                TransactionKind::Loan,
                FixedPoint::from_raw(2_000),
                FixedPoint::zero(),
            ))
            .unwrap();
        let paid = ledger
            .append(TransactionDraft::new(
                1,
                TransactionKind::Loan,
                FixedPoint::from_raw(3_000),
                FixedPoint::from_raw(10_000),
            ))
            .unwrap();

        ledger.approve_loan(approved.id).unwrap();
        ledger.approve_loan(paid.id).unwrap();
        ledger
            .mark_loan_paid(paid.id, FixedPoint::from_raw(7_000))
            .unwrap();

        assert_eq!(ledger.count_approved_loans(1), 1);
        assert!(!ledger.get(pending.id).unwrap().loan_approved);
    }

    #[test]
    fn count_approved_loans_is_per_account() {
        let ledger = ConcurrentLedger::new();

        for account in [1, 1, 2] {
            let loan = ledger
                .append(TransactionDraft::new(
                    account,
                    TransactionKind::Loan,
                    FixedPoint::from_raw(1_000),
                    FixedPoint::zero(),
                ))
                .unwrap();
            ledger.approve_loan(loan.id).unwrap();
        }

        assert_eq!(ledger.count_approved_loans(1), 2);
        assert_eq!(ledger.count_approved_loans(2), 1);
        assert_eq!(ledger.count_approved_loans(3), 0);
    }
}
