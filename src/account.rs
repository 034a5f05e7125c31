use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{
    identity::{Passport, PhoneNumber},
    operation::{Counterparty, CounterpartyRole, Operation},
};

/// Fee, in percent, charged on withdrawals and outgoing transfers.
pub const BASE_FEE: Decimal = Decimal::from_parts(2, 0, 0, false, 0);
/// Fee, in percent, a credit account pays while its balance is negative.
pub const NEGATIVE_BALANCE_FEE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
/// Overdraft limit given to a credit account when none is specified.
pub const DEFAULT_NEGATIVE_LIMIT: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Passport number must contain digits only")]
    PassportDigits,
    #[error("Passport number must have exactly 8 digits")]
    PassportLength,
    #[error("Phone number must match the +7DDD-DDD-DD-DD format")]
    PhoneFormat,
    #[error("Negative limit must not be negative, got {limit}")]
    NegativeLimit { limit: Decimal },
    #[error("Opening balance {balance} is below the allowed minimum of {minimum}")]
    OpeningBalance { balance: Decimal, minimum: Decimal },
    #[error("Amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Decimal },
    #[error("Amount {amount} is too large")]
    AmountTooLarge { amount: Decimal },
    #[error("Account is archived, all operations are suspended")]
    Archived,
    #[error("Account with a negative balance cannot be archived")]
    NegativeBalanceArchive,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Debit,
    /// Balance may go down to `-negative_limit`.
    Credit { negative_limit: Decimal },
}

impl AccountKind {
    pub fn negative_limit(self) -> Decimal {
        match self {
            AccountKind::Debit => Decimal::ZERO,
            AccountKind::Credit { negative_limit } => negative_limit,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum AccountEventKind {
    Deposited,
    Withdrawn,
}

/// Validated balance change, produced by `handle_*` and consumed by `apply`.
#[derive(Debug)]
struct AccountEvent {
    amount: Decimal,
    fee: Decimal,
    kind: AccountEventKind,
}

#[derive(Debug)]
pub struct Account {
    name: String,
    passport: Passport,
    phone: PhoneNumber,
    balance: Decimal,
    kind: AccountKind,
    archived: bool,
    history: Vec<Operation>,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        passport: &str,
        phone: &str,
        start_balance: Decimal,
    ) -> Result<Self, ValidationError> {
        Self::with_kind(name, passport, phone, start_balance, AccountKind::Debit)
    }

    pub fn new_credit(
        name: impl Into<String>,
        passport: &str,
        phone: &str,
        start_balance: Decimal,
        negative_limit: Decimal,
    ) -> Result<Self, ValidationError> {
        if negative_limit < Decimal::ZERO {
            return Err(ValidationError::NegativeLimit {
                limit: negative_limit,
            });
        }
        Self::with_kind(
            name,
            passport,
            phone,
            start_balance,
            AccountKind::Credit { negative_limit },
        )
    }

    fn with_kind(
        name: impl Into<String>,
        passport: &str,
        phone: &str,
        start_balance: Decimal,
        kind: AccountKind,
    ) -> Result<Self, ValidationError> {
        let passport = passport.parse()?;
        let phone = phone.parse()?;
        let minimum = -kind.negative_limit();
        if start_balance < minimum {
            return Err(ValidationError::OpeningBalance {
                balance: start_balance,
                minimum,
            });
        }
        Ok(Self {
            name: name.into(),
            passport,
            phone,
            balance: start_balance,
            kind,
            archived: false,
            history: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passport(&self) -> Passport {
        self.passport
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn history(&self) -> &[Operation] {
        &self.history
    }

    /// One history line per operation, oldest first.
    pub fn history_report(&self) -> String {
        self.history
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Current fee in percent. Read at the start of every debit, so an
    /// operation that drives a credit account negative is still charged the
    /// base rate.
    pub fn fee(&self) -> Decimal {
        match self.kind {
            AccountKind::Credit { .. } if self.balance < Decimal::ZERO => NEGATIVE_BALANCE_FEE,
            _ => BASE_FEE,
        }
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        let event = self.handle_deposit(amount)?;
        self.apply(&event);
        self.history.push(Operation::deposit(event.amount));
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), AccountError> {
        let event = self.handle_withdraw(amount)?;
        self.apply(&event);
        self.history.push(Operation::withdraw(event.amount, event.fee));
        Ok(())
    }

    /// Moves `amount` to `target`, charging the fee to `self`.
    ///
    /// Both sides are validated before either balance changes, so a failed
    /// transfer leaves both accounts untouched.
    pub fn transfer(&mut self, target: &mut Account, amount: Decimal) -> Result<(), AccountError> {
        let debit = self.handle_withdraw(amount)?;
        let credit = target.handle_deposit(amount)?;
        self.apply(&debit);
        target.apply(&credit);

        self.history.push(Operation::transfer(
            amount,
            debit.fee,
            Counterparty {
                name: target.name.clone(),
                passport: target.passport,
                role: CounterpartyRole::Recipient,
            },
        ));
        target.history.push(Operation::transfer(
            amount,
            debit.fee,
            Counterparty {
                name: self.name.clone(),
                passport: self.passport,
                role: CounterpartyRole::Sender,
            },
        ));
        Ok(())
    }

    /// Archives the account, zeroing its balance.
    pub fn to_archive(&mut self) -> Result<(), ValidationError> {
        if self.balance < Decimal::ZERO {
            return Err(ValidationError::NegativeBalanceArchive);
        }
        debug!(passport = %self.passport, balance = %self.balance, "archiving account");
        self.balance = Decimal::ZERO;
        self.archived = true;
        Ok(())
    }

    pub fn restore(&mut self) {
        debug!(passport = %self.passport, "restoring account");
        self.archived = false;
    }

    pub fn full_info(&self) -> String {
        format!(
            "{}{} balance: {}. Passport: {}. Phone: {}",
            self.marker(),
            self.name,
            self.balance.normalize(),
            self.passport,
            self.phone
        )
    }

    fn marker(&self) -> &'static str {
        match self.kind {
            AccountKind::Debit => "",
            AccountKind::Credit { .. } => "<K> ",
        }
    }

    fn apply(&mut self, event: &AccountEvent) {
        match event.kind {
            AccountEventKind::Deposited => {
                self.balance += event.amount;
            }
            AccountEventKind::Withdrawn => {
                self.balance -= event.amount + event.fee;
            }
        }
        debug!(
            passport = %self.passport,
            kind = ?event.kind,
            amount = %event.amount,
            fee = %event.fee,
            balance = %self.balance,
            "balance changed"
        );
    }

    fn handle_deposit(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        self.ensure_active()?;
        ensure_positive(amount)?;
        if self.balance.checked_add(amount).is_none() {
            return Err(ValidationError::AmountTooLarge { amount }.into());
        }
        Ok(AccountEvent {
            amount,
            fee: Decimal::ZERO,
            kind: AccountEventKind::Deposited,
        })
    }

    fn handle_withdraw(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        self.ensure_active()?;
        ensure_positive(amount)?;
        let too_large = || ValidationError::AmountTooLarge { amount };
        let fee = amount
            .checked_mul(self.fee())
            .and_then(|charge| charge.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(too_large)?;
        let required = amount.checked_add(fee).ok_or_else(too_large)?;
        let available = self
            .balance
            .checked_add(self.kind.negative_limit())
            .unwrap_or(Decimal::MAX);
        if required > available {
            return Err(AccountError::InsufficientFunds {
                required: required.normalize(),
                available: available.normalize(),
            });
        }
        Ok(AccountEvent {
            amount,
            fee,
            kind: AccountEventKind::Withdrawn,
        })
    }

    fn ensure_active(&self) -> Result<(), ValidationError> {
        if self.archived {
            Err(ValidationError::Archived)
        } else {
            Ok(())
        }
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), ValidationError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveAmount { amount })
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} balance: {}.",
            self.marker(),
            self.name,
            self.balance.normalize()
        )
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::prelude::FromPrimitive;

    use crate::operation::OperationKind;

    use super::*;

    fn petr() -> Account {
        Account::new("Petr", "12345677", "+7900-800-11-33", Decimal::ZERO).unwrap()
    }

    fn ivan() -> Account {
        Account::new_credit(
            "Ivan",
            "12385498",
            "+7900-800-11-22",
            Decimal::from_u32(3000).unwrap(),
            Decimal::from_u32(1000).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn create_accounts() {
        let acc = petr();
        let info = acc.full_info();
        assert!(info.contains("Petr"));
        assert!(info.contains("12345677"));
        assert!(info.contains("+7900-800-11-33"));
        assert_eq!(acc.to_string(), "Petr balance: 0.");
        assert_eq!(acc.fee(), BASE_FEE);

        let acc = ivan();
        assert_eq!(
            acc.full_info(),
            "<K> Ivan balance: 3000. Passport: 12385498. Phone: +7900-800-11-22"
        );
        assert_eq!(acc.to_string(), "<K> Ivan balance: 3000.");
        assert_eq!(acc.kind().negative_limit(), Decimal::from_u32(1000).unwrap());
    }

    #[test]
    fn reject_invalid_identity() {
        let err = Account::new("Petr", "1234567x", "+7900-800-11-33", Decimal::ZERO).unwrap_err();
        assert_eq!(err, ValidationError::PassportDigits);
        assert_eq!(err.to_string(), "Passport number must contain digits only");

        let err = Account::new("Petr", "1234567", "+7900-800-11-33", Decimal::ZERO).unwrap_err();
        assert_eq!(err, ValidationError::PassportLength);

        let err = Account::new("Petr", "12345677", "89008001133", Decimal::ZERO).unwrap_err();
        assert_eq!(err, ValidationError::PhoneFormat);

        let err = Account::new_credit(
            "Ivan",
            "12385498",
            "+7900-800-11-22",
            Decimal::ZERO,
            Decimal::from_i32(-1).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::NegativeLimit { .. }));

        let err = Account::new(
            "Petr",
            "12345677",
            "+7900-800-11-33",
            Decimal::from_i32(-1).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::OpeningBalance { .. }));
    }

    #[test]
    fn deposit_and_withdraw() {
        let mut acc = petr();
        acc.deposit(Decimal::from_u32(300).unwrap()).unwrap();
        assert_eq!(acc.balance(), Decimal::from_u32(300).unwrap());
        assert_eq!(acc.history().len(), 1);
        assert_eq!(acc.history()[0].kind(), OperationKind::Deposit);
        assert!(acc.history()[0].fee().is_zero());

        // 2% on top of the amount
        acc.withdraw(Decimal::from_u32(100).unwrap()).unwrap();
        assert_eq!(acc.balance(), Decimal::from_u32(198).unwrap());
        let op = &acc.history()[1];
        assert_eq!(op.kind(), OperationKind::Withdraw);
        assert_eq!(op.amount(), Decimal::from_u32(100).unwrap());
        assert_eq!(op.fee(), Decimal::from_u32(2).unwrap());

        let err = acc.deposit(Decimal::ZERO).unwrap_err();
        assert!(matches!(
            err,
            AccountError::Validation(ValidationError::NonPositiveAmount { .. })
        ));
        let err = acc.withdraw(Decimal::from_i32(-5).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            AccountError::Validation(ValidationError::NonPositiveAmount { .. })
        ));
        assert_eq!(acc.history().len(), 2);
    }

    #[test]
    fn withdraw_insufficient_funds() {
        let mut acc = petr();
        acc.deposit(Decimal::from_u32(100).unwrap()).unwrap();

        // 99 * 1.02 = 100.98
        let err = acc.withdraw(Decimal::from_u32(99).unwrap()).unwrap_err();
        assert!(matches!(err, AccountError::InsufficientFunds { .. }));
        assert_eq!(err.to_string(), "Insufficient funds: 100.98 required, 100 available");
        assert_eq!(acc.balance(), Decimal::from_u32(100).unwrap());
        assert_eq!(acc.history().len(), 1);

        // 98 * 1.02 = 99.96
        acc.withdraw(Decimal::from_u32(98).unwrap()).unwrap();
        assert_eq!(acc.balance(), Decimal::new(4, 2));
    }

    #[test]
    fn credit_overdraft_limit() {
        let mut acc = Account::new_credit(
            "Ivan",
            "12385498",
            "+7900-800-11-22",
            Decimal::from_u32(20).unwrap(),
            Decimal::from_u32(1000).unwrap(),
        )
        .unwrap();

        // one unit beyond: 1001 * 1.02 = 1021.02 > 20 + 1000
        let err = acc.withdraw(Decimal::from_u32(1001).unwrap()).unwrap_err();
        assert!(matches!(err, AccountError::InsufficientFunds { .. }));
        assert_eq!(acc.balance(), Decimal::from_u32(20).unwrap());

        // exactly down to the limit: 1000 * 1.02 = 1020
        acc.withdraw(Decimal::from_u32(1000).unwrap()).unwrap();
        assert_eq!(acc.balance(), Decimal::from_i32(-1000).unwrap());
    }

    #[test]
    fn credit_fee_tiers() {
        let mut acc = Account::new_credit(
            "Ivan",
            "12385498",
            "+7900-800-11-22",
            Decimal::from_u32(100).unwrap(),
            Decimal::from_u32(1000).unwrap(),
        )
        .unwrap();
        assert_eq!(acc.fee(), BASE_FEE);

        // evaluated while positive, so 2% even though it ends negative
        acc.withdraw(Decimal::from_u32(200).unwrap()).unwrap();
        assert_eq!(acc.balance(), Decimal::from_i32(-104).unwrap());
        assert_eq!(acc.history()[0].fee(), Decimal::from_u32(4).unwrap());
        assert_eq!(acc.fee(), NEGATIVE_BALANCE_FEE);

        acc.withdraw(Decimal::from_u32(100).unwrap()).unwrap();
        assert_eq!(acc.balance(), Decimal::from_i32(-209).unwrap());
        assert_eq!(acc.history()[1].fee(), Decimal::from_u32(5).unwrap());

        acc.deposit(Decimal::from_u32(209).unwrap()).unwrap();
        assert!(acc.balance().is_zero());
        assert_eq!(acc.fee(), BASE_FEE);
    }

    #[test]
    fn overdraft_scenario() {
        let mut acc = ivan();
        acc.deposit(Decimal::from_u32(300).unwrap()).unwrap();
        assert_eq!(acc.balance(), Decimal::from_u32(3300).unwrap());

        // 4500 * 1.02 = 4590 > 3300 + 1000
        let err = acc.withdraw(Decimal::from_u32(4500).unwrap()).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                required: Decimal::from_u32(4590).unwrap(),
                available: Decimal::from_u32(4300).unwrap(),
            }
        );
        assert_eq!(acc.balance(), Decimal::from_u32(3300).unwrap());
    }

    #[test]
    fn transfer_between_accounts() {
        let mut sender = ivan();
        let mut receiver = petr();

        sender
            .transfer(&mut receiver, Decimal::from_u32(500).unwrap())
            .unwrap();
        assert_eq!(sender.balance(), Decimal::from_u32(2490).unwrap());
        assert_eq!(receiver.balance(), Decimal::from_u32(500).unwrap());

        assert_eq!(sender.history().len(), 1);
        assert_eq!(receiver.history().len(), 1);
        let sent = &sender.history()[0];
        assert_eq!(sent.kind(), OperationKind::Transfer);
        assert_eq!(sent.fee(), Decimal::from_u32(10).unwrap());
        let to = sent.counterparty().unwrap();
        assert_eq!(to.name, "Petr");
        assert_eq!(to.role, CounterpartyRole::Recipient);
        let received = &receiver.history()[0];
        assert_eq!(received.amount(), Decimal::from_u32(500).unwrap());
        let from = received.counterparty().unwrap();
        assert_eq!(from.passport, sender.passport());
        assert_eq!(from.role, CounterpartyRole::Sender);

        // receiver cannot afford the fee
        let err = receiver
            .transfer(&mut sender, Decimal::from_u32(500).unwrap())
            .unwrap_err();
        assert!(matches!(err, AccountError::InsufficientFunds { .. }));
        assert_eq!(sender.balance(), Decimal::from_u32(2490).unwrap());
        assert_eq!(receiver.balance(), Decimal::from_u32(500).unwrap());
        assert_eq!(sender.history().len(), 1);
        assert_eq!(receiver.history().len(), 1);
    }

    #[test]
    fn transfer_fee_tiers() {
        let mut sender = Account::new_credit(
            "Ivan",
            "12385498",
            "+7900-800-11-22",
            Decimal::from_u32(100).unwrap(),
            Decimal::from_u32(1000).unwrap(),
        )
        .unwrap();
        let mut receiver = petr();

        // evaluated while positive: 2% even though the sender ends negative
        sender
            .transfer(&mut receiver, Decimal::from_u32(200).unwrap())
            .unwrap();
        assert_eq!(sender.balance(), Decimal::from_i32(-104).unwrap());
        assert_eq!(receiver.balance(), Decimal::from_u32(200).unwrap());
        assert_eq!(sender.history()[0].fee(), Decimal::from_u32(4).unwrap());
        assert_eq!(receiver.history()[0].fee(), Decimal::from_u32(4).unwrap());
        assert_eq!(sender.fee(), NEGATIVE_BALANCE_FEE);

        sender
            .transfer(&mut receiver, Decimal::from_u32(100).unwrap())
            .unwrap();
        assert_eq!(sender.balance(), Decimal::from_i32(-209).unwrap());
        assert_eq!(receiver.balance(), Decimal::from_u32(300).unwrap());
        assert_eq!(sender.history()[1].fee(), Decimal::from_u32(5).unwrap());
        assert_eq!(receiver.history()[1].fee(), Decimal::from_u32(5).unwrap());
    }

    #[test]
    fn huge_amounts_are_rejected() {
        let mut acc = petr();
        acc.deposit(Decimal::from_u32(100).unwrap()).unwrap();

        let err = acc.withdraw(Decimal::MAX).unwrap_err();
        assert_eq!(
            err,
            AccountError::Validation(ValidationError::AmountTooLarge {
                amount: Decimal::MAX
            })
        );
        let err = acc.deposit(Decimal::MAX).unwrap_err();
        assert!(matches!(
            err,
            AccountError::Validation(ValidationError::AmountTooLarge { .. })
        ));
        assert_eq!(acc.balance(), Decimal::from_u32(100).unwrap());
        assert_eq!(acc.history().len(), 1);

        // sender side overflows
        let mut receiver = ivan();
        let err = acc.transfer(&mut receiver, Decimal::MAX).unwrap_err();
        assert!(matches!(
            err,
            AccountError::Validation(ValidationError::AmountTooLarge { .. })
        ));

        // receiver side overflows
        let mut rich =
            Account::new("Rich", "87654321", "+7900-800-11-44", Decimal::MAX).unwrap();
        let err = receiver
            .transfer(&mut rich, Decimal::from_u32(10).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            AccountError::Validation(ValidationError::AmountTooLarge { .. })
        ));
        assert_eq!(receiver.balance(), Decimal::from_u32(3000).unwrap());
        assert_eq!(rich.balance(), Decimal::MAX);
        assert!(receiver.history().is_empty());
        assert!(rich.history().is_empty());
        assert_eq!(acc.balance(), Decimal::from_u32(100).unwrap());
    }

    #[test]
    fn transfer_to_archived_account_changes_nothing() {
        let mut sender = ivan();
        let mut receiver = petr();
        receiver.to_archive().unwrap();

        let err = sender
            .transfer(&mut receiver, Decimal::from_u32(100).unwrap())
            .unwrap_err();
        assert_eq!(err, AccountError::Validation(ValidationError::Archived));
        assert_eq!(sender.balance(), Decimal::from_u32(3000).unwrap());
        assert!(sender.history().is_empty());
        assert!(receiver.history().is_empty());
    }

    #[test]
    fn archive_and_restore() {
        let mut acc = petr();
        acc.deposit(Decimal::from_u32(300).unwrap()).unwrap();

        acc.to_archive().unwrap();
        assert!(acc.is_archived());
        assert!(acc.balance().is_zero());

        let err = acc.deposit(Decimal::from_u32(1).unwrap()).unwrap_err();
        assert_eq!(err, AccountError::Validation(ValidationError::Archived));
        assert_eq!(
            err.to_string(),
            "Account is archived, all operations are suspended"
        );
        let err = acc.withdraw(Decimal::from_u32(1).unwrap()).unwrap_err();
        assert_eq!(err, AccountError::Validation(ValidationError::Archived));
        let mut other = ivan();
        let err = acc
            .transfer(&mut other, Decimal::from_u32(1).unwrap())
            .unwrap_err();
        assert_eq!(err, AccountError::Validation(ValidationError::Archived));

        acc.restore();
        assert!(!acc.is_archived());
        acc.deposit(Decimal::from_u32(10).unwrap()).unwrap();
        assert_eq!(acc.balance(), Decimal::from_u32(10).unwrap());
    }

    #[test]
    fn archive_negative_balance() {
        let mut acc = ivan();
        acc.withdraw(Decimal::from_u32(3500).unwrap()).unwrap();
        let balance = acc.balance();
        assert!(balance < Decimal::ZERO);

        let err = acc.to_archive().unwrap_err();
        assert_eq!(err, ValidationError::NegativeBalanceArchive);
        assert_eq!(acc.balance(), balance);
        assert!(!acc.is_archived());
    }

    #[test]
    fn history_report_lines() {
        let mut acc = petr();
        assert_eq!(acc.history_report(), "");
        acc.deposit(Decimal::from_u32(300).unwrap()).unwrap();
        acc.withdraw(Decimal::from_u32(100).unwrap()).unwrap();
        let report = acc.history_report();
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("deposit: sum: 300"));
        assert!(lines[1].ends_with("withdraw: sum: 100 fee: 2"));
    }
}
