use std::fmt;

use chrono::{DateTime, Local};
use rust_decimal::Decimal;

use crate::identity::Passport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Transfer,
    Withdraw,
    Deposit,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Transfer => "transfer",
            OperationKind::Withdraw => "withdraw",
            OperationKind::Deposit => "deposit",
        })
    }
}

/// Side the other account took in a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterpartyRole {
    Recipient,
    Sender,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterparty {
    pub name: String,
    pub passport: Passport,
    pub role: CounterpartyRole,
}

/// A single ledger action as recorded in an account history.
///
/// `amount` is the principal and `fee` the surcharge actually debited on top
/// of it. Deposits carry no fee; the receiving side of a transfer records
/// the fee the sender paid.
#[derive(Debug, Clone)]
pub struct Operation {
    kind: OperationKind,
    amount: Decimal,
    fee: Decimal,
    counterparty: Option<Counterparty>,
    created_at: DateTime<Local>,
}

impl Operation {
    pub(crate) fn deposit(amount: Decimal) -> Self {
        Self::new(OperationKind::Deposit, amount, Decimal::ZERO, None)
    }

    pub(crate) fn withdraw(amount: Decimal, fee: Decimal) -> Self {
        Self::new(OperationKind::Withdraw, amount, fee, None)
    }

    pub(crate) fn transfer(amount: Decimal, fee: Decimal, counterparty: Counterparty) -> Self {
        Self::new(OperationKind::Transfer, amount, fee, Some(counterparty))
    }

    fn new(
        kind: OperationKind,
        amount: Decimal,
        fee: Decimal,
        counterparty: Option<Counterparty>,
    ) -> Self {
        Self {
            kind,
            amount,
            fee,
            counterparty,
            created_at: Local::now(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn fee(&self) -> Decimal {
        self.fee
    }

    pub fn counterparty(&self) -> Option<&Counterparty> {
        self.counterparty.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}) {}: sum: {}",
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.amount.normalize()
        )?;
        if !self.fee.is_zero() {
            write!(f, " fee: {}", self.fee.normalize())?;
        }
        match &self.counterparty {
            Some(Counterparty {
                name,
                role: CounterpartyRole::Recipient,
                ..
            }) => write!(f, " to {name}"),
            Some(Counterparty {
                name,
                role: CounterpartyRole::Sender,
                ..
            }) => write!(f, " from {name}"),
            None => Ok(()),
        }
    }
}
