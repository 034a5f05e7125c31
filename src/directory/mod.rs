use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{Account, AccountError},
    identity::{Passport, PhoneNumber},
};

pub mod in_memory_directory;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error("Account with passport {0} already exists")]
    DuplicatePassport(Passport),
    #[error("Account with phone {0} already exists")]
    DuplicatePhone(PhoneNumber),
    #[error("Account with passport {0} not found")]
    PassportNotFound(Passport),
    #[error("Account with phone {0} not found")]
    PhoneNotFound(PhoneNumber),
    #[error("Cannot transfer money to the same account")]
    SelfTransfer,
}

/// Collection of accounts keyed by passport, searchable by phone.
pub trait AccountDirectory {
    fn open(&mut self, account: Account) -> Result<&Account, DirectoryError>;

    fn find_by_passport(&self, passport: Passport) -> Option<&Account>;

    fn find_by_phone(&self, phone: &PhoneNumber) -> Option<&Account>;

    /// Accounts in the order they were opened.
    fn accounts(&self) -> impl Iterator<Item = &Account>;

    fn deposit(&mut self, passport: Passport, amount: Decimal) -> Result<(), DirectoryError>;

    fn withdraw(&mut self, passport: Passport, amount: Decimal) -> Result<(), DirectoryError>;

    fn transfer(
        &mut self,
        from: Passport,
        to: &PhoneNumber,
        amount: Decimal,
    ) -> Result<(), DirectoryError>;

    /// Archives the account and removes it, returning the balance paid out.
    fn close(&mut self, passport: Passport) -> Result<Decimal, DirectoryError>;
}
