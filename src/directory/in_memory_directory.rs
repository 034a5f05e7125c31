use rust_decimal::Decimal;
use tracing::info;

use crate::{
    account::{Account, AccountError},
    identity::{Passport, PhoneNumber},
};

use super::{AccountDirectory, DirectoryError};

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    accounts: Vec<Account>,
}

impl InMemoryDirectory {
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn position_by_passport(&self, passport: Passport) -> Result<usize, DirectoryError> {
        self.accounts
            .iter()
            .position(|acc| acc.passport() == passport)
            .ok_or(DirectoryError::PassportNotFound(passport))
    }

    fn position_by_phone(&self, phone: &PhoneNumber) -> Result<usize, DirectoryError> {
        self.accounts
            .iter()
            .position(|acc| acc.phone() == phone)
            .ok_or_else(|| DirectoryError::PhoneNotFound(phone.clone()))
    }

    fn get_mut(&mut self, passport: Passport) -> Result<&mut Account, DirectoryError> {
        let idx = self.position_by_passport(passport)?;
        Ok(&mut self.accounts[idx])
    }
}

impl AccountDirectory for InMemoryDirectory {
    fn open(&mut self, account: Account) -> Result<&Account, DirectoryError> {
        if self.find_by_passport(account.passport()).is_some() {
            return Err(DirectoryError::DuplicatePassport(account.passport()));
        }
        if self.find_by_phone(account.phone()).is_some() {
            return Err(DirectoryError::DuplicatePhone(account.phone().clone()));
        }
        info!(passport = %account.passport(), kind = ?account.kind(), "account opened");
        self.accounts.push(account);
        Ok(&self.accounts[self.accounts.len() - 1])
    }

    fn find_by_passport(&self, passport: Passport) -> Option<&Account> {
        self.accounts.iter().find(|acc| acc.passport() == passport)
    }

    fn find_by_phone(&self, phone: &PhoneNumber) -> Option<&Account> {
        self.accounts.iter().find(|acc| acc.phone() == phone)
    }

    fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    fn deposit(&mut self, passport: Passport, amount: Decimal) -> Result<(), DirectoryError> {
        Ok(self.get_mut(passport)?.deposit(amount)?)
    }

    fn withdraw(&mut self, passport: Passport, amount: Decimal) -> Result<(), DirectoryError> {
        Ok(self.get_mut(passport)?.withdraw(amount)?)
    }

    fn transfer(
        &mut self,
        from: Passport,
        to: &PhoneNumber,
        amount: Decimal,
    ) -> Result<(), DirectoryError> {
        let from_idx = self.position_by_passport(from)?;
        let to_idx = self.position_by_phone(to)?;
        // need two disjoint mutable borrows
        let (sender, receiver) = match from_idx.cmp(&to_idx) {
            std::cmp::Ordering::Equal => return Err(DirectoryError::SelfTransfer),
            std::cmp::Ordering::Less => {
                let (head, tail) = self.accounts.split_at_mut(to_idx);
                (&mut head[from_idx], &mut tail[0])
            }
            std::cmp::Ordering::Greater => {
                let (head, tail) = self.accounts.split_at_mut(from_idx);
                (&mut tail[0], &mut head[to_idx])
            }
        };
        sender.transfer(receiver, amount)?;
        Ok(())
    }

    fn close(&mut self, passport: Passport) -> Result<Decimal, DirectoryError> {
        let idx = self.position_by_passport(passport)?;
        let account = &mut self.accounts[idx];
        let paid_out = account.balance();
        account.to_archive().map_err(AccountError::from)?;
        self.accounts.remove(idx);
        info!(%passport, %paid_out, "account closed");
        Ok(paid_out)
    }
}
