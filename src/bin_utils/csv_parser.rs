use std::io::Read;

use csv::{DeserializeRecordsIntoIter, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    account::{Account, ValidationError},
    directory::{AccountDirectory, DirectoryError},
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Malformed row: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// One account to open at start-up. An empty `negative_limit` opens a
/// debit account.
#[derive(Debug, Deserialize)]
pub struct SeedAccount {
    pub name: String,
    pub passport: String,
    pub phone: String,
    pub balance: Decimal,
    pub negative_limit: Option<Decimal>,
}

impl SeedAccount {
    pub fn into_account(self) -> Result<Account, ValidationError> {
        match self.negative_limit {
            Some(limit) => Account::new_credit(
                self.name,
                &self.passport,
                &self.phone,
                self.balance,
                limit,
            ),
            None => Account::new(self.name, &self.passport, &self.phone, self.balance),
        }
    }
}

/// Parses seed accounts in CSV format, yielding each row with its line number.
pub struct CsvAccountParser<R> {
    iter: DeserializeRecordsIntoIter<R, SeedAccount>,
}

impl<R> CsvAccountParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        // consume the header so that positions below point at data rows
        reader.headers()?;

        Ok(Self {
            iter: reader.into_deserialize(),
        })
    }
}

impl<R> Iterator for CsvAccountParser<R>
where
    R: Read,
{
    type Item = (u64, Result<SeedAccount, csv::Error>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}

/// Opens every valid row in `directory`; rejected rows go to `on_error`.
/// Returns the number of accounts opened. Only an unreadable header fails
/// the whole load.
pub fn load_accounts<R, D>(
    source: R,
    directory: &mut D,
    mut on_error: impl FnMut(u64, SeedError),
) -> Result<usize, SeedError>
where
    R: Read,
    D: AccountDirectory,
{
    let mut opened = 0;
    for (line, row) in CsvAccountParser::new(source)? {
        let result = row
            .map_err(SeedError::from)
            .and_then(|seed| Ok(seed.into_account()?))
            .and_then(|account| Ok(directory.open(account).map(|_| ())?));
        match result {
            Ok(()) => opened += 1,
            Err(err) => on_error(line, err),
        }
    }
    Ok(opened)
}
