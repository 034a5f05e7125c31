use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown menu item `{choice}`")]
    UnknownMenuItem { choice: String },
    #[error("`{input}` is not a valid amount")]
    InvalidAmount { input: String },
    #[error("Amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Decimal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAction {
    Employee,
    Client,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeAction {
    OpenAccount,
    CloseAccount,
    ListAccounts,
    ViewAccount,
    ExportAccounts,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    ViewState,
    Deposit,
    Withdraw,
    Transfer,
    Back,
}

fn unknown(choice: &str) -> CommandError {
    CommandError::UnknownMenuItem {
        choice: choice.to_owned(),
    }
}

impl FromStr for StartAction {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::Employee),
            "2" => Ok(Self::Client),
            "3" => Ok(Self::Quit),
            other => Err(unknown(other)),
        }
    }
}

impl FromStr for EmployeeAction {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::OpenAccount),
            "2" => Ok(Self::CloseAccount),
            "3" => Ok(Self::ListAccounts),
            "4" => Ok(Self::ViewAccount),
            "5" => Ok(Self::ExportAccounts),
            "6" => Ok(Self::Back),
            other => Err(unknown(other)),
        }
    }
}

impl FromStr for ClientAction {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::ViewState),
            "2" => Ok(Self::Deposit),
            "3" => Ok(Self::Withdraw),
            "4" => Ok(Self::Transfer),
            "5" => Ok(Self::Back),
            other => Err(unknown(other)),
        }
    }
}

/// Parses any decimal, used for opening balances and limits.
pub fn parse_decimal(input: &str) -> Result<Decimal, CommandError> {
    Decimal::from_str(input.trim()).map_err(|_| CommandError::InvalidAmount {
        input: input.trim().to_owned(),
    })
}

/// Parses the amount of a deposit, withdrawal or transfer.
pub fn parse_amount(input: &str) -> Result<Decimal, CommandError> {
    let amount = parse_decimal(input)?;
    if amount > Decimal::ZERO {
        Ok(amount)
    } else {
        Err(CommandError::NonPositiveAmount { amount })
    }
}
