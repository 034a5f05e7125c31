use std::io::Write;

use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::account::{Account, AccountKind};

#[derive(Debug, Serialize)]
pub struct AccountRow<'a> {
    pub name: &'a str,
    pub passport: u32,
    pub phone: &'a str,
    pub balance: Decimal,
    pub kind: &'static str,
    pub negative_limit: Option<Decimal>,
    pub archived: bool,
}

impl<'a> From<&'a Account> for AccountRow<'a> {
    fn from(acc: &'a Account) -> Self {
        let (kind, negative_limit) = match acc.kind() {
            AccountKind::Debit => ("debit", None),
            AccountKind::Credit { negative_limit } => ("credit", Some(negative_limit.normalize())),
        };
        Self {
            name: acc.name(),
            passport: acc.passport().number(),
            phone: acc.phone().as_str(),
            balance: acc.balance().normalize(),
            kind,
            negative_limit,
            archived: acc.is_archived(),
        }
    }
}

pub fn print_accounts<'a, W>(
    output: &mut W,
    accounts: impl Iterator<Item = &'a Account>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for acc in accounts {
        if let Err(err) = writer.serialize(AccountRow::from(acc)) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
