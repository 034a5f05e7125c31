//! Console front end over an [`AccountDirectory`]: role selection, the
//! employee and client menus, plus CSV seeding and export.
//!
//! Every failure coming from the ledger is printed as is and the session
//! goes back to the menu it was called from.

use std::{
    fmt::Display,
    io::{self, BufRead, Write},
    ops::ControlFlow,
};

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    account::{Account, DEFAULT_NEGATIVE_LIMIT},
    command::{ClientAction, EmployeeAction, StartAction, parse_amount, parse_decimal},
    directory::{AccountDirectory, in_memory_directory::InMemoryDirectory},
    identity::{Passport, PhoneNumber},
};
use csv_printer::print_accounts;

pub mod csv_parser;
pub mod csv_printer;

/// Reads the next line, leaving the current menu when input is exhausted.
macro_rules! read_or_quit {
    ($session:expr, $prompt:expr) => {
        match $session.prompt($prompt)? {
            Some(line) => line,
            None => return Ok(ControlFlow::Break(())),
        }
    };
}

/// `Break` means the input is closed and the whole session ends.
type Flow = Result<ControlFlow<()>>;

const CONTINUE: Flow = Ok(ControlFlow::Continue(()));

pub struct Session<'w, R, W: 'w, D = InMemoryDirectory> {
    pub input: R,
    pub output: &'w mut W,
    /// Compared as is, there is no real authentication.
    pub employee_password: String,
    pub directory: D,
}

impl<'w, R, W, D> Session<'w, R, W, D>
where
    R: BufRead,
    W: Write + 'w,
    D: AccountDirectory,
{
    /// Runs menus until the operator quits or the input ends, then hands
    /// the directory back.
    pub fn run(mut self) -> Result<D> {
        while self.start_menu()?.is_continue() {}
        debug!("session finished");
        Ok(self.directory)
    }

    fn start_menu(&mut self) -> Flow {
        writeln!(self.output, "Choose your role:")?;
        writeln!(self.output, "1. Bank employee")?;
        writeln!(self.output, "2. Client")?;
        writeln!(self.output, "3. Quit")?;
        let choice = read_or_quit!(self, ":");
        match choice.parse::<StartAction>() {
            Ok(StartAction::Quit) => Ok(ControlFlow::Break(())),
            Ok(StartAction::Employee) => {
                let password = read_or_quit!(self, "Password: ");
                if password == self.employee_password {
                    self.employee_menu()
                } else {
                    writeln!(self.output, "Wrong password, choose a role and try again...")?;
                    CONTINUE
                }
            }
            Ok(StartAction::Client) => {
                let passport = read_or_quit!(self, "Passport number: ");
                let known = passport
                    .parse::<Passport>()
                    .ok()
                    .filter(|passport| self.directory.find_by_passport(*passport).is_some());
                match known {
                    Some(passport) => self.client_menu(passport),
                    None => {
                        writeln!(self.output, "Unknown passport, choose a role and try again...")?;
                        CONTINUE
                    }
                }
            }
            Err(err) => {
                writeln!(self.output, "{err}, try again...")?;
                CONTINUE
            }
        }
    }

    fn employee_menu(&mut self) -> Flow {
        loop {
            writeln!(self.output, "*********** Employee menu ***********")?;
            writeln!(self.output, "1. Open a new account")?;
            writeln!(self.output, "2. Close an account")?;
            writeln!(self.output, "3. List accounts")?;
            writeln!(self.output, "4. View account by passport")?;
            writeln!(self.output, "5. Export accounts as CSV")?;
            writeln!(self.output, "6. Back")?;
            let choice = read_or_quit!(self, ":");
            let flow = match choice.parse::<EmployeeAction>() {
                Ok(EmployeeAction::OpenAccount) => self.open_account()?,
                Ok(EmployeeAction::CloseAccount) => self.close_account()?,
                Ok(EmployeeAction::ListAccounts) => {
                    self.list_accounts()?;
                    ControlFlow::Continue(())
                }
                Ok(EmployeeAction::ViewAccount) => self.view_account()?,
                Ok(EmployeeAction::ExportAccounts) => {
                    print_accounts(self.output, self.directory.accounts())?;
                    ControlFlow::Continue(())
                }
                Ok(EmployeeAction::Back) => return CONTINUE,
                Err(err) => {
                    self.report(err)?;
                    ControlFlow::Continue(())
                }
            };
            if flow.is_break() {
                return Ok(flow);
            }
        }
    }

    fn client_menu(&mut self, passport: Passport) -> Flow {
        loop {
            let Some(account) = self.directory.find_by_passport(passport) else {
                return CONTINUE;
            };
            writeln!(
                self.output,
                "*********** Client menu: {} ***********",
                account.name()
            )?;
            writeln!(self.output, "1. Account state")?;
            writeln!(self.output, "2. Deposit")?;
            writeln!(self.output, "3. Withdraw")?;
            writeln!(self.output, "4. Transfer to another client")?;
            writeln!(self.output, "5. Back")?;
            let choice = read_or_quit!(self, ":");
            match choice.parse::<ClientAction>() {
                Ok(ClientAction::ViewState) => {
                    if let Some(account) = self.directory.find_by_passport(passport) {
                        write_statement(self.output, account)?;
                    }
                }
                Ok(ClientAction::Deposit) => {
                    let amount = read_or_quit!(self, "Amount: ");
                    let result = parse_amount(&amount)
                        .map_err(anyhow::Error::from)
                        .and_then(|amount| Ok(self.directory.deposit(passport, amount)?));
                    self.settle(passport, result)?;
                }
                Ok(ClientAction::Withdraw) => {
                    let amount = read_or_quit!(self, "Amount: ");
                    let result = parse_amount(&amount)
                        .map_err(anyhow::Error::from)
                        .and_then(|amount| Ok(self.directory.withdraw(passport, amount)?));
                    self.settle(passport, result)?;
                }
                Ok(ClientAction::Transfer) => {
                    let amount = read_or_quit!(self, "Amount: ");
                    let phone = read_or_quit!(self, "Recipient phone (+7***-***-**-**): ");
                    let result = transfer(&mut self.directory, passport, &amount, &phone);
                    self.settle(passport, result)?;
                }
                Ok(ClientAction::Back) => return CONTINUE,
                Err(err) => self.report(err)?,
            }
        }
    }

    fn open_account(&mut self) -> Flow {
        writeln!(self.output, "Enter the client details")?;
        let name = read_or_quit!(self, "Name: ");
        let passport = read_or_quit!(self, "Passport number: ");
        let phone = read_or_quit!(self, "Phone number: ");
        let balance = read_or_quit!(self, "Opening balance: ");
        let credit = read_or_quit!(self, "Credit account? (y/N): ");
        let limit = if credit.eq_ignore_ascii_case("y") {
            Some(read_or_quit!(self, "Negative limit (default 1000): "))
        } else {
            None
        };

        let result = build_account(name, &passport, &phone, &balance, limit.as_deref())
            .and_then(|account| Ok(self.directory.open(account)?.to_string()));
        match result {
            Ok(summary) => writeln!(self.output, "Account opened: {summary}")?,
            Err(err) => self.report(err)?,
        }
        CONTINUE
    }

    fn close_account(&mut self) -> Flow {
        let passport = read_or_quit!(self, "Passport number: ");
        let result = passport
            .parse::<Passport>()
            .map_err(anyhow::Error::from)
            .and_then(|passport| Ok(self.directory.close(passport)?));
        match result {
            Ok(paid_out) => writeln!(
                self.output,
                "Account closed, {} paid out in cash.",
                paid_out.normalize()
            )?,
            Err(err) => self.report(err)?,
        }
        CONTINUE
    }

    fn list_accounts(&mut self) -> Result<()> {
        let mut empty = true;
        for (nom, account) in self.directory.accounts().enumerate() {
            writeln!(self.output, "{nom}. {account}")?;
            empty = false;
        }
        if empty {
            writeln!(self.output, "No accounts yet.")?;
        }
        Ok(())
    }

    fn view_account(&mut self) -> Flow {
        let passport = read_or_quit!(self, "Passport number: ");
        let account = match passport.parse::<Passport>() {
            Ok(passport) => self.directory.find_by_passport(passport),
            Err(err) => {
                self.report(err)?;
                return CONTINUE;
            }
        };
        match account {
            Some(account) => write_statement(self.output, account)?,
            None => writeln!(self.output, "Account with passport {passport} not found")?,
        }
        CONTINUE
    }

    fn settle(&mut self, passport: Passport, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                if let Some(account) = self.directory.find_by_passport(passport) {
                    writeln!(self.output, "Done. {account}")?;
                }
                Ok(())
            }
            Err(err) => self.report(err),
        }
    }

    fn report(&mut self, err: impl Display) -> Result<()> {
        writeln!(self.output, "{err}")?;
        writeln!(self.output, "Returning to the previous menu.")?;
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("input closed");
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }
}

fn write_statement<W: Write>(output: &mut W, account: &Account) -> io::Result<()> {
    writeln!(output, "{}", account.full_info())?;
    if account.history().is_empty() {
        writeln!(output, "No operations yet.")
    } else {
        writeln!(output, "History:")?;
        writeln!(output, "{}", account.history_report())
    }
}

fn build_account(
    name: String,
    passport: &str,
    phone: &str,
    balance: &str,
    negative_limit: Option<&str>,
) -> Result<Account> {
    let balance = if balance.is_empty() {
        Decimal::ZERO
    } else {
        parse_decimal(balance)?
    };
    let account = match negative_limit {
        None => Account::new(name, passport, phone, balance)?,
        Some(limit) => {
            let limit = if limit.is_empty() {
                DEFAULT_NEGATIVE_LIMIT
            } else {
                parse_decimal(limit)?
            };
            Account::new_credit(name, passport, phone, balance, limit)?
        }
    };
    Ok(account)
}

fn transfer<D: AccountDirectory>(
    directory: &mut D,
    from: Passport,
    amount: &str,
    phone: &str,
) -> Result<()> {
    let amount = parse_amount(amount)?;
    let phone: PhoneNumber = phone.parse()?;
    directory.transfer(from, &phone, amount)?;
    Ok(())
}
