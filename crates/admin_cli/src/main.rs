use std::{error::Error, io::Write, path::PathBuf};

use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{AnchorDay, CycleReport, Engine, Money, StatementPeriod};
use migration::MigratorTrait;
use report::{StatementDocument, render_statement, statement_filename};
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "hakogane_admin")]
#[command(about = "Admin utilities for Hakogane (users, budgets, statements)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./hakogane.db?mode=rwc"
    )]
    database_url: String,

    /// IANA zone "today" is taken in; keep it equal to the server's
    /// `app.timezone`.
    #[arg(long, env = "HAKOGANE__APP__TIMEZONE", default_value = "Asia/Kolkata")]
    timezone: Tz,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Budget(Budget),
    Transaction(Transaction),
    Statement(Statement),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// Day of the month cycles start on (1-31).
    #[arg(long, default_value_t = 8)]
    anchor_day: u32,
    /// Allocation of the first cycle, e.g. `50000` or `50000.00`.
    #[arg(long)]
    salary: String,
}

#[derive(Args, Debug)]
struct Budget {
    #[command(subcommand)]
    command: BudgetCommand,
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    Set(BudgetSetArgs),
}

#[derive(Args, Debug)]
struct BudgetSetArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    salary: String,
}

#[derive(Args, Debug)]
struct Transaction {
    #[command(subcommand)]
    command: TransactionCommand,
}

#[derive(Subcommand, Debug)]
enum TransactionCommand {
    Add(TransactionAddArgs),
}

#[derive(Args, Debug)]
struct TransactionAddArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    amount: String,
    #[arg(long)]
    description: String,
}

#[derive(Args, Debug)]
struct Statement {
    #[command(subcommand)]
    command: StatementCommand,
}

#[derive(Subcommand, Debug)]
enum StatementCommand {
    Export(StatementExportArgs),
}

#[derive(Args, Debug)]
struct StatementExportArgs {
    #[arg(long)]
    username: String,
    /// Year of the cycle start; the current cycle when omitted.
    #[arg(long, requires = "month")]
    year: Option<i32>,
    #[arg(long, requires = "year")]
    month: Option<u32>,
    /// Output file; defaults to the download name in the working directory.
    #[arg(long)]
    out: Option<PathBuf>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn statement_period(args: &StatementExportArgs) -> StatementPeriod {
    match (args.year, args.month) {
        (Some(year), Some(month)) => StatementPeriod::Month { year, month },
        _ => StatementPeriod::Current,
    }
}

fn local_now(timezone: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&timezone).naive_local()
}

fn today(timezone: Tz) -> NaiveDate {
    local_now(timezone).date()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build();
    let tz = cli.timezone;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let anchor_day = AnchorDay::new(args.anchor_day)?;
            let salary = Money::parse_positive(&args.salary)?;
            let password = prompt_password_twice()?;

            let user = engine
                .register_user(&args.username, &password, anchor_day, salary, today(tz))
                .await?;
            println!(
                "created user: {} (cycles start on day {})",
                user.username, user.anchor_day
            );
        }
        Command::Budget(Budget {
            command: BudgetCommand::Set(args),
        }) => {
            let amount = Money::parse_positive(&args.salary)?;
            let user = engine.user(&args.username).await?;
            let allocation = engine.set_budget(&user.username, amount, today(tz)).await?;
            println!(
                "credited {} to the cycle starting {}",
                allocation.allocated.with_symbol(),
                allocation.cycle_start
            );
        }
        Command::Transaction(Transaction {
            command: TransactionCommand::Add(args),
        }) => {
            let amount = Money::parse_positive(&args.amount)?;
            let user = engine.user(&args.username).await?;
            let tx = engine
                .record_transaction(&user.username, amount, &args.description, local_now(tz))
                .await?;
            println!("recorded transaction {} on {}", tx.id, tx.date);
        }
        Command::Statement(Statement {
            command: StatementCommand::Export(args),
        }) => {
            let period = statement_period(&args);
            let generated_at = local_now(tz);
            let user = engine.user(&args.username).await?;
            let statement = match engine
                .statement(&user.username, period, generated_at.date())
                .await?
            {
                CycleReport::Ready(statement) => *statement,
                CycleReport::NoAllocation { cycle_start } => {
                    eprintln!("no budget allocation found for the cycle starting {cycle_start}");
                    std::process::exit(1);
                }
            };

            let out = args
                .out
                .unwrap_or_else(|| PathBuf::from(statement_filename(statement.cycle_start)));
            let bytes = render_statement(&StatementDocument {
                operator: user.username,
                generated_at,
                statement,
            })?;
            std::fs::write(&out, bytes)?;
            println!("wrote {}", out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timezone_defaults_to_kolkata_and_can_be_overridden() {
        let cli = Cli::try_parse_from(["hakogane_admin", "statement", "export", "--username", "a"])
            .unwrap();
        assert_eq!(cli.timezone, chrono_tz::Asia::Kolkata);

        let cli = Cli::try_parse_from([
            "hakogane_admin",
            "--timezone",
            "Europe/Rome",
            "statement",
            "export",
            "--username",
            "a",
        ])
        .unwrap();
        assert_eq!(cli.timezone, chrono_tz::Europe::Rome);

        assert!(
            Cli::try_parse_from([
                "hakogane_admin",
                "--timezone",
                "Mars/Olympus",
                "statement",
                "export",
                "--username",
                "a",
            ])
            .is_err()
        );
    }

    #[test]
    fn statement_export_needs_year_and_month_together() {
        let cli = Cli::try_parse_from([
            "hakogane_admin",
            "statement",
            "export",
            "--username",
            "a",
            "--year",
            "2024",
            "--month",
            "3",
        ])
        .unwrap();
        let Command::Statement(Statement {
            command: StatementCommand::Export(args),
        }) = cli.command
        else {
            panic!("expected statement export");
        };
        assert_eq!(
            statement_period(&args),
            StatementPeriod::Month {
                year: 2024,
                month: 3
            }
        );

        assert!(
            Cli::try_parse_from([
                "hakogane_admin",
                "statement",
                "export",
                "--username",
                "a",
                "--year",
                "2024",
            ])
            .is_err()
        );
    }
}
