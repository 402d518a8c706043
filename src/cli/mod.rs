use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{LedgerService, TransactionDraft};
use crate::domain::{
    DateSelector, DayGroup, FALLBACK_ACCOUNT_ID, ReportPeriod, Transaction, TransactionKind,
    ViewSelection, category, filter_by_category, format_cents, group_by_day, parse_cents,
};

/// SmartSpend - personal expense tracker
#[derive(Parser)]
#[command(name = "smartspend")]
#[command(about = "Track income, expenses and transfers across your accounts")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SMARTSPEND_DB", default_value = "smartspend.db")]
    pub database: String,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database with the default accounts
    Init,

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Record an income, expense or transfer
    Add {
        /// income, expense or transfer
        kind: TransactionKind,

        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Account the money is recorded against (source for transfers)
        #[arg(short, long)]
        account: String,

        /// Destination account (transfers only)
        #[arg(long)]
        to: Option<String>,

        /// Category (e.g., Food, Bazar, Salary)
        #[arg(short, long)]
        category: Option<String>,

        /// Free-form note
        #[arg(short, long)]
        description: Option<String>,

        /// Date (YYYY-MM-DD or ISO 8601 date-time, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Replace a transaction; omitted fields keep their current value
    Edit {
        /// Transaction ID
        id: String,

        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,

        #[arg(long)]
        amount: Option<String>,

        #[arg(short, long)]
        account: Option<String>,

        #[arg(long)]
        to: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },

    /// Record this month's salary (income, category Salary)
    Salary {
        /// Amount (e.g., "50000")
        amount: String,

        /// Account the salary is paid into
        #[arg(short, long, default_value = FALLBACK_ACCOUNT_ID)]
        account: String,

        /// Date (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Record money received from outside the ledger
    Receive {
        /// Amount (e.g., "500")
        amount: String,

        /// Account the money lands in
        #[arg(short, long, default_value = "cash")]
        account: String,

        /// Free-form note (defaults to "Received Money")
        #[arg(short, long)]
        description: Option<String>,

        /// Date (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List transactions grouped by day, newest first
    List {
        /// month or year
        #[arg(short, long, default_value = "month")]
        period: ReportPeriod,

        /// Account id, or "all"
        #[arg(short, long, default_value = "all")]
        account: String,

        /// A fixed day (YYYY-MM-DD) or month (YYYY-MM) instead of the period
        #[arg(long)]
        on: Option<DateSelector>,

        /// Only this category (prefixes like "bazar" are accepted)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Daily expense report for a category or for all spending
    Report {
        /// Category to report on (prefixes like "food" are accepted)
        #[arg(short, long, conflicts_with = "bazar")]
        category: Option<String>,

        /// Shortcut for the Bazar & Groceries category
        #[arg(long)]
        bazar: bool,

        /// month or year
        #[arg(short, long, default_value = "month")]
        period: ReportPeriod,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Income, expenses, balance and savings rate for a period
    Summary {
        /// month or year
        #[arg(short, long, default_value = "month")]
        period: ReportPeriod,

        /// Account id, or "all"
        #[arg(short, long, default_value = "all")]
        account: String,

        /// Print the full dashboard as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show lifetime balances of all accounts
    Balances,

    /// Export data to CSV or JSON
    Export {
        /// What to export: transactions, balances, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import data from CSV or JSON
    Import {
        /// What to import: transactions (CSV), full (JSON), legacy (app JSON)
        import_type: String,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,

        /// Create accounts that don't exist (CSV and legacy)
        #[arg(long)]
        create_accounts: bool,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Display name
        name: String,

        /// Display glyph (e.g., an emoji)
        #[arg(short, long)]
        icon: Option<String>,

        /// Account id (defaults to the name in lowercase-dashed form)
        #[arg(long)]
        id: Option<String>,
    },

    /// List all accounts
    List,

    /// Rename an account or change its glyph; the id stays the same
    Edit {
        /// Account id
        id: String,

        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New display glyph
        #[arg(short, long)]
        icon: Option<String>,
    },

    /// Delete an account without transactions
    Delete {
        /// Account id
        id: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        if let Commands::Init = self.command {
            LedgerService::init(&self.database).await?;
            println!("Database initialized: {}", self.database);
            return Ok(());
        }

        let service = LedgerService::connect(&self.database)
            .await
            .with_context(|| {
                format!("Cannot open '{}'. Run `smartspend init` first", self.database)
            })?;
        let today = Local::now().date_naive();

        match self.command {
            Commands::Init => {}

            Commands::Account(cmd) => run_account_command(&service, cmd).await?,

            Commands::Add {
                kind,
                amount,
                account,
                to,
                category,
                description,
                date,
            } => {
                let amount = parse_cents(&amount)
                    .context("Invalid amount format. Use '50.00' or '50'")?;
                let mut draft = TransactionDraft::new(kind, amount, account, today)
                    .with_category(category.unwrap_or_default())
                    .with_description(description.unwrap_or_default());
                if let Some(date) = date {
                    draft.date = date;
                }
                if let Some(to) = to {
                    draft = draft.with_target(to);
                }

                let transaction = service.record_transaction(draft).await?;
                println!(
                    "Recorded {}: {} ({})",
                    transaction.kind,
                    describe(&transaction),
                    transaction.id
                );
            }

            Commands::Edit {
                id,
                kind,
                amount,
                account,
                to,
                category,
                description,
                date,
            } => {
                let id = parse_id(&id)?;
                let current = service.get_transaction(id).await?;

                let amount = match amount {
                    Some(a) => {
                        parse_cents(&a).context("Invalid amount format. Use '50.00' or '50'")?
                    }
                    None => current.amount,
                };
                let draft = TransactionDraft {
                    kind: kind.unwrap_or(current.kind),
                    amount,
                    category: category.unwrap_or(current.category),
                    description: description.unwrap_or(current.description),
                    date: date.unwrap_or(current.raw_date),
                    account_id: account.unwrap_or(current.account_id),
                    target_account_id: to.or(current.target_account_id),
                };

                let transaction = service.edit_transaction(id, draft).await?;
                println!("Updated {}: {}", transaction.id, describe(&transaction));
            }

            Commands::Delete { id } => {
                let transaction = service.delete_transaction(parse_id(&id)?).await?;
                println!("Deleted {}: {}", transaction.id, describe(&transaction));
            }

            Commands::Salary {
                amount,
                account,
                date,
            } => {
                let amount = parse_cents(&amount)
                    .context("Invalid amount format. Use '50.00' or '50'")?;
                let mut draft = TransactionDraft::salary(amount, account, today);
                if let Some(date) = date {
                    draft.date = date;
                }
                let transaction = service.record_transaction(draft).await?;
                println!("Salary recorded: {} ({})", describe(&transaction), transaction.id);
            }

            Commands::Receive {
                amount,
                account,
                description,
                date,
            } => {
                let amount = parse_cents(&amount)
                    .context("Invalid amount format. Use '50.00' or '50'")?;
                let mut draft = TransactionDraft::received(amount, account, today);
                if let Some(description) = description {
                    draft = draft.with_description(description);
                }
                if let Some(date) = date {
                    draft.date = date;
                }
                let transaction = service.record_transaction(draft).await?;
                println!("Received: {} ({})", describe(&transaction), transaction.id);
            }

            Commands::List {
                period,
                account,
                on,
                category,
            } => run_list_command(
                &service,
                ViewSelection::new(period, account.as_str()),
                on,
                category.as_deref(),
                today,
            ),

            Commands::Report {
                category,
                bazar,
                period,
                json,
            } => {
                let category = if bazar {
                    Some(category::BAZAR.to_string())
                } else {
                    category.map(|c| category::resolve_category(&c))
                };
                run_report_command(&service, category.as_deref(), period, today, json)?;
            }

            Commands::Summary {
                period,
                account,
                json,
            } => {
                // Ids left behind by deleted accounts or imports are reportable too
                let selection = ViewSelection::new(period, account.as_str());
                run_summary_command(&service, &selection, today, json)?;
            }

            Commands::Balances => run_balances_command(&service),

            Commands::Export {
                export_type,
                output,
            } => run_export_command(&service, &export_type, output.as_deref())?,

            Commands::Import {
                import_type,
                input,
                dry_run,
                create_accounts,
            } => {
                run_import_command(
                    &service,
                    &import_type,
                    input.as_deref(),
                    dry_run,
                    create_accounts,
                )
                .await?
            }
        }

        Ok(())
    }
}

async fn run_account_command(service: &LedgerService, cmd: AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Create { name, icon, id } => {
            let account = service.create_account(&name, icon, id).await?;
            println!("Created account: {} ({})", account.label(), account.id);
        }

        AccountCommands::List => {
            let accounts = service.list_accounts().await?;
            if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                println!("{:<16} {:<24} {:<8}", "ID", "NAME", "DEFAULT");
                println!("{}", "-".repeat(50));
                for account in accounts {
                    println!(
                        "{:<16} {:<24} {:<8}",
                        account.id,
                        account.label(),
                        if account.is_default { "yes" } else { "" }
                    );
                }
            }
        }

        AccountCommands::Edit { id, name, icon } => {
            if name.is_none() && icon.is_none() {
                anyhow::bail!("Nothing to change. Pass --name and/or --icon");
            }
            let account = service.update_account(&id, name.as_deref(), icon).await?;
            println!("Updated account: {} ({})", account.label(), account.id);
        }

        AccountCommands::Delete { id } => {
            let account = service.delete_account(&id).await?;
            println!("Deleted account: {}", account.label());
        }
    }
    Ok(())
}

fn run_list_command(
    service: &LedgerService,
    selection: ViewSelection,
    on: Option<DateSelector>,
    category: Option<&str>,
    today: NaiveDate,
) {
    let (title, mut transactions) = match on {
        Some(selector) => {
            let account = selection.account.account();
            let transactions = service
                .history(&selector)
                .into_iter()
                .filter(|t| account.is_none_or(|id| t.touches(id)))
                .collect();
            (selector.to_string(), transactions)
        }
        None => {
            let dashboard = service.dashboard(&selection, today);
            (dashboard.title, dashboard.transactions)
        }
    };
    if let Some(category) = category {
        transactions = filter_by_category(&transactions, &category::resolve_category(category));
    }

    let days = group_by_day(&transactions);
    if days.is_empty() {
        println!("No transactions in {}.", title);
        return;
    }
    print_days(&days);
}

fn run_report_command(
    service: &LedgerService,
    category: Option<&str>,
    period: ReportPeriod,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let report = service.expense_report(category, period, today);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let subject = report.category.as_deref().unwrap_or("All expenses");
    println!("{} - {}", subject, report.title);
    println!(
        "  Total: {} in {} record(s)",
        format_cents(report.total),
        report.count
    );
    if report.days.is_empty() {
        println!("  Nothing spent yet.");
        return Ok(());
    }
    println!();
    print_days(&report.days);
    Ok(())
}

fn print_days(days: &[DayGroup]) {
    for day in days {
        println!(
            "{}  (+{} / -{})",
            day.date.format("%a %d %b %Y"),
            format_cents(day.income),
            format_cents(day.expenses)
        );
        for t in &day.transactions {
            println!(
                "  {:<8} {:>12}  {:<14} {:<28} {}",
                t.kind,
                format_cents(t.amount),
                truncate(&t.category, 14),
                truncate(&accounts_of(t), 28),
                t.id
            );
        }
    }
}

fn run_summary_command(
    service: &LedgerService,
    selection: &ViewSelection,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let dashboard = service.dashboard(selection, today);

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    let summary = &dashboard.summary;
    println!("{} ({})", dashboard.title, selection.account);
    println!("  Income:        {:>12}", format_cents(summary.total_income));
    println!("  Expenses:      {:>12}", format_cents(summary.total_expenses));
    println!("  Balance:       {:>12}", format_cents(summary.balance));
    println!("  Savings rate:  {:>11.1}%", summary.savings_rate);

    if !dashboard.categories.is_empty() {
        println!();
        println!("{:<20} {:>12} {:>7}", "CATEGORY", "SPENT", "SHARE");
        for category in &dashboard.categories {
            println!(
                "{:<20} {:>12} {:>6.1}%",
                truncate(&category.category, 20),
                format_cents(category.total),
                category.percentage
            );
        }
    }
    Ok(())
}

fn run_balances_command(service: &LedgerService) {
    let entries = service.balances();
    if entries.is_empty() {
        println!("No accounts found.");
        return;
    }

    println!("{:<24} {:>12}", "ACCOUNT", "BALANCE");
    println!("{}", "-".repeat(37));
    let mut total = 0;
    for entry in &entries {
        let marker = if entry.registered { "" } else { " (deleted)" };
        println!(
            "{:<24} {:>12}{}",
            truncate(&entry.label, 24),
            format_cents(entry.balance),
            marker
        );
        total += entry.balance;
    }
    println!("{}", "-".repeat(37));
    println!("{:<24} {:>12}", "TOTAL", format_cents(total));
}

fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "transactions" => {
            let count = exporter.export_transactions_csv(writer)?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "balances" => {
            let count = exporter.export_balances_csv(writer)?;
            if output.is_some() {
                eprintln!("Exported {} balances", count);
            }
        }
        "full" => {
            let export = exporter.export_full_json(writer)?;
            if output.is_some() {
                eprintln!(
                    "Exported {} accounts and {} transactions",
                    export.accounts.len(),
                    export.transactions.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: transactions, balances, full",
                export_type
            );
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &LedgerService,
    import_type: &str,
    input: Option<&str>,
    dry_run: bool,
    create_accounts: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{Read, stdin};

    let importer = Importer::new(service);

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let options = ImportOptions {
        dry_run,
        create_missing_accounts: create_accounts,
    };

    let result = match import_type {
        "transactions" => importer.import_transactions_csv(reader, &options).await?,
        "full" => importer.import_full_json(reader, &options).await?,
        "legacy" => importer.import_legacy_json(reader, &options).await?,
        _ => anyhow::bail!(
            "Invalid import type '{}'. Valid types: transactions, full, legacy",
            import_type
        ),
    };

    let verb = if dry_run { "Would import" } else { "Imported" };
    println!(
        "{} {} transaction(s), skipped {}",
        verb, result.imported, result.skipped
    );
    print_import_issues("error", &result.errors);
    print_import_issues("warning", &result.warnings);
    Ok(())
}

fn print_import_issues(kind: &str, issues: &[crate::io::ImportError]) {
    if issues.is_empty() {
        return;
    }
    eprintln!("{} {}(s):", issues.len(), kind);
    for issue in issues {
        match &issue.field {
            Some(field) => eprintln!("  line {} [{}]: {}", issue.line, field, issue.error),
            None => eprintln!("  line {}: {}", issue.line, issue.error),
        }
    }
}

fn describe(t: &Transaction) -> String {
    format!("{} {}", format_cents(t.amount), accounts_of(t))
}

fn accounts_of(t: &Transaction) -> String {
    match t.destination() {
        Some(target) => format!("{} -> {}", t.account_id, target),
        None => t.account_id.clone(),
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).context("Invalid transaction ID format (expected UUID)")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountFilter;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Food", 10), "Food");
        assert_eq!(truncate("Groceries and more", 10), "Groceri...");
        assert_eq!(truncate("🏦 Bank account", 8), "🏦 Ban...");
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "smartspend", "add", "transfer", "200", "--account", "salary", "--to", "savings",
        ])
        .unwrap();
        match cli.command {
            Commands::Add { kind, to, .. } => {
                assert_eq!(kind, TransactionKind::Transfer);
                assert_eq!(to.as_deref(), Some("savings"));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_cli_parses_account_edit() {
        let cli = Cli::try_parse_from([
            "smartspend", "account", "edit", "cash", "--name", "Wallet", "--icon", "👛",
        ])
        .unwrap();
        match cli.command {
            Commands::Account(AccountCommands::Edit { id, name, icon }) => {
                assert_eq!(id, "cash");
                assert_eq!(name.as_deref(), Some("Wallet"));
                assert_eq!(icon.as_deref(), Some("👛"));
            }
            _ => panic!("expected account edit"),
        }
    }

    #[test]
    fn test_cli_parses_history_filters() {
        let cli = Cli::try_parse_from([
            "smartspend", "list", "--on", "2026-10", "--category", "bazar",
        ])
        .unwrap();
        match cli.command {
            Commands::List { on, category, .. } => {
                assert_eq!(on, Some(DateSelector::Month { year: 2026, month: 10 }));
                assert_eq!(category.as_deref(), Some("bazar"));
            }
            _ => panic!("expected list"),
        }

        assert!(Cli::try_parse_from(["smartspend", "list", "--on", "2026-13"]).is_err());
    }

    #[test]
    fn test_cli_report_flags() {
        let cli = Cli::try_parse_from(["smartspend", "report", "--bazar", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Report { bazar: true, json: true, .. }));

        let both = Cli::try_parse_from(["smartspend", "report", "--bazar", "-c", "food"]);
        assert!(both.is_err());
    }

    #[test]
    fn test_cli_salary_and_receive_defaults() {
        let cli = Cli::try_parse_from(["smartspend", "salary", "50000"]).unwrap();
        match cli.command {
            Commands::Salary { account, .. } => assert_eq!(account, "salary"),
            _ => panic!("expected salary"),
        }

        let cli = Cli::try_parse_from(["smartspend", "receive", "500"]).unwrap();
        match cli.command {
            Commands::Receive { account, .. } => assert_eq!(account, "cash"),
            _ => panic!("expected receive"),
        }
    }

    #[test]
    fn test_cli_summary_accepts_any_account_id() {
        let cli =
            Cli::try_parse_from(["smartspend", "summary", "--account", "old-wallet"]).unwrap();
        match cli.command {
            Commands::Summary { account, .. } => {
                let selection = ViewSelection::new(ReportPeriod::Month, account.as_str());
                assert_eq!(selection.account, AccountFilter::Account("old-wallet".into()));
            }
            _ => panic!("expected summary"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_period() {
        assert!(Cli::try_parse_from(["smartspend", "summary", "--period", "week"]).is_err());
    }
}
