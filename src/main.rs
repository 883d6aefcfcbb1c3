//! Budget CLI
//!
//! Runs the dashboard calculators from the command line. Options left out fall
//! back to the `BUDGET_*` environment defaults (see `config`).

use std::io;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::debug;
use serde::Serialize;

use capital_budgeting::budget::BudgetSession;
use capital_budgeting::calculations::{
    amortization_schedule, cumulative_cashflows, discounted_cashflows, monthly_payment, npv,
    parse_cashflows, payback_period, project, variance, yearly_growth, LoanTerms, Payback,
};
use capital_budgeting::config::DashboardConfig;
use capital_budgeting::numeric::{require_integer, InputValue, Real};

#[derive(Debug, Parser)]
#[command(name = "budget", version, about = "Budget variance and capital budgeting calculators")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Actual minus budgeted spending
    Variance {
        #[arg(long)]
        budgeted: String,
        #[arg(long)]
        actual: String,
    },
    /// Year-by-year compound interest projection
    Compound(CompoundArgs),
    /// Monthly payment for an amortizing loan
    Loan(LoanArgs),
    /// Net present value of a project
    Npv(CapitalArgs),
    /// Periods until cash flows recover the investment
    Payback(CapitalArgs),
    /// Budget vs actual summary for categories and expenses given inline
    Summary(SummaryArgs),
}

#[derive(Debug, Args)]
struct CompoundArgs {
    #[arg(long)]
    principal: String,
    /// Annual rate as a decimal (0.05 = 5%)
    #[arg(long)]
    rate: String,
    /// Number of years
    #[arg(long)]
    years: String,
    /// "Monthly" or "Annually"
    #[arg(long)]
    frequency: Option<String>,
    /// Write rows as CSV
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Args)]
struct LoanArgs {
    #[arg(long)]
    amount: String,
    /// Annual rate as a decimal (0.05 = 5%)
    #[arg(long)]
    rate: String,
    /// Term in whole years
    #[arg(long)]
    years: String,
    /// Print the month-by-month amortization schedule
    #[arg(long)]
    schedule: bool,
    /// Write the schedule as CSV
    #[arg(long, requires = "schedule")]
    csv: bool,
}

#[derive(Debug, Args)]
struct CapitalArgs {
    #[arg(long)]
    investment: Option<f64>,
    /// Discount rate in percent (10 = 10%)
    #[arg(long)]
    rate_pct: Option<f64>,
    /// Comma-separated cash flows, first entry is period 1
    #[arg(long)]
    cashflows: Option<String>,
}

#[derive(Debug, Args)]
struct SummaryArgs {
    /// Budget category as NAME=AMOUNT (repeatable)
    #[arg(long = "category", value_parser = parse_category)]
    categories: Vec<(String, f64)>,
    /// Expense as NAME=YYYY-MM-DD=AMOUNT (repeatable)
    #[arg(long = "expense", value_parser = parse_expense)]
    expenses: Vec<(String, NaiveDate, f64)>,
    #[arg(long)]
    threshold: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = DashboardConfig::from_env();
    debug!("Loaded config: {:?}", config);

    run(cli, &config)
}

fn run(cli: Cli, config: &DashboardConfig) -> Result<()> {
    let json = cli.json;

    match cli.command {
        Command::Variance { budgeted, actual } => {
            let result = variance(&field(&budgeted), &field(&actual))?;
            if json {
                return print_json(&result);
            }
            let status = if result.is_overspend(config.overspend_threshold) {
                "overspent"
            } else {
                "within budget"
            };
            println!("Variance: {} ({})", result, status);
        }

        Command::Compound(args) => {
            let frequency = args
                .frequency
                .unwrap_or_else(|| config.compounding.to_string());
            let principal = field(&args.principal);
            let rate = field(&args.rate);
            let years = field(&args.years);

            // Validates all inputs; the rows below only add the per-year interest
            let values = project(&principal, &rate, &years, &frequency)?;
            let rows = if values.is_empty() {
                Vec::new()
            } else {
                yearly_growth(
                    Real::from_input("principal", &principal)?.to_f64(),
                    Real::from_input("rate", &rate)?.to_f64(),
                    require_integer("duration", &years)?,
                    frequency.parse()?,
                )
            };
            debug!("Projected {} years", values.len());

            if args.csv {
                return write_csv(&rows);
            }
            if json {
                return print_json(&rows);
            }
            println!("{:>5} {:>16} {:>14}", "Year", "Balance", "Interest");
            for row in &rows {
                println!("{:>5} {:>16.2} {:>14.2}", row.year, row.balance, row.interest_earned);
            }
        }

        Command::Loan(args) => {
            let amount = field(&args.amount);
            let rate = field(&args.rate);
            let years = field(&args.years);
            let payment = monthly_payment(&amount, &rate, &years)?;

            if !args.schedule {
                if json {
                    return print_json(&payment);
                }
                println!("Monthly payment: {:.2}", payment);
                return Ok(());
            }

            let terms = LoanTerms::new(
                Real::from_input("loan_amount", &amount)?.to_f64(),
                Real::from_input("annual_rate", &rate)?.to_f64(),
                require_integer("term_years", &years)?,
            );
            let schedule = amortization_schedule(terms)?;
            if args.csv {
                return write_csv(&schedule.rows);
            }
            if json {
                return print_json(&schedule);
            }

            println!("{:>5} {:>12} {:>12} {:>12} {:>14}", "Month", "Payment", "Interest", "Principal", "Balance");
            for row in &schedule.rows {
                println!(
                    "{:>5} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                    row.month, row.payment, row.interest, row.principal, row.balance
                );
            }
            let summary = schedule.summary();
            println!("\nTotal paid: {:.2}  Total interest: {:.2}", summary.total_paid, summary.total_interest);
        }

        Command::Npv(args) => {
            let (investment, rate, cashflows) = capital_inputs(&args, config)?;
            let value = npv(investment, rate, &cashflows);
            if json {
                #[derive(Serialize)]
                struct NpvOutput {
                    npv: f64,
                    discounted_cashflows: Vec<f64>,
                }
                return print_json(&NpvOutput {
                    npv: value,
                    discounted_cashflows: discounted_cashflows(rate, &cashflows),
                });
            }
            println!("Net Present Value (NPV): {:.2}", value);
        }

        Command::Payback(args) => {
            let (investment, _, cashflows) = capital_inputs(&args, config)?;
            let payback = payback_period(investment, &cashflows);
            if json {
                #[derive(Serialize)]
                struct PaybackOutput {
                    payback: Payback,
                    cumulative_cashflows: Vec<f64>,
                }
                return print_json(&PaybackOutput {
                    payback,
                    cumulative_cashflows: cumulative_cashflows(&cashflows),
                });
            }
            match payback {
                Payback::Recovered { period } => println!("Payback Period: {} years", period),
                Payback::NeverRecovered => println!("The project does not pay back the initial investment."),
            }
        }

        Command::Summary(args) => {
            let mut session = BudgetSession::from_config(config);
            if let Some(threshold) = args.threshold {
                session.overspend_threshold = threshold;
            }
            for (name, amount) in &args.categories {
                session.add_category(name, *amount)?;
            }
            for (name, date, amount) in &args.expenses {
                session.log_expense(name, *date, *amount)?;
            }

            let summary = session.summary()?;
            if json {
                return print_json(&summary);
            }

            println!("{:<20} {:>12} {:>12} {:>12} {:>9}", "Category", "Budgeted", "Actual", "Variance", "Var %");
            for row in &summary.rows {
                let pct = row
                    .percentage_variance
                    .map_or_else(|| "-".to_string(), |p| format!("{:.1}", p));
                println!(
                    "{:<20} {:>12.2} {:>12.2} {:>12.2} {:>9}",
                    row.category,
                    row.budgeted,
                    row.actual,
                    row.variance.as_f64(),
                    pct
                );
            }
            for row in summary.alerts() {
                println!("Overspending alert: {} exceeds the budget by {:.2}", row.category, row.variance.as_f64());
            }
        }
    }

    Ok(())
}

/// Interpret a command-line value the way a form field would hand it over:
/// JSON literals (numbers, booleans, null, arrays) keep their type, anything
/// else is text.
fn field(raw: &str) -> InputValue {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(InputValue::from)
        .unwrap_or_else(|_| InputValue::Text(raw.to_string()))
}

fn capital_inputs(args: &CapitalArgs, config: &DashboardConfig) -> Result<(f64, f64, Vec<f64>)> {
    let investment = args.investment.unwrap_or(config.initial_investment);
    let rate = args.rate_pct.map_or_else(|| config.discount_rate(), |pct| pct / 100.0);
    let text = args.cashflows.as_deref().unwrap_or(&config.cashflows);
    let cashflows = parse_cashflows(text).context("Invalid cash flow input. Please use comma-separated numbers")?;
    Ok((investment, rate, cashflows))
}

fn parse_category(raw: &str) -> Result<(String, f64)> {
    let (name, amount) = raw
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("expected NAME=AMOUNT, got '{}'", raw))?;
    let amount = amount.trim().parse().with_context(|| format!("bad amount in '{}'", raw))?;
    Ok((name.to_string(), amount))
}

fn parse_expense(raw: &str) -> Result<(String, NaiveDate, f64)> {
    let mut parts = raw.rsplitn(3, '=');
    let (amount, date, name) = match (parts.next(), parts.next(), parts.next()) {
        (Some(amount), Some(date), Some(name)) => (amount, date, name),
        _ => return Err(anyhow!("expected NAME=YYYY-MM-DD=AMOUNT, got '{}'", raw)),
    };
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("bad date in '{}'", raw))?;
    let amount = amount.trim().parse().with_context(|| format!("bad amount in '{}'", raw))?;
    Ok((name.to_string(), date, amount))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_csv<T: Serialize>(rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    writer.flush()?;
    Ok(())
}
