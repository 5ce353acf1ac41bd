use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::Duration;

use budget_assistant::{
    Expense, Importance, Income, Investment, NewExpense, NewIncome, NewInvestment, WireDate,
    create_record, get_local_date, get_timezone, initialize_db,
};

/// A utility for creating a test database for Budget Assistant.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The canonical name of the timezone the sample dates are in.
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let (Some(timezone), Some(today)) = (
        get_timezone(&args.timezone),
        get_local_date(&args.timezone),
    ) else {
        eprintln!("Unknown timezone {:?}", args.timezone);
        exit(1);
    };

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let days_ago = |days: i64| WireDate::Calendar(today - Duration::days(days));

    println!("Creating sample income...");

    for months_ago in 0..3 {
        create_record::<Income>(
            NewIncome {
                amount: 520_000,
                source: "Salary".to_owned(),
                date: days_ago(months_ago * 30),
                description: Some("Monthly pay".to_owned()),
            },
            timezone,
            &conn,
        )?;
    }

    println!("Creating sample expenses...");

    let expenses = [
        (4599, "Food & Dining", Some("Grocery Store"), Some(Importance::High)),
        (1250, "Transport", Some("Petrol Station"), Some(Importance::Medium)),
        (180_000, "Housing", None, Some(Importance::High)),
        (2399, "Entertainment", Some("Cinema"), Some(Importance::Low)),
        (899, "Other", None, None),
    ];

    for (index, (amount, category, location, importance)) in expenses.into_iter().enumerate() {
        create_record::<Expense>(
            NewExpense {
                amount,
                category: category.to_owned(),
                date: days_ago(index as i64 * 6),
                description: None,
                importance,
                location: location.map(str::to_owned),
            },
            timezone,
            &conn,
        )?;
    }

    println!("Creating sample investments...");

    for (amount, investment_type) in [(50_000, "Index Fund"), (25_000, "KiwiSaver")] {
        create_record::<Investment>(
            NewInvestment {
                amount,
                investment_type: investment_type.to_owned(),
                date: days_ago(10),
                description: None,
            },
            timezone,
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
