use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use pocketbook::{
    NewCategory, NewTransaction, TransactionType, UserId, create_category, create_transaction,
    initialize_db,
};

/// A utility for creating a demo database for the REST API server of pocketbook.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The ID of the user to create the demo data for, as issued by the
    /// identity provider.
    #[arg(long, default_value = "user_demo")]
    user_id: String,
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

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let user_id = UserId::new(&args.user_id);

    println!("Creating demo categories...");

    for (name, icon, transaction_type) in [
        ("Salary", "💰", TransactionType::Income),
        ("Groceries", "🛒", TransactionType::Expense),
        ("Rent", "🏠", TransactionType::Expense),
        ("Transport", "🚌", TransactionType::Expense),
    ] {
        create_category(
            &user_id,
            NewCategory {
                name: name.to_string(),
                icon: icon.to_string(),
                transaction_type,
            },
            &conn,
        )?;
    }

    println!("Creating demo transactions...");

    for (amount, description, date, transaction_type, category) in [
        (
            3200.0,
            "May wages",
            date!(2024 - 05 - 01),
            TransactionType::Income,
            "Salary",
        ),
        (
            1250.0,
            "May rent",
            date!(2024 - 05 - 03),
            TransactionType::Expense,
            "Rent",
        ),
        (
            86.2,
            "weekly shop",
            date!(2024 - 05 - 06),
            TransactionType::Expense,
            "Groceries",
        ),
        (
            42.5,
            "weekly shop",
            date!(2024 - 05 - 13),
            TransactionType::Expense,
            "Groceries",
        ),
        (
            60.0,
            "monthly bus pass",
            date!(2024 - 05 - 14),
            TransactionType::Expense,
            "Transport",
        ),
        (
            3200.0,
            "June wages",
            date!(2024 - 06 - 01),
            TransactionType::Income,
            "Salary",
        ),
    ] {
        create_transaction(
            &user_id,
            NewTransaction {
                amount,
                description: description.to_string(),
                date,
                transaction_type,
                category: category.to_string(),
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
