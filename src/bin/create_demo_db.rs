use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use financeflow_rs::{
    db::initialize,
    models::{NewUser, PasswordHash, TransactionData, TransactionType},
    routes::auth::DEMO_EMAIL,
    stores::{
        CategoryStore, TransactionStore, UserStore,
        sqlite::{SQLiteCategoryStore, SQLiteTransactionStore, SQLiteUserStore},
    },
};

/// A utility for creating a database seeded with demo data for manual
/// testing of the financeflow_rs server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Sample transactions as `(description, amount, type, category, days ago)`.
const SAMPLE_TRANSACTIONS: [(&str, f64, TransactionType, &str, i64); 10] = [
    ("Monthly salary", 3200.0, TransactionType::Income, "Salary", 28),
    ("Website project", 450.0, TransactionType::Income, "Freelance", 14),
    ("Weekly groceries", 86.4, TransactionType::Expense, "Food", 21),
    ("Rent", 950.0, TransactionType::Expense, "Housing", 27),
    ("Bus pass", 48.0, TransactionType::Expense, "Transport", 25),
    ("Pharmacy", 23.9, TransactionType::Expense, "Health", 17),
    ("Concert tickets", 120.0, TransactionType::Expense, "Leisure", 10),
    ("Weekly groceries", 91.2, TransactionType::Expense, "Food", 7),
    ("Electricity bill", 74.5, TransactionType::Expense, "Bills", 4),
    ("New jacket", 139.99, TransactionType::Expense, "Clothing", 1),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;
    initialize(&connection)?;

    let connection = Arc::new(Mutex::new(connection));

    println!("Creating demo user...");
    let user = SQLiteUserStore::new(connection.clone()).create(NewUser {
        name: "Demo User".to_string(),
        email: DEMO_EMAIL.parse()?,
        password_hash: PasswordHash::from_raw_password("demo-password", PasswordHash::DEFAULT_COST)?,
    })?;

    let categories = SQLiteCategoryStore::new(connection.clone()).get_for_user(user.id(), None)?;
    let mut transaction_store = SQLiteTransactionStore::new(connection);

    println!("Creating sample transactions...");
    let today = OffsetDateTime::now_utc().date();

    for (description, amount, transaction_type, category_name, days_ago) in SAMPLE_TRANSACTIONS {
        let category = categories
            .iter()
            .find(|category| {
                category.name().as_ref() == category_name
                    && category.category_type() == transaction_type
            })
            .ok_or("missing default category")?;

        transaction_store.create(
            user.id(),
            TransactionData {
                description: description.to_string(),
                amount,
                transaction_type,
                category_id: category.id(),
                date: today - Duration::days(days_ago),
            },
        )?;
    }

    println!("Success!");

    Ok(())
}
