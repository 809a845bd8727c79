//! Database seeder for Muhasib development and testing.
//!
//! Seeds a staff accountant, a client portal user with a linked client,
//! a sample invoice, draft filings, and a few tasks.
//!
//! Usage: cargo run --bin seeder

use chrono::{Days, Utc};
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use muhasib_core::access::Role;
use muhasib_core::auth::hash_password;
use muhasib_core::tax::{current_hijri_year, default_nisab_sar, hijri_year_label, saudi_vat_rate};
use muhasib_db::entities::sea_orm_active_enums::{
    ClientStatus, InvoiceStatus, TaskPriority, TaskStatus,
};
use muhasib_db::repositories::{
    ClientInput, CreateUserInput, CreateVatInput, CreateZakatInput, InvoiceInput, ItemInput,
    TaskInput,
};
use muhasib_db::{
    ClientRepository, FilingRepository, InvoiceRepository, TaskRepository, UserRepository,
    bootstrap,
};

const SEED_PASSWORD: &str = "password123";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = muhasib_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Ensuring admin account...");
    bootstrap::ensure_default_admin(&db)
        .await
        .expect("Failed to bootstrap admin");

    let users = UserRepository::new(db.clone());
    if users
        .find_by_login("accountant")
        .await
        .expect("Failed to query users")
        .is_some()
    {
        println!("Seed data already present, skipping...");
        return;
    }

    println!("Seeding staff and portal users...");
    let (accountant_id, portal_user_id) = seed_users(&users).await;

    println!("Seeding client...");
    let client_id = seed_client(&db, portal_user_id).await;

    println!("Seeding invoice...");
    seed_invoice(&db, client_id, accountant_id).await;

    println!("Seeding filings...");
    seed_filings(&db, client_id, accountant_id).await;

    println!("Seeding tasks...");
    seed_tasks(&db, client_id, accountant_id).await;

    println!("Seeding complete!");
}

async fn seed_users(users: &UserRepository) -> (Uuid, Uuid) {
    let password_hash = hash_password(SEED_PASSWORD).expect("Failed to hash password");

    let accountant = users
        .create(CreateUserInput {
            username: "accountant".to_string(),
            email: "accountant@example.com".to_string(),
            password_hash: password_hash.clone(),
            first_name: "Sara".to_string(),
            last_name: "Al-Rashid".to_string(),
            phone: Some("+966501234567".to_string()),
            role: Role::Accountant,
        })
        .await
        .expect("Failed to create accountant");

    let portal_user = users
        .create(CreateUserInput {
            username: "client".to_string(),
            email: "client@example.com".to_string(),
            password_hash,
            first_name: "Omar".to_string(),
            last_name: "Hassan".to_string(),
            phone: None,
            role: Role::Client,
        })
        .await
        .expect("Failed to create portal user");

    (accountant.id, portal_user.id)
}

/// The client row is created by the portal user, which is what links the
/// portal login to its client scope.
async fn seed_client(db: &DatabaseConnection, portal_user_id: Uuid) -> Uuid {
    let clients = ClientRepository::new(db.clone());
    let client = clients
        .create(
            ClientInput {
                name: "Al-Noor Trading Est.".to_string(),
                name_ar: Some("مؤسسة النور التجارية".to_string()),
                cr_number: Some("1010123456".to_string()),
                vat_number: Some("310123456700003".to_string()),
                contact_person: Some("Omar Hassan".to_string()),
                email: Some("client@example.com".to_string()),
                phone: Some("+966112345678".to_string()),
                address: Some("Riyadh, Olaya District".to_string()),
                status: ClientStatus::Active,
                notes: None,
            },
            portal_user_id,
        )
        .await
        .expect("Failed to create client");
    client.id
}

async fn seed_invoice(db: &DatabaseConnection, client_id: Uuid, created_by: Uuid) {
    let invoices = InvoiceRepository::new(db.clone());
    let today = Utc::now().date_naive();

    invoices
        .create(
            InvoiceInput {
                invoice_number: "INV-000001".to_string(),
                client_id,
                issue_date: today,
                due_date: today.checked_add_days(Days::new(30)),
                description: Some("Monthly bookkeeping services".to_string()),
                subtotal: dec!(0),
                vat_rate: saudi_vat_rate(),
                status: InvoiceStatus::Unpaid,
                notes: None,
            },
            vec![
                ItemInput {
                    description: "Bookkeeping - August".to_string(),
                    quantity: dec!(1),
                    unit_price: dec!(3500.00),
                },
                ItemInput {
                    description: "VAT return preparation".to_string(),
                    quantity: dec!(1),
                    unit_price: dec!(1200.00),
                },
            ],
            created_by,
        )
        .await
        .expect("Failed to create invoice");
}

async fn seed_filings(db: &DatabaseConnection, client_id: Uuid, created_by: Uuid) {
    let filings = FilingRepository::new(db.clone());
    let today = Utc::now().date_naive();
    let quarter_start = today
        .checked_sub_days(Days::new(90))
        .expect("date arithmetic");

    filings
        .create_vat(
            CreateVatInput {
                period_start: quarter_start,
                period_end: today,
                total_sales: dec!(250000.00),
                total_purchases: dec!(80000.00),
                notes: None,
                client_id: Some(client_id),
            },
            saudi_vat_rate(),
            created_by,
        )
        .await
        .expect("Failed to create VAT return");

    filings
        .create_zakat(
            CreateZakatInput {
                hijri_year: hijri_year_label(current_hijri_year()),
                cash_and_deposits: dec!(120000.00),
                trade_goods: dec!(45000.00),
                receivables: dec!(30000.00),
                investments: dec!(0),
                liabilities: dec!(25000.00),
                notes: None,
                client_id: Some(client_id),
            },
            default_nisab_sar(),
            created_by,
        )
        .await
        .expect("Failed to create Zakat declaration");
}

async fn seed_tasks(db: &DatabaseConnection, client_id: Uuid, created_by: Uuid) {
    let tasks = TaskRepository::new(db.clone());
    let today = Utc::now().date_naive();

    let samples = [
        (
            "Prepare Q3 VAT return",
            TaskPriority::High,
            Some("VAT".to_string()),
            today.checked_add_days(Days::new(7)),
        ),
        (
            "Collect bank statements",
            TaskPriority::Medium,
            Some("Bookkeeping".to_string()),
            today.checked_add_days(Days::new(14)),
        ),
        (
            "Renew CR registration",
            TaskPriority::Low,
            None,
            today.checked_add_days(Days::new(60)),
        ),
    ];

    for (title, priority, task_type, due_date) in samples {
        tasks
            .create(
                TaskInput {
                    title: title.to_string(),
                    description: None,
                    due_date,
                    priority,
                    status: TaskStatus::Pending,
                    task_type,
                    assigned_to: Some(created_by),
                    client_id: Some(client_id),
                },
                created_by,
            )
            .await
            .expect("Failed to create task");
    }
}
