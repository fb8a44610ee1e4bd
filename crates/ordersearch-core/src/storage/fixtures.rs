//! Reference dataset and typed insert helpers.
//!
//! The reference dataset is small enough to reason about by hand:
//!
//! | order | customer   | date       | status    | total   | items               | payment   |
//! |-------|------------|------------|-----------|---------|---------------------|-----------|
//! | 1     | John Doe   | 2024-01-15 | DELIVERED | 1050.00 | Laptop x1, Mouse x2 | COMPLETED |
//! | 2     | John Doe   | 2024-02-10 | PENDING   | 25.00   | Mouse x1            | none      |
//! | 3     | Jane Smith | 2024-03-05 | DELIVERED | 30.00   | Book x2             | COMPLETED |

use chrono::{NaiveDate, NaiveDateTime};
use ordersearch_proto::{Money, OrderStatus, PaymentMethod, PaymentStatus};
use rusqlite::{params, Connection};
use tracing::info;

use super::sqlite::SqliteStore;
use crate::error::Error;
use crate::query::value_codec::{encode_date, encode_timestamp};

#[derive(Debug, Clone)]
pub struct CustomerRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub registered_at: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: Money,
}

#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: i64,
    pub customer_id: i64,
    pub order_date: NaiveDateTime,
    pub total_amount: Money,
    pub status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct OrderItemRecord {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
}

#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub id: i64,
    pub order_id: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub amount: Money,
    pub payment_date: NaiveDateTime,
}

pub fn insert_customer(conn: &Connection, customer: &CustomerRecord) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO customers (id, name, email, address, registered_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            customer.id,
            customer.name,
            customer.email,
            customer.address,
            encode_date(&customer.registered_at),
        ],
    )?;
    Ok(())
}

pub fn insert_product(conn: &Connection, product: &ProductRecord) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO products (id, name, category, price) VALUES (?1, ?2, ?3, ?4)",
        params![
            product.id,
            product.name,
            product.category,
            product.price.cents()
        ],
    )?;
    Ok(())
}

pub fn insert_order(conn: &Connection, order: &OrderRecord) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO orders (id, customer_id, order_date, total_amount, status) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            order.id,
            order.customer_id,
            encode_timestamp(&order.order_date),
            order.total_amount.cents(),
            order.status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn insert_order_item(conn: &Connection, item: &OrderItemRecord) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            item.id,
            item.order_id,
            item.product_id,
            item.quantity,
            item.unit_price.cents(),
        ],
    )?;
    Ok(())
}

pub fn insert_payment(conn: &Connection, payment: &PaymentRecord) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO payments (id, order_id, method, status, amount, payment_date) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            payment.id,
            payment.order_id,
            payment.method.as_str(),
            payment.status.as_str(),
            payment.amount.cents(),
            encode_timestamp(&payment.payment_date),
        ],
    )?;
    Ok(())
}

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, Error> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| Error::Storage(format!("invalid fixture date {y}-{m}-{d}")))
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Result<NaiveDateTime, Error> {
    date(y, m, d)?
        .and_hms_opt(h, min, 0)
        .ok_or_else(|| Error::Storage(format!("invalid fixture time {h}:{min}")))
}

fn money(cents: i64) -> Result<Money, Error> {
    Ok(Money::from_cents(cents)?)
}

/// The three-order reference dataset.
pub struct ReferenceDataset {
    pub customers: Vec<CustomerRecord>,
    pub products: Vec<ProductRecord>,
    pub orders: Vec<OrderRecord>,
    pub items: Vec<OrderItemRecord>,
    pub payments: Vec<PaymentRecord>,
}

impl ReferenceDataset {
    pub fn build() -> Result<Self, Error> {
        let customers = vec![
            CustomerRecord {
                id: 1,
                name: "John Doe".into(),
                email: "john@example.com".into(),
                address: "12 Main Street, Springfield".into(),
                registered_at: date(2023, 6, 1)?,
            },
            CustomerRecord {
                id: 2,
                name: "Jane Smith".into(),
                email: "jane.smith@example.org".into(),
                address: "48 Oak Avenue, Riverton".into(),
                registered_at: date(2023, 11, 20)?,
            },
        ];

        let products = vec![
            ProductRecord {
                id: 1,
                name: "Laptop".into(),
                category: "Electronics".into(),
                price: money(100_000)?,
            },
            ProductRecord {
                id: 2,
                name: "Mouse".into(),
                category: "Electronics".into(),
                price: money(2_500)?,
            },
            ProductRecord {
                id: 3,
                name: "Book".into(),
                category: "Books".into(),
                price: money(1_500)?,
            },
        ];

        let orders = vec![
            OrderRecord {
                id: 1,
                customer_id: 1,
                order_date: at(2024, 1, 15, 10, 30)?,
                total_amount: money(105_000)?,
                status: OrderStatus::Delivered,
            },
            OrderRecord {
                id: 2,
                customer_id: 1,
                order_date: at(2024, 2, 10, 14, 0)?,
                total_amount: money(2_500)?,
                status: OrderStatus::Pending,
            },
            OrderRecord {
                id: 3,
                customer_id: 2,
                order_date: at(2024, 3, 5, 9, 15)?,
                total_amount: money(3_000)?,
                status: OrderStatus::Delivered,
            },
        ];

        let items = vec![
            OrderItemRecord {
                id: 1,
                order_id: 1,
                product_id: 1,
                quantity: 1,
                unit_price: money(100_000)?,
            },
            OrderItemRecord {
                id: 2,
                order_id: 1,
                product_id: 2,
                quantity: 2,
                unit_price: money(2_500)?,
            },
            OrderItemRecord {
                id: 3,
                order_id: 2,
                product_id: 2,
                quantity: 1,
                unit_price: money(2_500)?,
            },
            OrderItemRecord {
                id: 4,
                order_id: 3,
                product_id: 3,
                quantity: 2,
                unit_price: money(1_500)?,
            },
        ];

        let payments = vec![
            PaymentRecord {
                id: 1,
                order_id: 1,
                method: PaymentMethod::CreditCard,
                status: PaymentStatus::Completed,
                amount: money(105_000)?,
                payment_date: at(2024, 1, 15, 10, 35)?,
            },
            PaymentRecord {
                id: 2,
                order_id: 3,
                method: PaymentMethod::Paypal,
                status: PaymentStatus::Completed,
                amount: money(3_000)?,
                payment_date: at(2024, 3, 5, 9, 20)?,
            },
        ];

        Ok(Self {
            customers,
            products,
            orders,
            items,
            payments,
        })
    }

    /// Insert every record through `conn`.
    pub fn insert(&self, conn: &Connection) -> Result<(), Error> {
        for customer in &self.customers {
            insert_customer(conn, customer)?;
        }
        for product in &self.products {
            insert_product(conn, product)?;
        }
        for order in &self.orders {
            insert_order(conn, order)?;
        }
        for item in &self.items {
            insert_order_item(conn, item)?;
        }
        for payment in &self.payments {
            insert_payment(conn, payment)?;
        }
        Ok(())
    }
}

/// Load the reference dataset into `store` in one transaction.
///
/// The schema must already exist.
pub fn seed_reference_dataset(store: &SqliteStore) -> Result<(), Error> {
    let dataset = ReferenceDataset::build()?;
    store.with_transaction(|tx| dataset.insert(tx))?;
    info!(
        customers = dataset.customers.len(),
        orders = dataset.orders.len(),
        "seeded reference dataset"
    );
    Ok(())
}
