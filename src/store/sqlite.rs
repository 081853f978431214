use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use rusqlite_migration::{Migrations, M};

use crate::app::{GondolaError, Result};
use crate::domain::{Availability, ProductRecord, StoredProduct};
use crate::store::{ProductQuery, ProductStore};

const INITIAL_SCHEMA: &str = "
CREATE TABLE products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    price REAL,
    description TEXT,
    rating REAL,
    category TEXT NOT NULL,
    availability TEXT NOT NULL,
    image_url TEXT,
    scraped_at TEXT NOT NULL
);
CREATE INDEX idx_products_name ON products(name);
CREATE INDEX idx_products_category ON products(category);
CREATE INDEX idx_products_availability ON products(availability);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(INITIAL_SCHEMA)]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| GondolaError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            GondolaError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn row_to_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredProduct> {
        Ok(StoredProduct {
            id: row.get(0)?,
            record: ProductRecord {
                name: row.get(1)?,
                price: row.get(2)?,
                description: row.get(3)?,
                rating: row.get(4)?,
                category: row.get(5)?,
                availability: row
                    .get::<_, String>(6)
                    .ok()
                    .and_then(|s| Availability::parse(&s))
                    .unwrap_or(Availability::Unknown),
                image_url: row.get(7)?,
            },
            scraped_at: row
                .get::<_, String>(8)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
        })
    }
}

/// Escape LIKE metacharacters in user-supplied substrings.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

const SELECT_COLUMNS: &str =
    "id, name, price, description, rating, category, availability, image_url, scraped_at";

impl ProductStore for SqliteStore {
    fn replace_all(&self, records: &[ProductRecord]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM products", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO products
                 (name, price, description, rating, category, availability, image_url, scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            let scraped_at = Utc::now().to_rfc3339();
            for record in records {
                stmt.execute(params![
                    record.name,
                    record.price,
                    record.description,
                    record.rating,
                    record.category,
                    record.availability.as_str(),
                    record.image_url,
                    scraped_at,
                ])?;
            }
        }
        tx.commit()?;

        Ok(records.len())
    }

    fn query(&self, query: &ProductQuery) -> Result<Vec<StoredProduct>> {
        let conn = self.lock()?;

        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref name) = query.name {
            clauses.push("name LIKE ? ESCAPE '\\'");
            values.push(Box::new(format!("%{}%", escape_like(name))));
        }
        if let Some(ref category) = query.category {
            clauses.push("category = ?");
            values.push(Box::new(category.clone()));
        }
        if let Some(availability) = query.availability {
            clauses.push("availability = ?");
            values.push(Box::new(availability.as_str()));
        }
        if let Some(min_price) = query.min_price {
            clauses.push("price >= ?");
            values.push(Box::new(min_price));
        }
        if let Some(max_price) = query.max_price {
            clauses.push("price <= ?");
            values.push(Box::new(max_price));
        }

        let mut sql = format!("SELECT {} FROM products", SELECT_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        // Row ids follow insertion order, which is the crawl's first-seen order.
        sql.push_str(" ORDER BY id LIMIT ? OFFSET ?");
        values.push(Box::new(query.limit as i64));
        values.push(Box::new(query.skip as i64));

        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let products = stmt
            .query_map(&params[..], Self::row_to_product)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(products)
    }

    fn get(&self, id: i64) -> Result<Option<StoredProduct>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                &format!("SELECT {} FROM products WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_product,
            )
            .optional()?;

        Ok(result)
    }

    fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count)
    }
}
