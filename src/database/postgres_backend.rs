//! Postgres-backed `Database`, via the synchronous `postgres` crate.
//!
//! Uses the simple query protocol (`Client::simple_query`) rather than typed
//! prepared statements: every value comes back as text regardless of its
//! wire type, which sidesteps needing a `rust_decimal`/`uuid` FromSql feature
//! just to read a `NUMERIC` or `UUID` column back out. Table segments are
//! bounded, so there is no streaming concern either way.

use super::{ConnectionUri, Database, RowValue};
use crate::dialect::{Dialect, DialectKind};
use crate::error::DiffError;
use crate::tableschema::RawColumnInfo;
use postgres::{Client, NoTls, SimpleQueryMessage};
use std::sync::Mutex;

pub struct PostgresDatabase {
    client: Mutex<Client>,
    dialect: Box<dyn Dialect>,
}

impl PostgresDatabase {
    pub fn connect(uri: &ConnectionUri) -> Result<Self, DiffError> {
        let mut config = postgres::Config::new();
        if let Some(host) = &uri.host {
            config.host(host);
        }
        if let Some(port) = uri.port {
            config.port(port);
        }
        if let Some(user) = &uri.user {
            config.user(user);
        }
        if let Some(password) = &uri.password {
            config.password(password);
        }
        let dbname = uri.database_name();
        if !dbname.is_empty() {
            config.dbname(dbname);
        }

        // TLS connection strings are accepted but always connect via NoTls;
        // a genuine sslmode=require would need postgres-native-tls.
        let client = config
            .connect(NoTls)
            .map_err(|e| DiffError::Connection { message: e.to_string() })?;

        Ok(Self {
            client: Mutex::new(client),
            dialect: DialectKind::Postgres.dialect(),
        })
    }
}

impl Database for PostgresDatabase {
    fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    fn query_table_schema(&self, table_path: &[String]) -> Result<Vec<RawColumnInfo>, DiffError> {
        let table = table_path.last().cloned().unwrap_or_default();
        let schema = if table_path.len() > 1 {
            table_path[table_path.len() - 2].clone()
        } else {
            "public".to_string()
        };
        let sql = format!(
            "SELECT column_name, data_type, datetime_precision, numeric_precision, numeric_scale, collation_name \
             FROM information_schema.columns WHERE table_name = '{}' AND table_schema = '{}' \
             ORDER BY ordinal_position",
            table.replace('\'', "''"),
            schema.replace('\'', "''")
        );
        let rows = self.select_rows(&sql)?;
        if rows.is_empty() {
            return Err(DiffError::TableDoesNotExist { table });
        }
        Ok(rows
            .into_iter()
            .map(|r| RawColumnInfo {
                column_name: cell_to_string(&r[0]),
                data_type: cell_to_string(&r[1]),
                datetime_precision: cell_to_u32(&r[2]),
                numeric_precision: cell_to_u32(&r[3]),
                numeric_scale: cell_to_u32(&r[4]),
                collation: match &r[5] {
                    RowValue::Null => None,
                    other => Some(cell_to_string(other)),
                },
            })
            .collect())
    }

    fn select_rows(&self, sql: &str) -> Result<Vec<Vec<RowValue>>, DiffError> {
        let mut client = self.client.lock().expect("postgres client mutex poisoned");
        let messages = client
            .simple_query(sql)
            .map_err(|e| DiffError::QueryExecution { message: format!("{e} in: {sql}") })?;

        let mut rows = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                let mut values = Vec::with_capacity(row.columns().len());
                for i in 0..row.columns().len() {
                    values.push(match row.get(i) {
                        None => RowValue::Null,
                        Some(text) => text_to_row_value(text),
                    });
                }
                rows.push(values);
            }
        }
        Ok(rows)
    }

    fn execute(&self, sql: &str) -> Result<u64, DiffError> {
        let mut client = self.client.lock().expect("postgres client mutex poisoned");
        client
            .execute(sql, &[])
            .map_err(|e| DiffError::QueryExecution { message: format!("{e} in: {sql}") })
    }
}

fn text_to_row_value(text: &str) -> RowValue {
    match text {
        "t" => RowValue::Bool(true),
        "f" => RowValue::Bool(false),
        _ => {
            if let Ok(i) = text.parse::<i128>() {
                RowValue::Int(i)
            } else if let Ok(f) = text.parse::<f64>() {
                RowValue::Float(f)
            } else {
                RowValue::Text(text.to_string())
            }
        }
    }
}

fn cell_to_string(v: &RowValue) -> String {
    match v {
        RowValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn cell_to_u32(v: &RowValue) -> Option<u32> {
    match v {
        RowValue::Null => None,
        RowValue::Int(i) => Some(*i as u32),
        RowValue::Float(f) => Some(*f as u32),
        RowValue::Text(s) => s.parse().ok(),
        RowValue::Bool(_) => None,
    }
}
