use crate::Result;

use std::borrow::Cow;
use stepwise_core::{
    async_trait,
    driver::{Connection, Driver},
    Error,
};
use url::Url;

/// A driver chosen from the scheme of a connection URL.
///
/// | Scheme                      | Driver                       | Feature      |
/// |-----------------------------|------------------------------|--------------|
/// | `sqlite`, `better-sqlite3`  | `stepwise-driver-sqlite`     | `sqlite`     |
/// | `mysql`                     | `stepwise-driver-mysql`      | `mysql`      |
/// | `postgresql`, `postgres`    | `stepwise-driver-postgresql` | `postgresql` |
#[derive(Debug)]
pub struct Connect {
    driver: Box<dyn Driver>,
}

impl Connect {
    pub fn new(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url}")))?;

        let driver = match parsed.scheme() {
            "mysql" => mysql(url)?,
            "postgresql" | "postgres" => postgresql(url)?,
            "sqlite" | "better-sqlite3" => sqlite(url)?,
            scheme => {
                return Err(Error::invalid_connection_url(format!(
                    "unsupported database; scheme={scheme}; url={url}"
                )))
            }
        };

        Ok(Self { driver })
    }
}

#[async_trait]
impl Driver for Connect {
    fn url(&self) -> Cow<'_, str> {
        self.driver.url()
    }

    async fn connect(&self) -> Result<Box<dyn Connection>> {
        self.driver.connect().await
    }
}

#[cfg(feature = "mysql")]
fn mysql(url: &str) -> Result<Box<dyn Driver>> {
    Ok(Box::new(stepwise_driver_mysql::MySQL::new(url)?))
}

#[cfg(not(feature = "mysql"))]
fn mysql(_url: &str) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_connection_url("`mysql` feature not enabled"))
}

#[cfg(feature = "postgresql")]
fn postgresql(url: &str) -> Result<Box<dyn Driver>> {
    Ok(Box::new(stepwise_driver_postgresql::PostgreSQL::new(url)?))
}

#[cfg(not(feature = "postgresql"))]
fn postgresql(_url: &str) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_connection_url("`postgresql` feature not enabled"))
}

#[cfg(feature = "sqlite")]
fn sqlite(url: &str) -> Result<Box<dyn Driver>> {
    Ok(Box::new(stepwise_driver_sqlite::Sqlite::new(url)?))
}

#[cfg(not(feature = "sqlite"))]
fn sqlite(_url: &str) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_connection_url("`sqlite` feature not enabled"))
}
