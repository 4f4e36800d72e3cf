//! BIG-IP Object Listing
//!
//! Lists and reads LTM configuration objects (pools, virtual servers,
//! monitors, ...) from an F5 BIG-IP over iControl REST.
//!
//! # Example
//!
//! ```no_run
//! use netops_mcp::bigip::{BigIpClient, ObjectLister};
//! use netops_mcp::config::BigIpConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BigIpConfig {
//!         host: Some("10.1.1.4".into()),
//!         username: Some("admin".into()),
//!         password: Some("admin".into()),
//!         ..Default::default()
//!     };
//!     let client = BigIpClient::new(&config)?;
//!
//!     let pools = client.list_objects("pool", None).await?;
//!     println!("{}", pools.to_json());
//!     Ok(())
//! }
//! ```

mod client;
mod error;

pub use client::BigIpClient;
pub use error::BigIpError;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// Result of an object lookup
///
/// Serializes as a plain JSON array in both cases.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ObjectListing {
    /// Names of every object in a collection
    Names(Vec<String>),

    /// Full property maps (one entry for a named lookup)
    Objects(Vec<Map<String, Value>>),
}

impl ObjectListing {
    pub fn len(&self) -> usize {
        match self {
            ObjectListing::Names(names) => names.len(),
            ObjectListing::Objects(objects) => objects.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> Value {
        match self {
            ObjectListing::Names(names) => {
                Value::Array(names.iter().cloned().map(Value::String).collect())
            }
            ObjectListing::Objects(objects) => {
                Value::Array(objects.iter().cloned().map(Value::Object).collect())
            }
        }
    }
}

/// Source of LTM objects
///
/// `obj_name` of `None` (or empty) lists the names in the `obj_type`
/// collection; otherwise the named object's properties are returned.
#[async_trait]
pub trait ObjectLister: Send + Sync {
    async fn list_objects(
        &self,
        obj_type: &str,
        obj_name: Option<&str>,
    ) -> Result<ObjectListing, BigIpError>;
}
