//! tablekeeper - declarative MySQL table management library.
//!
//! Tables are described as data (a [`model::SchemaModel`]), compared against
//! the live database and brought in line with generated DDL.
//!
//! # Quick Start
//!
//! ```no_run
//! use tablekeeper::prelude::*;
//!
//! let model = SchemaModel::from_json(r#"{
//!     "fields": {
//!         "id": { "type": "int-4", "auto_increment": true },
//!         "name": { "type": "varchar-20" }
//!     },
//!     "properties": { "name": "UserAccount", "primary_key": ["id"] }
//! }"#).unwrap();
//!
//! println!("{}", create_table(&model));
//! ```
//!
//! # Modules
//!
//! - [`model`] - Model types and validation
//! - [`mysql`] - Type mapping, DDL generation and introspection for MySQL
//! - [`diff`] - Model comparison and the operations it produces
//! - [`reconcile`] - Applying a model to a live table
//! - [`loader`] - Reading model files from disk

pub mod diff;
pub mod loader;
pub mod model;
pub mod mysql;
pub mod prelude;
pub mod reconcile;
pub mod util;
