//! relmodel — declarative stored-procedure mapping metadata.
//!
//! A model-building session declares, per entity type, which database
//! stored procedures carry its insert, update, and delete operations:
//! the procedure name, its schema, the properties bound as parameters
//! (order significant) and the properties populated from result
//! columns. The resulting metadata is consumed by downstream SQL
//! generation; no SQL is generated here.

pub mod cell;
pub mod error;
pub mod list;
pub mod model;
pub mod sproc;
pub mod types;

pub use error::ModelError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        cell::SourcedCell,
        error::ModelError,
        list::NameList,
        model::{EntityType, EntityTypeId, Model},
        sproc::{ProcedureIdentifier, StoredProcedure, StoredProcedureBuilder},
        types::{ConfigurationSource, OperationKind},
    };
}
