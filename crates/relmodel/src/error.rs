use thiserror::Error as ThisError;

///
/// ModelError
///
/// Hard failures of the model-building API. Provenance conflicts and
/// duplicate list adds are not errors; they surface as "not applied"
/// return values so convention layers can probe safely.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum ModelError {
    #[error("entity type '{0}' is already defined in the model")]
    DuplicateEntityType(String),

    #[error("schema name may be omitted but must not be empty")]
    EmptySchema,

    #[error("entity type '{0}' has been removed from the model")]
    EntityRemoved(String),

    #[error("property '{property}' is not declared on entity type '{entity}'")]
    PropertyNotFound { entity: String, property: String },

    #[error("the model is read-only; no further configuration is allowed")]
    ReadOnly,

    #[error("stored procedure is no longer part of the model")]
    RemovedFromModel,

    #[error("entity type handle does not belong to this model")]
    UnknownEntityType,
}
