use crate::{
    list::NameList,
    sproc::StoredProcedure,
    types::{ConfigurationSource, OperationKind},
};
use serde::Serialize;
use std::{collections::BTreeMap, ops::Not};

///
/// EntityTypeId
///
/// Non-owning handle into the model's entity-type table. Stored-procedure
/// records back-reference their owner through this handle rather than a
/// shared strong reference, so metadata and entity types cannot form
/// ownership cycles.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct EntityTypeId(pub(crate) usize);

impl EntityTypeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

///
/// EntityType
///
/// The mapped unit (roughly, a table/row shape) being configured. Owns
/// at most one stored-procedure record per operation kind, keyed by the
/// kind itself. Created and mutated only through [`Model`](crate::model::Model),
/// which enforces the freeze flag.
///

#[derive(Clone, Debug, Serialize)]
pub struct EntityType {
    id: EntityTypeId,
    name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    base_type: Option<EntityTypeId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    table_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<String>,

    #[serde(skip_serializing_if = "NameList::is_empty")]
    properties: NameList,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    stored_procedures: BTreeMap<OperationKind, StoredProcedure>,

    #[serde(skip_serializing_if = "Not::not")]
    removed: bool,
}

impl EntityType {
    pub(crate) fn new(id: EntityTypeId, name: String, base_type: Option<EntityTypeId>) -> Self {
        // By convention an entity maps to a table named after itself
        // until configured otherwise.
        let table_name = Some(name.clone());

        Self {
            id,
            name,
            base_type,
            table_name,
            schema: None,
            properties: NameList::new(),
            stored_procedures: BTreeMap::new(),
            removed: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> EntityTypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn base_type(&self) -> Option<EntityTypeId> {
        self.base_type
    }

    /// Returns `true` once the entity type has been removed from the
    /// model. Stale handles to removed types fail on mutation rather
    /// than dangle.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.removed
    }

    pub(crate) fn set_removed(&mut self) {
        self.removed = true;
        for sproc in self.stored_procedures.values_mut() {
            sproc.set_removed_from_model();
        }
    }

    //
    // table & schema defaults
    //

    /// The table name this entity maps to, used when deriving default
    /// procedure names. `None` for deliberately unmapped types.
    #[must_use]
    pub fn default_table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    /// Override the mapped table name. `None` marks the type unmapped,
    /// which leaves derived procedure names undefined.
    pub fn set_table_name(&mut self, table_name: Option<String>) {
        self.table_name = table_name;
    }

    /// The schema stored-procedure records fall back to when no schema
    /// was configured on the record itself.
    #[must_use]
    pub fn default_schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn set_schema(&mut self, schema: Option<String>) {
        self.schema = schema;
    }

    //
    // properties
    //

    /// Declared property names, in declaration order.
    #[must_use]
    pub const fn properties(&self) -> &NameList {
        &self.properties
    }

    /// Declare a property on this entity type. Returns `false` if the
    /// name was already declared.
    pub fn declare_property(&mut self, name: impl Into<String>) -> bool {
        self.properties.insert(name)
    }

    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains(name)
    }

    //
    // stored procedures
    //

    /// The stored-procedure record configured on this type for `kind`,
    /// if any. Does not consult base types; inheritance fallback lives
    /// on [`Model::stored_procedure`](crate::model::Model::stored_procedure).
    #[must_use]
    pub fn stored_procedure(&self, kind: OperationKind) -> Option<&StoredProcedure> {
        self.stored_procedures.get(&kind)
    }

    #[must_use]
    pub fn insert_stored_procedure(&self) -> Option<&StoredProcedure> {
        self.stored_procedure(OperationKind::Insert)
    }

    #[must_use]
    pub fn update_stored_procedure(&self) -> Option<&StoredProcedure> {
        self.stored_procedure(OperationKind::Update)
    }

    #[must_use]
    pub fn delete_stored_procedure(&self) -> Option<&StoredProcedure> {
        self.stored_procedure(OperationKind::Delete)
    }

    pub(crate) fn stored_procedure_mut(
        &mut self,
        kind: OperationKind,
    ) -> Option<&mut StoredProcedure> {
        self.stored_procedures.get_mut(&kind)
    }

    pub(crate) fn get_or_create_stored_procedure(
        &mut self,
        kind: OperationKind,
        source: ConfigurationSource,
    ) -> &mut StoredProcedure {
        let id = self.id;
        let sproc = self
            .stored_procedures
            .entry(kind)
            .or_insert_with(|| StoredProcedure::new(id, kind, source));
        sproc.update_configuration_source(source);

        sproc
    }

    pub(crate) fn remove_stored_procedure(
        &mut self,
        kind: OperationKind,
    ) -> Option<StoredProcedure> {
        let mut sproc = self.stored_procedures.remove(&kind)?;
        sproc.set_removed_from_model();

        Some(sproc)
    }
}
