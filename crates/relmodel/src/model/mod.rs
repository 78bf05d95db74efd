mod entity;

pub use entity::{EntityType, EntityTypeId};

use crate::{
    error::ModelError,
    sproc::{ProcedureIdentifier, StoredProcedure, StoredProcedureBuilder},
    types::{ConfigurationSource, OperationKind},
};
use serde::Serialize;
use std::{collections::BTreeMap, ops::Not};

///
/// Model
///
/// The in-memory metadata graph built by a single model-building
/// session. Owns the entity-type table; all mutation funnels through
/// it so the freeze flag is enforced in one place. Once
/// [`freeze`](Self::freeze) is called the model is read-only and every
/// further mutation fails with [`ModelError::ReadOnly`].
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct Model {
    entities: Vec<EntityType>,

    #[serde(skip)]
    by_name: BTreeMap<String, EntityTypeId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    default_schema: Option<String>,

    #[serde(skip_serializing_if = "Not::not")]
    frozen: bool,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Mark the model read-only. Irreversible for the lifetime of the
    /// value; downstream consumers rely on frozen metadata.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Schema entity types fall back to when neither the
    /// stored-procedure record nor the entity configures one.
    #[must_use]
    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    pub fn set_default_schema(&mut self, schema: Option<String>) -> Result<(), ModelError> {
        self.ensure_mutable()?;
        self.default_schema = schema;

        Ok(())
    }

    const fn ensure_mutable(&self) -> Result<(), ModelError> {
        if self.frozen {
            return Err(ModelError::ReadOnly);
        }

        Ok(())
    }

    //
    // entity types
    //

    /// Add an entity type to the model.
    pub fn add_entity_type(&mut self, name: impl Into<String>) -> Result<EntityTypeId, ModelError> {
        self.add_entity_type_inner(name.into(), None)
    }

    /// Add an entity type deriving from `base`. The base link is fixed
    /// at creation, which keeps the inheritance chain acyclic.
    pub fn add_derived_entity_type(
        &mut self,
        name: impl Into<String>,
        base: EntityTypeId,
    ) -> Result<EntityTypeId, ModelError> {
        self.entity_type(base)?;

        self.add_entity_type_inner(name.into(), Some(base))
    }

    fn add_entity_type_inner(
        &mut self,
        name: String,
        base: Option<EntityTypeId>,
    ) -> Result<EntityTypeId, ModelError> {
        self.ensure_mutable()?;

        if self.by_name.contains_key(&name) {
            return Err(ModelError::DuplicateEntityType(name));
        }

        let id = EntityTypeId(self.entities.len());
        self.by_name.insert(name.clone(), id);
        self.entities.push(EntityType::new(id, name, base));

        Ok(id)
    }

    /// Read access to an entity type. Removed types remain readable;
    /// only mutation fails on them.
    pub fn entity_type(&self, id: EntityTypeId) -> Result<&EntityType, ModelError> {
        self.entities
            .get(id.index())
            .ok_or(ModelError::UnknownEntityType)
    }

    /// Mutable access to an entity type, gated on the freeze flag and
    /// the removed state.
    pub fn entity_type_mut(&mut self, id: EntityTypeId) -> Result<&mut EntityType, ModelError> {
        self.ensure_mutable()?;

        let entity = self
            .entities
            .get_mut(id.index())
            .ok_or(ModelError::UnknownEntityType)?;
        if entity.is_removed() {
            return Err(ModelError::EntityRemoved(entity.name().to_string()));
        }

        Ok(entity)
    }

    #[must_use]
    pub fn find_entity_type(&self, name: &str) -> Option<EntityTypeId> {
        self.by_name.get(name).copied()
    }

    /// Remove an entity type from the model. The slot stays allocated
    /// with a removed flag so stale handles fail predictably, and all
    /// of its stored-procedure records are detached.
    pub fn remove_entity_type(&mut self, id: EntityTypeId) -> Result<(), ModelError> {
        let entity = self.entity_type_mut(id)?;
        entity.set_removed();

        let name = entity.name().to_string();
        self.by_name.remove(&name);

        Ok(())
    }

    /// Iterate live (non-removed) entity types.
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.entities.iter().filter(|entity| !entity.is_removed())
    }

    fn root_type<'a>(&'a self, mut entity: &'a EntityType) -> &'a EntityType {
        while let Some(base) = entity.base_type() {
            match self.entities.get(base.index()) {
                Some(parent) => entity = parent,
                None => break,
            }
        }

        entity
    }

    //
    // stored procedure store & accessor
    //

    /// Fetch or create the stored-procedure record for
    /// `(entity, kind)`. Idempotent identity: repeated calls return
    /// the same record, upgrading its configuration source to the max
    /// of the existing and requested sources.
    pub fn get_or_create_stored_procedure(
        &mut self,
        entity: EntityTypeId,
        kind: OperationKind,
        source: ConfigurationSource,
    ) -> Result<&mut StoredProcedure, ModelError> {
        let entity = self.entity_type_mut(entity)?;

        Ok(entity.get_or_create_stored_procedure(kind, source))
    }

    /// Read-only lookup. A derived type with no record of its own
    /// resolves the record configured on its root type, so an
    /// inheritance hierarchy can share one mapping.
    #[must_use]
    pub fn stored_procedure(
        &self,
        entity: EntityTypeId,
        kind: OperationKind,
    ) -> Option<&StoredProcedure> {
        let entity = self.entities.get(entity.index())?;

        if let Some(sproc) = entity.stored_procedure(kind) {
            return Some(sproc);
        }

        if entity.base_type().is_some() {
            return self.root_type(entity).stored_procedure(kind);
        }

        None
    }

    /// Provenance of the record configured on this type itself, if any.
    /// Does not consult base types.
    #[must_use]
    pub fn stored_procedure_source(
        &self,
        entity: EntityTypeId,
        kind: OperationKind,
    ) -> Option<ConfigurationSource> {
        self.entities
            .get(entity.index())?
            .stored_procedure(kind)
            .map(StoredProcedure::configuration_source)
    }

    /// Detach and return the record for `(entity, kind)`. The returned
    /// record reports `is_in_model() == false` and rejects all further
    /// mutation.
    pub fn remove_stored_procedure(
        &mut self,
        entity: EntityTypeId,
        kind: OperationKind,
    ) -> Result<Option<StoredProcedure>, ModelError> {
        let entity = self.entity_type_mut(entity)?;

        Ok(entity.remove_stored_procedure(kind))
    }

    pub(crate) fn stored_procedure_entry_mut(
        &mut self,
        entity: EntityTypeId,
        kind: OperationKind,
    ) -> Result<&mut StoredProcedure, ModelError> {
        let entity = self.entity_type_mut(entity)?;

        entity
            .stored_procedure_mut(kind)
            .ok_or(ModelError::RemovedFromModel)
    }

    //
    // builders
    //

    /// Begin configuring the stored procedure for `(entity, kind)` at
    /// the given configuration source, creating the record if needed.
    pub fn use_stored_procedure(
        &mut self,
        entity: EntityTypeId,
        kind: OperationKind,
        source: ConfigurationSource,
    ) -> Result<StoredProcedureBuilder<'_>, ModelError> {
        self.get_or_create_stored_procedure(entity, kind, source)?;

        Ok(StoredProcedureBuilder::new(self, entity, kind, source))
    }

    /// Configure the insert stored procedure from explicit user code.
    pub fn insert_using_stored_procedure(
        &mut self,
        entity: EntityTypeId,
    ) -> Result<StoredProcedureBuilder<'_>, ModelError> {
        self.use_stored_procedure(entity, OperationKind::Insert, ConfigurationSource::Explicit)
    }

    /// Configure the update stored procedure from explicit user code.
    pub fn update_using_stored_procedure(
        &mut self,
        entity: EntityTypeId,
    ) -> Result<StoredProcedureBuilder<'_>, ModelError> {
        self.use_stored_procedure(entity, OperationKind::Update, ConfigurationSource::Explicit)
    }

    /// Configure the delete stored procedure from explicit user code.
    pub fn delete_using_stored_procedure(
        &mut self,
        entity: EntityTypeId,
    ) -> Result<StoredProcedureBuilder<'_>, ModelError> {
        self.use_stored_procedure(entity, OperationKind::Delete, ConfigurationSource::Explicit)
    }

    //
    // downstream surface
    //

    /// The callable identifier downstream SQL generation would invoke
    /// for `(entity, kind)`, once a name resolves. Resolution happens
    /// against the record's owning type, which matters when the record
    /// is inherited from a root type.
    #[must_use]
    pub fn procedure_identifier(
        &self,
        entity: EntityTypeId,
        kind: OperationKind,
    ) -> Option<ProcedureIdentifier> {
        let sproc = self.stored_procedure(entity, kind)?;
        let owner = self.entities.get(sproc.entity_type().index())?;

        sproc.identifier(owner, self)
    }
}

///
/// TESTS
///
