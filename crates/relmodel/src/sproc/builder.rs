use crate::{
    error::ModelError,
    model::{EntityTypeId, Model},
    types::{ConfigurationSource, OperationKind},
};

///
/// StoredProcedureBuilder
///
/// Single generic builder for stored-procedure configuration,
/// parameterized by its configuration source rather than duplicated
/// per owning context. Carries no state beyond the model borrow and
/// the record coordinates; every call forwards to the record.
///
/// Two surfaces:
/// - probing methods (`set_*`, `add_*`, `can_set_*`) return
///   `Ok(false)` on silent rejection, for convention layers;
/// - fluent methods (`has_*`) consume and return the builder for
///   chaining, failing only on hard errors.
///

pub struct StoredProcedureBuilder<'m> {
    model: &'m mut Model,
    entity: EntityTypeId,
    kind: OperationKind,
    source: ConfigurationSource,
}

impl<'m> StoredProcedureBuilder<'m> {
    pub(crate) fn new(
        model: &'m mut Model,
        entity: EntityTypeId,
        kind: OperationKind,
        source: ConfigurationSource,
    ) -> Self {
        Self {
            model,
            entity,
            kind,
            source,
        }
    }

    #[must_use]
    pub const fn entity_type(&self) -> EntityTypeId {
        self.entity
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    #[must_use]
    pub const fn source(&self) -> ConfigurationSource {
        self.source
    }

    /// Resolve a property against the entity's declared properties.
    /// Binding an undeclared property is a hard failure, not a silent
    /// rejection; it is developer-authored configuration gone wrong.
    fn resolve_property(&self, property: &str) -> Result<(), ModelError> {
        let entity = self.model.entity_type(self.entity)?;

        if entity.has_property(property) {
            Ok(())
        } else {
            Err(ModelError::PropertyNotFound {
                entity: entity.name().to_string(),
                property: property.to_string(),
            })
        }
    }

    //
    // probing surface
    //

    /// Set the procedure name at this builder's source. `Ok(false)`
    /// when a higher-ranked writer already named the procedure.
    pub fn set_name(&mut self, name: Option<&str>) -> Result<bool, ModelError> {
        let source = self.source;

        self.model
            .stored_procedure_entry_mut(self.entity, self.kind)?
            .set_name(name.map(str::to_string), source)
    }

    #[must_use]
    pub fn can_set_name(&self, name: Option<&str>) -> bool {
        !self.model.is_frozen()
            && self
                .model
                .stored_procedure(self.entity, self.kind)
                .is_some_and(|sproc| sproc.can_set_name(name, self.source))
    }

    /// Set the schema at this builder's source. `None` clears it back
    /// to the entity/model defaults.
    pub fn set_schema(&mut self, schema: Option<&str>) -> Result<bool, ModelError> {
        let source = self.source;

        self.model
            .stored_procedure_entry_mut(self.entity, self.kind)?
            .set_schema(schema.map(str::to_string), source)
    }

    #[must_use]
    pub fn can_set_schema(&self, schema: Option<&str>) -> bool {
        !self.model.is_frozen()
            && self
                .model
                .stored_procedure(self.entity, self.kind)
                .is_some_and(|sproc| sproc.can_set_schema(schema, self.source))
    }

    /// Bind a declared property as the next procedure parameter.
    /// `Ok(false)` if it is already bound.
    pub fn add_parameter(&mut self, property: &str) -> Result<bool, ModelError> {
        self.resolve_property(property)?;

        self.model
            .stored_procedure_entry_mut(self.entity, self.kind)?
            .add_parameter(property)
    }

    /// Clear the parameter order entirely so the caller can
    /// re-establish it from scratch.
    pub fn reset_parameter_order(&mut self) -> Result<(), ModelError> {
        self.model
            .stored_procedure_entry_mut(self.entity, self.kind)?
            .reset_parameters()
    }

    /// Bind a declared property to the next result column.
    /// `Ok(false)` if it is already bound.
    pub fn add_result_column(&mut self, property: &str) -> Result<bool, ModelError> {
        self.resolve_property(property)?;

        self.model
            .stored_procedure_entry_mut(self.entity, self.kind)?
            .add_result_column(property)
    }

    pub fn reset_result_column_order(&mut self) -> Result<(), ModelError> {
        self.model
            .stored_procedure_entry_mut(self.entity, self.kind)?
            .reset_result_columns()
    }

    //
    // fluent surface
    //

    /// Name the procedure.
    pub fn has_name(mut self, name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        self.set_name(Some(&name))?;

        Ok(self)
    }

    /// Place the procedure in a schema. `None` means "no schema name"
    /// and falls back to the entity/model defaults; the empty string
    /// is rejected outright.
    pub fn has_schema(mut self, schema: Option<&str>) -> Result<Self, ModelError> {
        if schema == Some("") {
            return Err(ModelError::EmptySchema);
        }
        self.set_schema(schema)?;

        Ok(self)
    }

    /// Bind a parameter; a repeat binding of the same property chains
    /// through unchanged.
    pub fn has_parameter(mut self, property: &str) -> Result<Self, ModelError> {
        self.add_parameter(property)?;

        Ok(self)
    }

    /// Bind a result column; a repeat binding of the same property
    /// chains through unchanged.
    pub fn has_result_column(mut self, property: &str) -> Result<Self, ModelError> {
        self.add_result_column(property)?;

        Ok(self)
    }

    /// Discard the current parameter order before re-binding.
    pub fn with_new_parameter_order(mut self) -> Result<Self, ModelError> {
        self.reset_parameter_order()?;

        Ok(self)
    }

    /// Discard the current result-column order before re-binding.
    pub fn with_new_result_column_order(mut self) -> Result<Self, ModelError> {
        self.reset_result_column_order()?;

        Ok(self)
    }
}

///
/// TESTS
///
