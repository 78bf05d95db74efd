mod builder;

pub use builder::StoredProcedureBuilder;

use crate::{
    cell::SourcedCell,
    error::ModelError,
    list::NameList,
    model::{EntityType, EntityTypeId, Model},
    types::{ConfigurationSource, OperationKind},
};
use serde::Serialize;
use std::fmt::{self, Display};

///
/// LifecycleState
///
/// Records stay referenceable after being detached from the model;
/// every mutating operation checks this state first and fails fast.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum LifecycleState {
    Active,
    Detached,
}

///
/// StoredProcedure
///
/// Metadata for one named database procedure carrying one operation
/// kind on one entity type: the procedure name and schema (each with
/// write provenance), the ordered property names bound as parameters,
/// and the ordered property names populated from result columns. The
/// two lists are deduplicated independently and never cross-checked;
/// a property may legally appear in both.
///

#[derive(Clone, Debug, Serialize)]
pub struct StoredProcedure {
    kind: OperationKind,
    entity: EntityTypeId,
    name: SourcedCell<String>,
    schema: SourcedCell<String>,

    #[serde(skip_serializing_if = "NameList::is_empty")]
    parameters: NameList,

    #[serde(skip_serializing_if = "NameList::is_empty")]
    result_columns: NameList,

    source: ConfigurationSource,
    state: LifecycleState,
}

impl StoredProcedure {
    pub(crate) fn new(
        entity: EntityTypeId,
        kind: OperationKind,
        source: ConfigurationSource,
    ) -> Self {
        Self {
            kind,
            entity,
            name: SourcedCell::new(),
            schema: SourcedCell::new(),
            parameters: NameList::new(),
            result_columns: NameList::new(),
            source,
            state: LifecycleState::Active,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Non-owning handle to the entity type this record belongs to.
    #[must_use]
    pub const fn entity_type(&self) -> EntityTypeId {
        self.entity
    }

    #[must_use]
    pub const fn configuration_source(&self) -> ConfigurationSource {
        self.source
    }

    pub(crate) fn update_configuration_source(&mut self, source: ConfigurationSource) {
        self.source = source.max_with(Some(self.source));
    }

    #[must_use]
    pub fn is_in_model(&self) -> bool {
        self.state == LifecycleState::Active
    }

    pub(crate) fn set_removed_from_model(&mut self) {
        self.state = LifecycleState::Detached;
    }

    fn ensure_in_model(&self) -> Result<(), ModelError> {
        if self.is_in_model() {
            Ok(())
        } else {
            Err(ModelError::RemovedFromModel)
        }
    }

    //
    // name
    //

    /// The explicitly configured name, if any. Use
    /// [`resolved_name`](Self::resolved_name) for the name downstream
    /// SQL generation consumes.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    #[must_use]
    pub fn name_source(&self) -> Option<ConfigurationSource> {
        self.name.source()
    }

    /// Pure acceptance predicate for [`set_name`](Self::set_name).
    #[must_use]
    pub fn can_set_name(&self, name: Option<&str>, source: ConfigurationSource) -> bool {
        self.is_in_model() && self.name.can_set(name, source)
    }

    /// Set the procedure name. `Ok(false)` means the write was
    /// silently rejected because a higher-ranked writer got there
    /// first; conventions probe this way without erroring.
    pub(crate) fn set_name(
        &mut self,
        name: Option<String>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        self.ensure_in_model()?;

        if !self.name.can_set(name.as_deref(), source) {
            return Ok(false);
        }
        self.name.set(name, source);

        Ok(true)
    }

    /// The name downstream consumers see: the explicit name, else a
    /// default derived on every read from the operation suffix and the
    /// entity's current default table name, so later table renames are
    /// picked up automatically. `None` when the entity has no default
    /// table name.
    #[must_use]
    pub fn resolved_name(&self, entity: &EntityType) -> Option<String> {
        if let Some(name) = self.name.get() {
            return Some(name.clone());
        }

        let table = entity.default_table_name()?;

        Some(format!("{}{table}", self.kind.suffix()))
    }

    //
    // schema
    //

    /// The explicitly configured schema, if any.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.get().map(String::as_str)
    }

    #[must_use]
    pub fn schema_source(&self) -> Option<ConfigurationSource> {
        self.schema.source()
    }

    /// Pure acceptance predicate for [`set_schema`](Self::set_schema).
    #[must_use]
    pub fn can_set_schema(&self, schema: Option<&str>, source: ConfigurationSource) -> bool {
        self.is_in_model() && self.schema.can_set(schema, source)
    }

    /// Set the schema. `None` means "no schema name": resolution falls
    /// back to the entity and model defaults. Emptiness is not policed
    /// here; the explicit builder layer rejects `""`.
    pub(crate) fn set_schema(
        &mut self,
        schema: Option<String>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        self.ensure_in_model()?;

        if !self.schema.can_set(schema.as_deref(), source) {
            return Ok(false);
        }
        self.schema.set(schema, source);

        Ok(true)
    }

    /// The schema downstream consumers see: record, else entity
    /// default, else model default.
    #[must_use]
    pub fn resolved_schema<'a>(
        &'a self,
        entity: &'a EntityType,
        model: &'a Model,
    ) -> Option<&'a str> {
        self.schema()
            .or_else(|| entity.default_schema())
            .or_else(|| model.default_schema())
    }

    //
    // parameters
    //

    /// Property names bound as procedure parameters, in binding order.
    #[must_use]
    pub const fn parameters(&self) -> &NameList {
        &self.parameters
    }

    #[must_use]
    pub fn contains_parameter(&self, property: &str) -> bool {
        self.parameters.contains(property)
    }

    /// Append a parameter binding. `Ok(false)` on duplicate.
    pub(crate) fn add_parameter(
        &mut self,
        property: impl Into<String>,
    ) -> Result<bool, ModelError> {
        self.ensure_in_model()?;

        Ok(self.parameters.insert(property))
    }

    /// Clear the parameter list so a subsequent insertion sequence can
    /// re-establish full binding order.
    pub(crate) fn reset_parameters(&mut self) -> Result<(), ModelError> {
        self.ensure_in_model()?;
        self.parameters.clear();

        Ok(())
    }

    //
    // result columns
    //

    /// Property names populated from the procedure's result, in order.
    #[must_use]
    pub const fn result_columns(&self) -> &NameList {
        &self.result_columns
    }

    #[must_use]
    pub fn contains_result_column(&self, property: &str) -> bool {
        self.result_columns.contains(property)
    }

    /// Append a result-column binding. `Ok(false)` on duplicate.
    pub(crate) fn add_result_column(
        &mut self,
        property: impl Into<String>,
    ) -> Result<bool, ModelError> {
        self.ensure_in_model()?;

        Ok(self.result_columns.insert(property))
    }

    pub(crate) fn reset_result_columns(&mut self) -> Result<(), ModelError> {
        self.ensure_in_model()?;
        self.result_columns.clear();

        Ok(())
    }

    //
    // downstream surface
    //

    /// The callable identifier downstream SQL generation invokes.
    /// Absent until a name resolves. `entity` must be the record's
    /// owning type.
    #[must_use]
    pub fn identifier(&self, entity: &EntityType, model: &Model) -> Option<ProcedureIdentifier> {
        let name = self.resolved_name(entity)?;
        let schema = self.resolved_schema(entity, model).map(str::to_string);

        Some(ProcedureIdentifier { name, schema })
    }
}

impl Display for StoredProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stored procedure", self.kind)?;

        if let Some(name) = self.name() {
            write!(f, " '{name}'")?;
        }
        if !self.parameters.is_empty() {
            write!(f, " ({})", self.parameters.join(", "))?;
        }
        if !self.result_columns.is_empty() {
            write!(f, " -> ({})", self.result_columns.join(", "))?;
        }

        Ok(())
    }
}

///
/// ProcedureIdentifier
///
/// Schema-qualified callable identifier handed to SQL generation.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ProcedureIdentifier {
    pub name: String,
    pub schema: Option<String>,
}

impl Display for ProcedureIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigurationSource::{Convention, Explicit};

    fn model_with_orders() -> (Model, EntityTypeId) {
        let mut model = Model::new();
        let orders = model
            .add_entity_type("Orders")
            .expect("adding an entity type to a fresh model should succeed");

        (model, orders)
    }

    #[test]
    fn default_name_derives_from_kind_and_table() {
        let (mut model, orders) = model_with_orders();

        for (kind, expected) in [
            (OperationKind::Insert, "_InsertOrders"),
            (OperationKind::Update, "_UpdateOrders"),
            (OperationKind::Delete, "_DeleteOrders"),
        ] {
            model
                .get_or_create_stored_procedure(orders, kind, Convention)
                .expect("creating a stored procedure record should succeed");

            let entity = model.entity_type(orders).expect("entity handle should stay valid");
            let sproc = entity.stored_procedure(kind).expect("record should exist");
            assert_eq!(sproc.resolved_name(entity).as_deref(), Some(expected));
        }
    }

    #[test]
    fn default_name_tracks_table_renames() {
        let (mut model, orders) = model_with_orders();
        model
            .get_or_create_stored_procedure(orders, OperationKind::Insert, Explicit)
            .expect("creating a stored procedure record should succeed");

        model
            .entity_type_mut(orders)
            .expect("entity handle should stay valid")
            .set_table_name(Some("PurchaseOrders".to_string()));

        let entity = model.entity_type(orders).expect("entity handle should stay valid");
        let sproc = entity
            .insert_stored_procedure()
            .expect("record should exist");
        assert_eq!(
            sproc.resolved_name(entity).as_deref(),
            Some("_InsertPurchaseOrders")
        );
    }

    #[test]
    fn unmapped_entity_has_no_default_name() {
        let (mut model, orders) = model_with_orders();
        model
            .get_or_create_stored_procedure(orders, OperationKind::Delete, Explicit)
            .expect("creating a stored procedure record should succeed");

        model
            .entity_type_mut(orders)
            .expect("entity handle should stay valid")
            .set_table_name(None);

        let entity = model.entity_type(orders).expect("entity handle should stay valid");
        let sproc = entity
            .delete_stored_procedure()
            .expect("record should exist");
        assert_eq!(sproc.resolved_name(entity), None);
        assert_eq!(sproc.identifier(entity, &model), None);
    }

    #[test]
    fn explicit_name_wins_over_derived_default() {
        let (mut model, orders) = model_with_orders();
        let sproc = model
            .get_or_create_stored_procedure(orders, OperationKind::Insert, Explicit)
            .expect("creating a stored procedure record should succeed");
        sproc
            .set_name(Some("Order_Insert_v2".to_string()), Explicit)
            .expect("setting a name on a live record should succeed");

        let entity = model.entity_type(orders).expect("entity handle should stay valid");
        let sproc = entity
            .insert_stored_procedure()
            .expect("record should exist");
        assert_eq!(sproc.name(), Some("Order_Insert_v2"));
        assert_eq!(sproc.resolved_name(entity).as_deref(), Some("Order_Insert_v2"));
        assert_eq!(sproc.name_source(), Some(Explicit));
    }

    #[test]
    fn schema_falls_back_to_entity_then_model() {
        let (mut model, orders) = model_with_orders();
        model
            .set_default_schema(Some("app".to_string()))
            .expect("setting the model default schema should succeed");
        model
            .get_or_create_stored_procedure(orders, OperationKind::Insert, Explicit)
            .expect("creating a stored procedure record should succeed");

        let entity = model.entity_type(orders).expect("entity handle should stay valid");
        let sproc = entity
            .insert_stored_procedure()
            .expect("record should exist");
        assert_eq!(sproc.resolved_schema(entity, &model), Some("app"));

        model
            .entity_type_mut(orders)
            .expect("entity handle should stay valid")
            .set_schema(Some("sales".to_string()));
        let entity = model.entity_type(orders).expect("entity handle should stay valid");
        let sproc = entity
            .insert_stored_procedure()
            .expect("record should exist");
        assert_eq!(sproc.resolved_schema(entity, &model), Some("sales"));
    }

    #[test]
    fn parameter_and_result_column_lists_are_independent() {
        let (mut model, orders) = model_with_orders();
        let sproc = model
            .get_or_create_stored_procedure(orders, OperationKind::Insert, Explicit)
            .expect("creating a stored procedure record should succeed");

        assert!(sproc.add_parameter("id").expect("live record should accept parameters"));
        assert!(
            sproc
                .add_result_column("id")
                .expect("live record should accept result columns")
        );
        assert!(sproc.contains_parameter("id"));
        assert!(sproc.contains_result_column("id"));
        assert!(!sproc.contains_result_column("name"));
    }

    #[test]
    fn detached_record_rejects_all_mutation() {
        let (mut model, orders) = model_with_orders();
        model
            .get_or_create_stored_procedure(orders, OperationKind::Insert, Explicit)
            .expect("creating a stored procedure record should succeed");

        let mut removed = model
            .remove_stored_procedure(orders, OperationKind::Insert)
            .expect("removal on a live entity type should succeed")
            .expect("an existing record should be returned");

        assert_eq!(
            removed.set_name(Some("x".to_string()), Explicit),
            Err(ModelError::RemovedFromModel)
        );
        assert_eq!(removed.add_parameter("id"), Err(ModelError::RemovedFromModel));
        assert_eq!(removed.add_result_column("id"), Err(ModelError::RemovedFromModel));
        assert_eq!(removed.reset_parameters(), Err(ModelError::RemovedFromModel));
        assert!(!removed.can_set_name(Some("x"), Explicit));
    }

    #[test]
    fn identifier_display_is_schema_qualified() {
        let qualified = ProcedureIdentifier {
            name: "_InsertOrders".to_string(),
            schema: Some("sales".to_string()),
        };
        assert_eq!(qualified.to_string(), "sales._InsertOrders");

        let bare = ProcedureIdentifier {
            name: "_InsertOrders".to_string(),
            schema: None,
        };
        assert_eq!(bare.to_string(), "_InsertOrders");
    }

    #[test]
    fn display_summarizes_bindings() {
        let (mut model, orders) = model_with_orders();
        let sproc = model
            .get_or_create_stored_procedure(orders, OperationKind::Update, Explicit)
            .expect("creating a stored procedure record should succeed");
        sproc
            .set_name(Some("Order_Update".to_string()), Explicit)
            .expect("setting a name on a live record should succeed");
        sproc.add_parameter("id").expect("live record should accept parameters");
        sproc.add_parameter("total").expect("live record should accept parameters");
        sproc
            .add_result_column("row_version")
            .expect("live record should accept result columns");

        assert_eq!(
            sproc.to_string(),
            "Update stored procedure 'Order_Update' (id, total) -> (row_version)"
        );
    }
}
