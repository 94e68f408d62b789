//! Index options and configuration types.
//!
//! An index configuration is an open record: a handful of well-known, typed
//! entries plus arbitrary caller keys that pass through to the backend
//! untouched. Options overlay a configuration key by key, later writers win.

use serde_json::{Map, Value};

use crate::errors::SearchIndexError;
use crate::interfaces::SearchBackend;
use crate::strategies::{PermissionPredicate, QueryBuilder, SortStrategy};
use crate::utils::json_type_name;
use search_registry_shared::FieldSelection;

/// Default output format of a new index.
pub const DEFAULT_FORMAT: &str = "mongo";

/// Default result cap of a new index.
pub const DEFAULT_LIMIT: u64 = 10;

/// Default backend kind of a new index.
pub const DEFAULT_BACKEND_KIND: &str = "minimongo";

/// Options supplied when declaring an index or running a search.
///
/// Every well-known entry is optional; `None` means the key is absent and the
/// underlying value is kept. Unknown keys live in `extra`.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Fields to search over (wire key `field`).
    pub fields: Option<FieldSelection>,
    /// Output shape selector.
    pub format: Option<String>,
    /// Result cap; must be positive.
    pub limit: Option<u64>,
    /// Backend kind serving the index (wire key `use`).
    pub backend_kind: Option<String>,
    /// Sort strategy override.
    pub sort: Option<SortStrategy>,
    /// Permission predicate override.
    pub permission: Option<PermissionPredicate>,
    /// Query builder override.
    pub query: Option<QueryBuilder>,
    /// Any other caller-supplied keys.
    pub extra: Map<String, Value>,
}

impl IndexOptions {
    /// Create options with no key present.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field (or fields) to search over.
    pub fn with_field(mut self, fields: impl Into<FieldSelection>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the result cap.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the backend kind serving the index.
    pub fn using(mut self, backend_kind: impl Into<String>) -> Self {
        self.backend_kind = Some(backend_kind.into());
        self
    }

    /// Set the sort strategy.
    pub fn with_sort(mut self, sort: SortStrategy) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the permission predicate.
    pub fn with_permission(mut self, permission: PermissionPredicate) -> Self {
        self.permission = Some(permission);
        self
    }

    /// Set the query builder.
    pub fn with_query(mut self, query: QueryBuilder) -> Self {
        self.query = Some(query);
        self
    }

    /// Add a pass-through key.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Parse options from a JSON object.
    ///
    /// `field` (or its alias `fields`, never both), `format`, `limit`, `use`
    /// and `permission` are type checked; `sort` and `query` become static values; every other key is
    /// kept as a pass-through entry.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexOptions)` - The parsed options
    /// * `Err(SearchIndexError::TypeConstraintViolation)` - If the value is not an
    ///   object or a well-known key has the wrong type
    pub fn from_value(value: Value) -> Result<Self, SearchIndexError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(SearchIndexError::type_constraint(format!(
                    "options must be an object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let mut options = Self::new();
        for (key, value) in map {
            match key.as_str() {
                "field" | "fields" => {
                    if options.fields.is_some() {
                        return Err(SearchIndexError::type_constraint(
                            "`field` and `fields` are aliases; supply only one of them",
                        ));
                    }
                    let fields = serde_json::from_value::<FieldSelection>(value).map_err(|_| {
                        SearchIndexError::type_constraint(format!(
                            "`{}` must be a string or an array of strings",
                            key
                        ))
                    })?;
                    options.fields = Some(fields);
                }
                "format" => options.format = Some(expect_string(&key, value)?),
                "use" => options.backend_kind = Some(expect_string(&key, value)?),
                "limit" => {
                    let limit = value.as_u64().filter(|limit| *limit > 0).ok_or_else(|| {
                        SearchIndexError::type_constraint(format!(
                            "`limit` must be a positive integer, got {}",
                            value
                        ))
                    })?;
                    options.limit = Some(limit);
                }
                "permission" => match value {
                    Value::Bool(allowed) => {
                        options.permission = Some(PermissionPredicate::Fixed(allowed))
                    }
                    other => {
                        return Err(SearchIndexError::type_constraint(format!(
                            "`permission` must be a boolean, got {}",
                            json_type_name(&other)
                        )))
                    }
                },
                "sort" => options.sort = Some(SortStrategy::Static(value)),
                "query" => options.query = Some(QueryBuilder::Static(value)),
                _ => {
                    options.extra.insert(key, value);
                }
            }
        }

        Ok(options)
    }

    /// Check invariants that the builder API cannot enforce by type.
    pub fn validate(&self) -> Result<(), SearchIndexError> {
        if self.limit == Some(0) {
            return Err(SearchIndexError::type_constraint(
                "`limit` must be a positive integer, got 0",
            ));
        }
        Ok(())
    }
}

fn expect_string(key: &str, value: Value) -> Result<String, SearchIndexError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(SearchIndexError::type_constraint(format!(
            "`{}` must be a string, got {}",
            key,
            json_type_name(&other)
        ))),
    }
}

/// Default template every new index configuration starts from.
///
/// The lazy entries are not part of the template: they always start as
/// `SortStrategy::BackendDefault`, `PermissionPredicate::AllowAll` and
/// `QueryBuilder::BackendDefault`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefaults {
    pub format: String,
    pub limit: u64,
    pub backend_kind: String,
}

impl Default for IndexDefaults {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            limit: DEFAULT_LIMIT,
            backend_kind: DEFAULT_BACKEND_KIND.to_string(),
        }
    }
}

/// Merged configuration of a named index.
///
/// Owned by the `SearchIndexRegistry`; backends only ever see a snapshot.
#[derive(Debug, Clone)]
pub struct IndexConfiguration {
    /// The index name.
    pub name: String,
    /// Normalized list of fields to search over.
    pub fields: Vec<String>,
    /// Output shape selector, opaque to the registry.
    pub format: String,
    /// Result cap.
    pub limit: u64,
    /// Backend kind serving the index.
    pub backend_kind: String,
    pub sort: SortStrategy,
    pub permission: PermissionPredicate,
    pub query: QueryBuilder,
    /// Pass-through caller keys.
    pub extra: Map<String, Value>,
}

impl IndexConfiguration {
    /// Fresh configuration built from the default template only.
    pub fn from_defaults(name: impl Into<String>, defaults: &IndexDefaults) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            format: defaults.format.clone(),
            limit: defaults.limit,
            backend_kind: defaults.backend_kind.clone(),
            sort: SortStrategy::default(),
            permission: PermissionPredicate::default(),
            query: QueryBuilder::default(),
            extra: Map::new(),
        }
    }

    /// Defaults overlaid with `options`.
    pub fn merged(name: impl Into<String>, defaults: &IndexDefaults, options: &IndexOptions) -> Self {
        let mut config = Self::from_defaults(name, defaults);
        config.apply(options);
        config
    }

    /// Overlay every key present in `options` onto this configuration.
    ///
    /// Shallow: a present key replaces the existing entry wholesale.
    pub fn apply(&mut self, options: &IndexOptions) {
        if let Some(fields) = &options.fields {
            self.fields = fields.as_slice().to_vec();
        }
        if let Some(format) = &options.format {
            self.format = format.clone();
        }
        if let Some(limit) = options.limit {
            self.limit = limit;
        }
        if let Some(kind) = &options.backend_kind {
            self.backend_kind = kind.clone();
        }
        if let Some(sort) = &options.sort {
            self.sort = sort.clone();
        }
        if let Some(permission) = &options.permission {
            self.permission = permission.clone();
        }
        if let Some(query) = &options.query {
            self.query = query.clone();
        }
        for (key, value) in &options.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Evaluate the permission predicate for `search_string`.
    pub fn allows(&self, search_string: &str) -> bool {
        self.permission.allows(search_string)
    }

    /// Resolve the query entry against the backend serving this configuration.
    pub fn build_query<B>(&self, backend: &B, search_string: &str) -> Value
    where
        B: SearchBackend + ?Sized,
    {
        self.query.resolve(backend, self, search_string)
    }

    /// Resolve the sort entry against the backend serving this configuration.
    pub fn build_sort<B>(&self, backend: &B) -> Value
    where
        B: SearchBackend + ?Sized,
    {
        self.sort.resolve(backend, self)
    }

    /// Look up a pass-through key.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
