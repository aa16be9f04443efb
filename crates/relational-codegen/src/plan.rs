//! Name resolution and validation, shared by `validate` and `generate`.
//!
//! Planning derives every generated name up front, detects collisions
//! and records them as warnings, so rendering never has to make a
//! naming decision.

use std::collections::HashSet;

use indexmap::IndexMap;
use relational_core::codec::quote_identifier;
use relational_core::{Column, ForeignKey, Schema, Table};

use crate::config::{GeneratorConfig, TableHint};
use crate::error::Warning;
use crate::naming;

/// Generalized field type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `bigint`, `integer`
    Int,
    /// `boolean`
    Bool,
    /// `ARRAY` (integer arrays only)
    IntArray,
    /// Everything else.
    Text,
}

impl FieldKind {
    /// Maps a declared column type.
    #[must_use]
    pub fn of(data_type: &str) -> Self {
        match data_type {
            "bigint" | "integer" => Self::Int,
            "boolean" => Self::Bool,
            "ARRAY" => Self::IntArray,
            _ => Self::Text,
        }
    }

    /// Whether the Rust field type is `Copy`.
    #[must_use]
    pub const fn is_copy(self) -> bool {
        matches!(self, Self::Int | Self::Bool)
    }
}

#[derive(Debug, Clone)]
pub struct FieldPlan<'a> {
    pub column: &'a Column,
    pub ident: String,
    pub getter: Option<String>,
    pub kind: FieldKind,
}

/// How a parent accessor fetches its row.
#[derive(Debug, Clone)]
pub enum ParentCall {
    /// Through the parent's root lookup, arguments in key order.
    Lookup { method: String, args: Vec<String> },
    /// With a direct keyed query when the referenced columns are not the
    /// parent's lookup key.
    Query { sql: String, args: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct ParentPlan<'a> {
    pub fk: &'a ForeignKey,
    pub method: String,
    pub parent_type: String,
    pub call: ParentCall,
}

#[derive(Debug, Clone)]
pub struct ChildPlan<'a> {
    pub fk: &'a ForeignKey,
    pub method: String,
    pub child_type: String,
    pub child_list_method: String,
    /// `(filter key, own field ident, own field kind)` per key column.
    pub bindings: Vec<(String, String, FieldKind)>,
}

#[derive(Debug, Clone)]
pub struct EntityPlan<'a> {
    pub table: &'a Table,
    pub hint: TableHint,
    pub struct_name: String,
    /// Name used wherever the entity type is referenced.
    pub type_name: String,
    pub fields: Vec<FieldPlan<'a>>,
    pub parents: Vec<ParentPlan<'a>>,
    pub children: Vec<ChildPlan<'a>>,
    /// Lookup key columns and the root lookup method, if generated.
    pub lookup: Option<(Vec<String>, String)>,
    pub list_method: String,
    pub list_sql: String,
    pub default_order: Option<String>,
}

impl EntityPlan<'_> {
    fn field(&self, column: &str) -> Option<&FieldPlan<'_>> {
        self.fields.iter().find(|f| f.column.name == column)
    }
}

#[derive(Debug)]
pub struct Plan<'a> {
    pub root_name: String,
    pub entities: Vec<EntityPlan<'a>>,
    pub warnings: Vec<Warning>,
}

pub fn plan<'a>(schema: &'a Schema, config: &GeneratorConfig) -> Plan<'a> {
    let mut warnings = Vec::new();
    for table in config.tables.keys() {
        if !schema.tables.contains_key(table) {
            warnings.push(Warning::UnknownHintTable { table: table.clone() });
        }
    }

    let root_name = naming::type_ident(&config.prefix, "Root");
    let mut type_names: HashSet<String> = HashSet::from([root_name.clone()]);
    let mut entities: Vec<EntityPlan<'a>> = Vec::new();
    for table in schema.tables.values() {
        let hint = config.table_hint(&table.name);
        if hint.skip_impl {
            continue;
        }
        let struct_name = naming::type_ident(&config.prefix, &naming::item_name(&table.name));
        if !type_names.insert(struct_name.clone()) {
            warnings.push(Warning::DuplicateName {
                scope: String::from("types"),
                name: struct_name,
                source_name: table.name.clone(),
            });
            continue;
        }
        entities.push(entity_base(table, hint, struct_name, &mut warnings));
    }

    resolve_lookups(&mut entities, &root_name, &mut warnings);

    let parents: Vec<Vec<ParentPlan<'a>>> = entities
        .iter()
        .map(|entity| parent_plans(entity, &entities))
        .collect();
    let children: Vec<Vec<ChildPlan<'a>>> = entities
        .iter()
        .map(|entity| child_plans(entity, &entities, schema, config, &mut warnings))
        .collect();
    for ((entity, parents), children) in entities.iter_mut().zip(parents).zip(children) {
        entity.parents = parents;
        entity.children = children;
        dedupe_methods(entity, &mut warnings);
    }

    Plan {
        root_name,
        entities,
        warnings,
    }
}

fn entity_base<'a>(
    table: &'a Table,
    hint: TableHint,
    struct_name: String,
    warnings: &mut Vec<Warning>,
) -> EntityPlan<'a> {
    let item = naming::item_name(&table.name);
    let mut idents = HashSet::new();
    let mut fields = Vec::new();
    for column in table.columns.values() {
        let mut ident = naming::field_ident(&column.name);
        // the entity keeps its root handle in `root`
        if ident == "root" {
            ident.push('_');
        }
        if !idents.insert(ident.clone()) {
            warnings.push(Warning::DuplicateName {
                scope: struct_name.clone(),
                name: ident,
                source_name: format!("{}.{}", table.name, column.name),
            });
            continue;
        }
        fields.push(FieldPlan {
            column,
            ident,
            getter: Some(naming::getter(&naming::to_camel_case(&column.name))),
            kind: FieldKind::of(&column.data_type),
        });
    }

    let key: Option<Vec<String>> = if table.is_view() {
        hint.pseudo_view_pk.as_ref().and_then(|pk| {
            let columns = pk.columns();
            let unknown: Vec<&str> = columns.iter().copied().filter(|c| !table.columns.contains_key(*c)).collect();
            for column in &unknown {
                warnings.push(Warning::UnknownKeyColumn {
                    table: table.name.clone(),
                    column: (*column).to_string(),
                });
            }
            unknown
                .is_empty()
                .then(|| columns.iter().map(|c| (*c).to_string()).collect())
        })
    } else {
        if table.primary_key.is_none() {
            warnings.push(Warning::MissingPrimaryKey { table: table.name.clone() });
        }
        table.primary_key.as_ref().map(|pk| pk.columns.clone())
    };

    let default_order = hint.order_by.clone().or_else(|| key.as_ref().map(|k| k.join(",")));
    let mut list_sql = format!("SELECT * FROM {} WHERE true", table.escaped_name());
    if let Some(condition) = hint.lists_filter.as_deref().filter(|c| !c.is_empty()) {
        list_sql.push_str(&format!(" AND ({condition})"));
    }

    EntityPlan {
        table,
        type_name: hint.impl_class.clone().unwrap_or_else(|| struct_name.clone()),
        hint,
        struct_name,
        fields,
        parents: Vec::new(),
        children: Vec::new(),
        lookup: key.map(|k| (k, naming::getter(&item))),
        list_method: naming::list_getter(&item),
        list_sql,
        default_order,
    }
}

/// List methods are unique per entity name; a lookup colliding with any
/// other root method is dropped.
fn resolve_lookups(entities: &mut [EntityPlan<'_>], root_name: &str, warnings: &mut Vec<Warning>) {
    let mut taken: HashSet<String> = entities.iter().map(|e| e.list_method.clone()).collect();
    taken.extend(["new", "from_object_root", "object_root", "db"].map(String::from));
    for entity in entities.iter_mut() {
        let Some((_, method)) = &entity.lookup else { continue };
        if !taken.insert(method.clone()) {
            warnings.push(Warning::DuplicateName {
                scope: root_name.to_string(),
                name: method.clone(),
                source_name: entity.table.name.clone(),
            });
            entity.lookup = None;
        }
    }
}

fn parent_plans<'a>(entity: &EntityPlan<'a>, entities: &[EntityPlan<'a>]) -> Vec<ParentPlan<'a>> {
    let table: &'a Table = entity.table;
    let mut plans = Vec::new();
    for fk in table.foreign_keys.values() {
        let Some(parent) = entities.iter().find(|e| e.table.name == fk.references_table) else {
            continue;
        };
        let Some(args) = fk
            .child_columns()
            .map(|c| entity.field(c).map(|f| f.ident.clone()))
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };

        // lookup arguments follow the parent key order, not the constraint order
        let lookup = parent.lookup.as_ref().and_then(|(key, method)| {
            let mut referenced: Vec<&str> = fk.parent_columns().collect();
            let mut sorted_key: Vec<&str> = key.iter().map(String::as_str).collect();
            referenced.sort_unstable();
            sorted_key.sort_unstable();
            (referenced == sorted_key).then(|| {
                let ordered = key
                    .iter()
                    .filter_map(|k| {
                        fk.columns
                            .iter()
                            .find(|(_, parent_col)| *parent_col == k)
                            .and_then(|(child_col, _)| entity.field(child_col))
                            .map(|f| f.ident.clone())
                    })
                    .collect();
                ParentCall::Lookup {
                    method: method.clone(),
                    args: ordered,
                }
            })
        });
        let call = lookup.unwrap_or_else(|| ParentCall::Query {
            sql: format!(
                "SELECT * FROM {} WHERE {}",
                parent.table.escaped_name(),
                fk.parent_columns()
                    .map(|c| format!("{}=?", quote_identifier(c)))
                    .collect::<Vec<_>>()
                    .join(" AND ")
            ),
            args,
        });

        plans.push(ParentPlan {
            fk,
            method: naming::getter(&naming::fk_accessor_name(fk.child_columns())),
            parent_type: parent.type_name.clone(),
            call,
        });
    }
    plans
}

fn child_plans<'a>(
    entity: &EntityPlan<'a>,
    entities: &[EntityPlan<'a>],
    schema: &'a Schema,
    config: &GeneratorConfig,
    warnings: &mut Vec<Warning>,
) -> Vec<ChildPlan<'a>> {
    if entity.table.is_view() {
        return Vec::new();
    }
    let by_constraint = entity
        .hint
        .use_fk_constraint_names
        .unwrap_or(config.use_fk_constraint_names);

    let table: &'a Table = entity.table;
    let mut incoming: Vec<(&'a ForeignKey, &EntityPlan<'a>)> = Vec::new();
    for fk in schema.incoming_foreign_keys(&table.name) {
        if let Some(child) = entities.iter().find(|e| e.table.name == fk.table) {
            incoming.push((fk, child));
        }
    }

    // classic names collide when one table references this one twice
    let mut groups: IndexMap<String, Vec<&str>> = IndexMap::new();
    if !by_constraint {
        for (fk, _) in &incoming {
            groups
                .entry(naming::reverse_accessor_classic(&fk.table))
                .or_default()
                .push(&fk.name);
        }
        for (accessor, constraints) in groups.iter().filter(|(_, c)| c.len() > 1) {
            let referencing_table = incoming
                .iter()
                .find(|(fk, _)| fk.name == constraints[0])
                .map(|(fk, _)| fk.table.clone())
                .unwrap_or_default();
            warnings.push(Warning::AmbiguousReverseAccessor {
                table: entity.table.name.clone(),
                referencing_table,
                accessor: accessor.clone(),
                constraints: constraints.iter().map(|c| (*c).to_string()).collect(),
            });
        }
    }

    let mut plans = Vec::new();
    for (fk, child) in incoming {
        let classic = naming::reverse_accessor_classic(&fk.table);
        let ambiguous = groups.get(&classic).is_some_and(|c| c.len() > 1);
        let name = if by_constraint || ambiguous {
            naming::reverse_accessor_by_constraint(&fk.table, fk.child_columns())
        } else {
            classic
        };
        let Some(bindings) = fk
            .columns
            .iter()
            .map(|(child_col, parent_col)| {
                entity
                    .field(parent_col)
                    .map(|f| (quote_identifier(child_col), f.ident.clone(), f.kind))
            })
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };
        plans.push(ChildPlan {
            fk,
            method: naming::list_getter(&name),
            child_type: child.type_name.clone(),
            child_list_method: child.list_method.clone(),
            bindings,
        });
    }
    plans
}

/// Column getters win over parent accessors, which win over child lists.
fn dedupe_methods(entity: &mut EntityPlan<'_>, warnings: &mut Vec<Warning>) {
    let mut taken = HashSet::new();
    let scope = entity.struct_name.clone();
    let mut duplicate = |name: &str, source: String| {
        warnings.push(Warning::DuplicateName {
            scope: scope.clone(),
            name: name.to_string(),
            source_name: source,
        });
    };
    for field in &mut entity.fields {
        if let Some(getter) = &field.getter
            && !taken.insert(getter.clone())
        {
            duplicate(getter, format!("{}.{}", field.column.table, field.column.name));
            field.getter = None;
        }
    }
    entity.parents.retain(|p| {
        let fresh = taken.insert(p.method.clone());
        if !fresh {
            duplicate(&p.method, p.fk.name.clone());
        }
        fresh
    });
    entity.children.retain(|c| {
        let fresh = taken.insert(c.method.clone());
        if !fresh {
            duplicate(&c.method, c.fk.name.clone());
        }
        fresh
    });
}
