//! Rust source emission for a [`Plan`].

use relational_core::codec::quote_identifier;
use relational_core::Schema;

use crate::config::GeneratorConfig;
use crate::plan::{ChildPlan, EntityPlan, FieldKind, FieldPlan, ParentCall, ParentPlan, Plan};

pub fn render(plan: &Plan<'_>, schema: &Schema, config: &GeneratorConfig) -> String {
    let rt = &config.runtime_crate;
    let mut out = format!(
        "// Generated by relational-codegen. Do not edit.\n\
         \n\
         #[allow(unused_imports)]\n\
         use {rt}::orm::{{cast, field, Entity, Filter, ObjectRoot}};\n\
         #[allow(unused_imports)]\n\
         use {rt}::{{AssocRow, Database, Result, Value}};\n\
         #[allow(unused_imports)]\n\
         use {rt}::indexmap::IndexMap;\n\
         #[allow(unused_imports)]\n\
         use std::sync::Arc;\n\
         \n"
    );
    out.push_str(&render_root(plan));
    for entity in &plan.entities {
        out.push('\n');
        out.push_str(&render_entity(entity, &plan.root_name));
    }
    out.push_str(&format!(
        "\n/*\nsource schema:\n\n{}*/\n",
        schema.to_string().replace("*/", "* /").replace("/*", "/ *")
    ));
    out
}

// ================================================================
// Root type
// ================================================================

fn render_root(plan: &Plan<'_>) -> String {
    let root = &plan.root_name;
    let mut out = format!(
        "/// Entry point of the generated model: lookups by key and lists.\n\
         #[derive(Debug, Clone)]\n\
         pub struct {root} {{\n\
         \x20   root: ObjectRoot,\n\
         }}\n\
         \n\
         impl {root} {{\n\
         \x20   pub fn new(db: Arc<Database>) -> Self {{\n\
         \x20       Self {{ root: ObjectRoot::new(db) }}\n\
         \x20   }}\n\
         \n\
         \x20   pub const fn from_object_root(root: ObjectRoot) -> Self {{\n\
         \x20       Self {{ root }}\n\
         \x20   }}\n\
         \n\
         \x20   pub const fn object_root(&self) -> &ObjectRoot {{\n\
         \x20       &self.root\n\
         \x20   }}\n\
         \n\
         \x20   pub fn db(&self) -> &Database {{\n\
         \x20       self.root.db()\n\
         \x20   }}\n"
    );
    for entity in &plan.entities {
        if let Some((key, method)) = &entity.lookup {
            out.push_str(&render_lookup(entity, key, method));
        }
        out.push_str(&render_list(entity));
    }
    out.push_str("}\n");
    out
}

fn render_lookup(entity: &EntityPlan<'_>, key: &[String], method: &str) -> String {
    let args: Vec<String> = key
        .iter()
        .enumerate()
        .map(|(i, column)| {
            entity
                .fields
                .iter()
                .find(|f| f.column.name == *column)
                .map_or_else(|| format!("key_{i}"), |f| f.ident.clone())
        })
        .collect();
    let sql = format!(
        "SELECT * FROM {} WHERE {}",
        entity.table.escaped_name(),
        key.iter()
            .map(|c| format!("{}=?", quote_identifier(c)))
            .collect::<Vec<_>>()
            .join(" AND ")
    );
    let signature = args
        .iter()
        .map(|a| format!("{a}: impl Into<Value>"))
        .collect::<Vec<_>>()
        .join(", ");
    let values = args
        .iter()
        .map(|a| format!("{a}.into()"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "\n\
         \x20   pub fn {method}(&self, {signature}) -> Result<Option<{ty}>> {{\n\
         \x20       let params: Vec<Value> = vec![{values}];\n\
         \x20       self.root.create_object({sql:?}, params)\n\
         \x20   }}\n",
        ty = entity.type_name,
    )
}

fn render_list(entity: &EntityPlan<'_>) -> String {
    let order = entity
        .default_order
        .as_ref()
        .map_or_else(|| String::from("order_by"), |o| format!("order_by.or(Some({o:?}))"));
    format!(
        "\n\
         \x20   pub fn {method}(&self, filter: Option<Filter>, order_by: Option<&str>) -> Result<Vec<{ty}>> {{\n\
         \x20       self.root\n\
         \x20           .create_object_list_with_filter({sql:?}, {order}, filter.as_ref())\n\
         \x20   }}\n",
        method = entity.list_method,
        ty = entity.type_name,
        sql = entity.list_sql,
    )
}

// ================================================================
// Entity types
// ================================================================

const fn rust_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Int => "Option<i64>",
        FieldKind::Bool => "Option<bool>",
        FieldKind::IntArray => "Option<Vec<i64>>",
        FieldKind::Text => "Option<String>",
    }
}

const fn cast_fn(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Int => "to_int",
        FieldKind::Bool => "to_bool",
        FieldKind::IntArray => "to_int_array",
        FieldKind::Text => "to_text",
    }
}

/// Field read as an owned value.
fn owned(ident: &str, kind: FieldKind) -> String {
    if kind.is_copy() {
        format!("self.{ident}")
    } else {
        format!("self.{ident}.clone()")
    }
}

fn render_entity(entity: &EntityPlan<'_>, root: &str) -> String {
    let name = &entity.struct_name;
    let mut out = format!("/// Row of `{}`.\n///\n/// ```text\n", entity.table.name);
    for line in entity.table.to_string().lines() {
        out.push_str(&format!("/// {line}\n"));
    }
    out.push_str("/// ```\n");
    out.push_str(&format!(
        "#[derive(Debug, Clone)]\npub struct {name} {{\n    root: {root},\n"
    ));
    for field in &entity.fields {
        out.push_str(&format!("    {}: {},\n", field.ident, rust_type(field.kind)));
    }
    out.push_str("}\n\n");

    out.push_str(&format!(
        "impl {name} {{\n\
         \x20   pub const fn root(&self) -> &{root} {{\n\
         \x20       &self.root\n\
         \x20   }}\n"
    ));
    for field in &entity.fields {
        if let Some(getter) = &field.getter {
            out.push('\n');
            out.push_str(&render_getter(field, getter));
        }
    }
    for parent in &entity.parents {
        out.push('\n');
        out.push_str(&render_parent(entity, parent));
    }
    for child in &entity.children {
        out.push('\n');
        out.push_str(&render_child(child));
    }
    out.push_str("}\n\n");

    out.push_str(&render_entity_impl(entity, root));
    out
}

fn render_getter(field: &FieldPlan<'_>, getter: &str) -> String {
    let ident = &field.ident;
    let (ty, body) = match field.kind {
        FieldKind::Int => ("Option<i64>", format!("self.{ident}")),
        FieldKind::Bool => ("Option<bool>", format!("self.{ident}")),
        FieldKind::IntArray => ("Option<&[i64]>", format!("self.{ident}.as_deref()")),
        FieldKind::Text => ("Option<&str>", format!("self.{ident}.as_deref()")),
    };
    format!("    pub fn {getter}(&self) -> {ty} {{\n        {body}\n    }}\n")
}

fn render_parent(entity: &EntityPlan<'_>, parent: &ParentPlan<'_>) -> String {
    let mut out = format!(
        "    pub fn {}(&self) -> Result<Option<{}>> {{\n",
        parent.method, parent.parent_type
    );
    for column in parent.fk.child_columns() {
        if let Some(field) = entity.fields.iter().find(|f| f.column.name == column) {
            out.push_str(&format!(
                "        let Some({ident}) = {value} else {{\n\
                 \x20           return Ok(None);\n\
                 \x20       }};\n",
                ident = field.ident,
                value = owned(&field.ident, field.kind),
            ));
        }
    }
    match &parent.call {
        ParentCall::Lookup { method, args } => {
            out.push_str(&format!("        self.root.{method}({})\n", args.join(", ")));
        }
        ParentCall::Query { sql, args } => {
            let values = args
                .iter()
                .map(|a| format!("Value::from({a})"))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!(
                "        let params: Vec<Value> = vec![{values}];\n\
                 \x20       self.root.object_root().create_object({sql:?}, params)\n"
            ));
        }
    }
    out.push_str("    }\n");
    out
}

fn render_child(child: &ChildPlan<'_>) -> String {
    let mut filter = String::from("filter.unwrap_or_default()");
    for (key, ident, kind) in &child.bindings {
        filter.push_str(&format!(".eq({key:?}, {})", owned(ident, *kind)));
    }
    format!(
        "    pub fn {method}(&self, filter: Option<Filter>, order_by: Option<&str>) -> Result<Vec<{ty}>> {{\n\
         \x20       let filter = {filter};\n\
         \x20       self.root.{list}(Some(filter), order_by)\n\
         \x20   }}\n",
        method = child.method,
        ty = child.child_type,
        list = child.child_list_method,
    )
}

fn render_entity_impl(entity: &EntityPlan<'_>, root: &str) -> String {
    let mut out = format!(
        "impl Entity for {name} {{\n\
         \x20   const TABLE: &'static str = {table:?};\n\
         \n\
         \x20   fn from_row(root: &ObjectRoot, row: &AssocRow) -> Result<Self> {{\n\
         \x20       Ok(Self {{\n\
         \x20           root: {root}::from_object_root(root.clone()),\n",
        name = entity.struct_name,
        table = entity.table.name,
    );
    for field in &entity.fields {
        out.push_str(&format!(
            "            {}: cast::{}(field(row, Self::TABLE, {:?})?)?,\n",
            field.ident,
            cast_fn(field.kind),
            field.column.name
        ));
    }
    out.push_str(
        "        })\n    }\n\n    fn to_map(&self) -> IndexMap<String, Value> {\n        let mut map = IndexMap::new();\n",
    );
    for field in &entity.fields {
        out.push_str(&format!(
            "        map.insert(String::from({:?}), Value::from({}));\n",
            field.column.name,
            owned(&field.ident, field.kind)
        ));
    }
    out.push_str("        map\n    }\n}\n");
    out
}
