//! Identifier derivation for generated code.
//!
//! These rules decide every generated type and method name, so changing
//! any of them renames generated API.

/// Replaces every character outside `[A-Za-z0-9_]` with `_`.
#[must_use]
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// `order_items` -> `OrderItems`. Underscores separate words and are
/// dropped; the rest of each word is kept as is.
#[must_use]
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for word in sanitize(name).split('_') {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    out
}

/// `OrderItem` -> `order_item`. A run of capitals is one word:
/// `UserID` -> `user_id`, `HTTPServer` -> `http_server`.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let starts_word = match prev {
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(char::is_ascii_lowercase),
                Some(p) => p != '_',
                None => false,
            };
            if starts_word {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Strips one trailing `s`, except from names ending in `status`.
#[must_use]
pub fn singularize(name: &str) -> &str {
    match name.strip_suffix('s') {
        Some(stem) if !name.ends_with("status") => stem,
        _ => name,
    }
}

/// Singular camel-case entity name: `order_items` -> `OrderItem`.
#[must_use]
pub fn item_name(table: &str) -> String {
    to_camel_case(singularize(table))
}

/// Parent accessor name: referencing columns without their `_id`
/// suffix, joined with `_`, camel-cased. `(customer_id)` -> `Customer`.
#[must_use]
pub fn fk_accessor_name<'a>(columns: impl IntoIterator<Item = &'a str>) -> String {
    let stems: Vec<&str> = columns
        .into_iter()
        .map(|c| c.strip_suffix("_id").unwrap_or(c))
        .collect();
    to_camel_case(&stems.join("_"))
}

/// Child-list accessor name in classic style: the referencing table's
/// singular name.
#[must_use]
pub fn reverse_accessor_classic(referencing_table: &str) -> String {
    item_name(referencing_table)
}

/// Child-list accessor name in by-constraint style:
/// `OrderByBillingCustomer`.
#[must_use]
pub fn reverse_accessor_by_constraint<'a>(
    referencing_table: &str,
    columns: impl IntoIterator<Item = &'a str>,
) -> String {
    format!("{}By{}", item_name(referencing_table), fk_accessor_name(columns))
}

/// Rust getter for a camel-case accessor name: `BillingCustomer` ->
/// `get_billing_customer`.
#[must_use]
pub fn getter(camel: &str) -> String {
    format!("get_{}", to_snake_case(camel))
}

/// Rust list getter: `Order` -> `get_order_list`.
#[must_use]
pub fn list_getter(camel: &str) -> String {
    format!("get_{}_list", to_snake_case(camel))
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn",
    "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Struct field identifier for a column.
#[must_use]
pub fn field_ident(column: &str) -> String {
    let ident = sanitize(column).to_ascii_lowercase();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{ident}")
    } else if matches!(ident.as_str(), "self" | "super" | "crate" | "_") {
        format!("{ident}_")
    } else if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{ident}")
    } else {
        ident
    }
}

/// Type identifier: prefix plus camel-case name.
#[must_use]
pub fn type_ident(prefix: &str, camel: &str) -> String {
    let name = format!("{prefix}{camel}");
    if name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name
    } else {
        format!("T{name}")
    }
}
