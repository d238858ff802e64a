//! SQL and command-line fragments shared by pipeline steps.

use std::path::Path;

use crate::command::Cmd;

/// Placeholder padding the shop-id list.
///
/// Keeps the generated IN-list from ever being a single-element
/// parenthesized expression, which the engine would misparse.
const PREDICATE_SENTINEL: &str = "-hack-";

/// Renders the shop-id set as a SQL IN-list, e.g. `('-hack-', 'shop_42')`.
pub fn shop_id_predicate(shop_ids: &[String]) -> String {
    let mut values = Vec::with_capacity(shop_ids.len() + 1);
    values.push(quote_literal(PREDICATE_SENTINEL));
    values.extend(shop_ids.iter().map(|id| quote_literal(id)));
    format!("({})", values.join(", "))
}

/// Single-quotes a value as a SQL string literal.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `psql <db> -c <sql>`
pub fn psql_command(db: &str, sql: &str) -> Cmd {
    Cmd::new("psql").arg(db).arg("-c").arg(sql)
}

/// `psql <db> -f <file>`
pub fn psql_file(db: &str, path: &Path) -> Cmd {
    Cmd::new("psql").arg(db).arg("-f").arg(path.display().to_string())
}
