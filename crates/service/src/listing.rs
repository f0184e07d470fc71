//! Query helpers shared by the list endpoints: text matching, multi-term
//! search and `ordering=` parsing.

use sea_orm::sea_query::{Alias, Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::{Condition, EntityTrait, Order, QueryOrder, Select};

/// Escape `%`, `_` and `\` for use inside a LIKE pattern.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(&term.to_lowercase()))
}

/// `LOWER(col) LIKE '%term%'`
pub fn icontains<C: IntoColumnRef>(col: C, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(contains_pattern(term))
}

/// `LOWER(col) = LOWER(value)`
pub fn iexact<C: IntoColumnRef>(col: C, value: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).eq(value.to_lowercase())
}

/// Case-insensitive containment on the text rendering of a JSON column.
pub fn json_icontains<C: IntoColumnRef>(col: C, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Func::cast_as(Expr::col(col), Alias::new("text")))).like(contains_pattern(term))
}

/// Whitespace-separated search terms.
pub fn search_terms(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| s.split_whitespace().map(str::to_string).collect()).unwrap_or_default()
}

/// Every term must match at least one of the expressions `fields` yields for it.
pub fn search_condition(terms: &[String], fields: impl Fn(&str) -> Vec<SimpleExpr>) -> Option<Condition> {
    if terms.is_empty() {
        return None;
    }
    let mut all = Condition::all();
    for term in terms {
        let mut any = Condition::any();
        for expr in fields(term) {
            any = any.add(expr);
        }
        all = all.add(any);
    }
    Some(all)
}

/// One `ordering=` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderField {
    pub name: String,
    pub desc: bool,
}

/// Parse `f1,-f2`, keeping only names in `allowed`.
pub fn parse_ordering(raw: Option<&str>, allowed: &[&str]) -> Vec<OrderField> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            let (desc, name) = match s.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, s),
            };
            allowed.contains(&name).then(|| OrderField { name: name.to_string(), desc })
        })
        .collect()
}

/// Apply the requested ordering (or `default` when none survived parsing),
/// then the primary key as a stable tie-breaker.
pub fn apply_ordering<E: EntityTrait>(
    mut select: Select<E>,
    fields: &[OrderField],
    default: &[OrderField],
    column: impl Fn(&str) -> Option<E::Column>,
    pk: E::Column,
) -> Select<E> {
    let chosen = if fields.is_empty() { default } else { fields };
    for f in chosen {
        if let Some(col) = column(&f.name) {
            select = select.order_by(col, if f.desc { Order::Desc } else { Order::Asc });
        }
    }
    select.order_by(pk, Order::Asc)
}

/// `-created_at`
pub fn newest_first() -> Vec<OrderField> {
    vec![OrderField { name: "created_at".into(), desc: true }]
}

/// Parse a comma-separated list of ids; `None` when any entry is not a number.
pub fn parse_id_list(raw: &str) -> Option<Vec<i32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i32>().ok())
        .collect()
}
