//! Compile a [`Filter`] into a parameterized Postgres predicate over the
//! `metadata jsonb` column. Field names and values are always bound, never
//! inlined.

use serde_json::Value;

use super::Filter;

/// A bind parameter produced by filter compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Json(Value),
}

/// A compiled predicate plus its parameters, numbered from `first_param`.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<SqlParam>,
}

struct Compiler {
    next: usize,
    params: Vec<SqlParam>,
}

impl Compiler {
    fn push(&mut self, p: SqlParam) -> String {
        let n = self.next;
        self.next += 1;
        self.params.push(p);
        format!("${n}")
    }

    fn field(&mut self, field: &str) -> String {
        let p = self.push(SqlParam::Text(field.to_string()));
        format!("(metadata -> {p}::text)")
    }

    fn compile(&mut self, filter: &Filter) -> String {
        match filter {
            Filter::Compare { field, op, value } => {
                let lhs = self.field(field);
                let rhs = self.push(SqlParam::Json(value.clone()));
                format!("{lhs} {} {rhs}::jsonb", op.sql())
            }
            Filter::In { field, values } => {
                if values.is_empty() {
                    return "false".to_string();
                }
                let lhs = self.field(field);
                let items: Vec<String> = values
                    .iter()
                    .map(|v| format!("{}::jsonb", self.push(SqlParam::Json(v.clone()))))
                    .collect();
                format!("{lhs} = any(array[{}])", items.join(", "))
            }
            Filter::Contains { field, value } => {
                let lhs = self.field(field);
                let rhs = self.push(SqlParam::Json(Value::Array(vec![value.clone()])));
                format!("{lhs} @> {rhs}::jsonb")
            }
            Filter::And(filters) => self.join(filters, " and "),
            Filter::Or(filters) => self.join(filters, " or "),
        }
    }

    fn join(&mut self, filters: &[Filter], sep: &str) -> String {
        let parts: Vec<String> = filters.iter().map(|f| self.compile(f)).collect();
        format!("({})", parts.join(sep))
    }
}

/// Compile `filter`, numbering placeholders from `first_param`.
pub fn compile(filter: &Filter, first_param: usize) -> SqlFilter {
    let mut c = Compiler { next: first_param, params: Vec::new() };
    let clause = c.compile(filter);
    SqlFilter { clause, params: c.params }
}
