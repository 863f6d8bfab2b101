//! WHERE clause predicates.
//!
//! A [`Condition`] is one predicate plus the [`Join`] that connects it to the
//! predicate before it. Conditions render strictly left to right in the order
//! they were added; there is no precedence handling and no regrouping.
//!
//! # Example
//! ```ignore
//! use quill::Condition;
//!
//! Condition::equal("status", "active");           // status = 'active'
//! Condition::like("name", "a%").or();             // OR name LIKE 'a%'
//! Condition::null("deleted_at");                  // deleted_at IS NULL
//! Condition::in_list("id", vec![1, 2, 3]);        // id IN (1,2,3)
//! Condition::between("age", 18, 65);              // age BETWEEN 18 AND 65
//! Condition::statement("score > bonus * 2");      // score > bonus * 2
//! ```

use crate::connection::Connection;
use crate::query::Select;
use crate::query::Query;
use crate::value::{Value, convert_types};
use std::fmt;
use std::sync::Arc;

/// How a condition is joined to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Join {
    #[default]
    And,
    Or,
}

impl Join {
    fn keyword(self) -> &'static str {
        match self {
            Join::And => "AND",
            Join::Or => "OR",
        }
    }
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A literal value, converted through the connection
    Value(Value),
    /// A column reference, emitted verbatim
    Column(String),
    /// A scalar sub-query, emitted in parentheses
    Query(Box<Select>),
}

impl Operand {
    pub fn value(value: impl Into<Value>) -> Self {
        Operand::Value(value.into())
    }

    pub fn column(name: impl Into<String>) -> Self {
        Operand::Column(name.into())
    }

    pub fn query(select: Select) -> Self {
        Operand::Query(Box::new(select))
    }

    fn rebind(&mut self, connection: &Arc<dyn Connection>) {
        if let Operand::Query(q) = self {
            q.rebind(connection);
        }
    }

    fn render(&self, conn: &dyn Connection) -> String {
        match self {
            Operand::Value(v) => convert_types(v, conn),
            Operand::Column(c) => c.clone(),
            Operand::Query(q) => format!("({})", q.build()),
        }
    }
}

#[derive(Debug, Clone)]
enum InSource {
    List(Vec<Value>),
    Query(Box<Select>),
}

#[derive(Debug, Clone)]
enum Predicate {
    Compare {
        column: String,
        operator: String,
        operand: Operand,
    },
    Null {
        column: String,
    },
    In {
        column: String,
        source: InSource,
    },
    Between {
        column: String,
        start: Operand,
        end: Operand,
    },
    Statement(String),
    StatementQuery(Box<Select>),
}

/// A single WHERE predicate.
#[derive(Debug, Clone)]
pub struct Condition {
    predicate: Predicate,
    join: Join,
}

impl Condition {
    fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            join: Join::And,
        }
    }

    /// Generic comparison: `column operator value`.
    ///
    /// With `column_join` set, the value is taken as a column name and emitted
    /// verbatim (for join predicates such as `u.id = p.user_id`).
    pub fn get(
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
        column_join: bool,
    ) -> Self {
        let value = value.into();
        let operand = if column_join {
            Operand::Column(value.as_text())
        } else {
            Operand::Value(value)
        };
        Self::compare(column, operator, operand)
    }

    /// Comparison against any [`Operand`].
    pub fn compare(
        column: impl Into<String>,
        operator: impl Into<String>,
        operand: Operand,
    ) -> Self {
        Self::new(Predicate::Compare {
            column: column.into(),
            operator: operator.into(),
            operand,
        })
    }

    /// `column = value`
    pub fn equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, "=", Operand::value(value))
    }

    /// `column = other_column`
    pub fn equal_column(column: impl Into<String>, other: impl Into<String>) -> Self {
        Self::compare(column, "=", Operand::column(other))
    }

    /// `column LIKE pattern`
    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::compare(column, "LIKE", Operand::value(pattern))
    }

    /// `column IS NULL`
    pub fn null(column: impl Into<String>) -> Self {
        Self::new(Predicate::Null {
            column: column.into(),
        })
    }

    /// `column IN (v1,v2,...)`
    ///
    /// An empty list renders `column IN (NULL)`, which matches no rows.
    pub fn in_list<T: Into<Value>>(column: impl Into<String>, values: Vec<T>) -> Self {
        Self::new(Predicate::In {
            column: column.into(),
            source: InSource::List(values.into_iter().map(Into::into).collect()),
        })
    }

    /// `column IN (<sub-query>)`
    pub fn in_query(column: impl Into<String>, select: Select) -> Self {
        Self::new(Predicate::In {
            column: column.into(),
            source: InSource::Query(Box::new(select)),
        })
    }

    /// `column BETWEEN start AND end`
    pub fn between(
        column: impl Into<String>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        Self::between_operands(column, Operand::value(start), Operand::value(end))
    }

    /// `column BETWEEN start AND end` with arbitrary operands.
    pub fn between_operands(column: impl Into<String>, start: Operand, end: Operand) -> Self {
        Self::new(Predicate::Between {
            column: column.into(),
            start,
            end,
        })
    }

    /// A raw SQL predicate, emitted verbatim.
    ///
    /// # Safety
    ///
    /// This directly concatenates SQL. The caller must ensure safety.
    pub fn statement(sql: impl Into<String>) -> Self {
        Self::new(Predicate::Statement(sql.into()))
    }

    /// A sub-query used as a predicate, e.g. `EXISTS`-style checks.
    pub fn statement_query(select: Select) -> Self {
        Self::new(Predicate::StatementQuery(Box::new(select)))
    }

    /// Join this condition to the previous one with OR.
    pub fn or(mut self) -> Self {
        self.join = Join::Or;
        self
    }

    /// Join this condition to the previous one with AND (the default).
    pub fn and(mut self) -> Self {
        self.join = Join::And;
        self
    }

    pub fn join(&self) -> Join {
        self.join
    }

    /// Point nested sub-queries at `connection`.
    pub(crate) fn rebind(&mut self, connection: &Arc<dyn Connection>) {
        match &mut self.predicate {
            Predicate::Compare { operand, .. } => operand.rebind(connection),
            Predicate::In {
                source: InSource::Query(q),
                ..
            }
            | Predicate::StatementQuery(q) => q.rebind(connection),
            Predicate::Between { start, end, .. } => {
                start.rebind(connection);
                end.rebind(connection);
            }
            Predicate::Null { .. }
            | Predicate::In {
                source: InSource::List(_),
                ..
            }
            | Predicate::Statement(_) => {}
        }
    }

    /// Render the predicate without its join keyword.
    pub fn render(&self, conn: &dyn Connection) -> String {
        match &self.predicate {
            Predicate::Compare {
                column,
                operator,
                operand,
            } => format!("{} {} {}", column, operator, operand.render(conn)),
            Predicate::Null { column } => format!("{} IS NULL", column),
            Predicate::In {
                column,
                source: InSource::List(values),
            } => {
                if values.is_empty() {
                    return format!("{} IN (NULL)", column);
                }
                let items: Vec<String> = values.iter().map(|v| convert_types(v, conn)).collect();
                format!("{} IN ({})", column, items.join(","))
            }
            Predicate::In {
                column,
                source: InSource::Query(q),
            } => format!("{} IN ({})", column, q.build()),
            Predicate::Between { column, start, end } => format!(
                "{} BETWEEN {} AND {}",
                column,
                start.render(conn),
                end.render(conn)
            ),
            Predicate::Statement(sql) => sql.clone(),
            Predicate::StatementQuery(q) => format!("({})", q.build()),
        }
    }
}

/// Render conditions in insertion order, each one after the first prefixed
/// with its join keyword.
pub fn render_conditions(conditions: &[Condition], conn: &dyn Connection) -> String {
    let mut out = String::new();
    for (i, cond) in conditions.iter().enumerate() {
        if i > 0 {
            out.push(' ');
            out.push_str(cond.join.keyword());
            out.push(' ');
        }
        out.push_str(&cond.render(conn));
    }
    out
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Filter;
    use crate::testing::FakeConnection;

    fn render(c: Condition) -> String {
        c.render(&FakeConnection::new())
    }

    #[test]
    fn equal_and_like() {
        assert_eq!(render(Condition::equal("status", "active")), "status = 'active'");
        assert_eq!(render(Condition::equal("id", 7)), "id = 7");
        assert_eq!(render(Condition::like("name", "a%")), "name LIKE 'a%'");
    }

    #[test]
    fn generic_comparison_and_column_join() {
        assert_eq!(render(Condition::get("age", ">=", 21, false)), "age >= 21");
        assert_eq!(
            render(Condition::get("u.id", "=", "p.user_id", true)),
            "u.id = p.user_id"
        );
        assert_eq!(
            render(Condition::equal_column("a.x", "b.y")),
            "a.x = b.y"
        );
    }

    #[test]
    fn null_and_statement() {
        assert_eq!(render(Condition::null("deleted_at")), "deleted_at IS NULL");
        assert_eq!(render(Condition::statement("a > b")), "a > b");
    }

    #[test]
    fn in_list_renders_converted_values() {
        assert_eq!(render(Condition::in_list("id", vec![1, 2, 3])), "id IN (1,2,3)");
        assert_eq!(
            render(Condition::in_list("tag", vec!["a", "b"])),
            "tag IN ('a','b')"
        );
        assert_eq!(
            render(Condition::in_list("id", Vec::<i32>::new())),
            "id IN (NULL)"
        );
    }

    #[test]
    fn between_values_and_subqueries() {
        assert_eq!(
            render(Condition::between("age", 18, 65)),
            "age BETWEEN 18 AND 65"
        );

        let conn = Arc::new(FakeConnection::new());
        let min = Select::with_connection("limits", conn.clone()).columns(&["MIN(v)"]);
        let c = Condition::between_operands("v", Operand::query(min), Operand::value(10));
        assert_eq!(render(c), "v BETWEEN (SELECT MIN(v) FROM limits) AND 10");
    }

    #[test]
    fn sub_query_sources() {
        let conn = Arc::new(FakeConnection::new());
        let inner = Select::with_connection("orders", conn.clone())
            .columns(&["user_id"])
            .where_equal("paid", true);
        assert_eq!(
            render(Condition::in_query("id", inner.clone())),
            "id IN (SELECT user_id FROM orders WHERE paid = TRUE)"
        );
        assert_eq!(
            render(Condition::statement_query(inner)),
            "(SELECT user_id FROM orders WHERE paid = TRUE)"
        );
    }

    #[test]
    fn conditions_render_in_order_with_joins() {
        let conn = FakeConnection::new();
        let conds = vec![
            Condition::equal("a", 1),
            Condition::equal("b", 2).or(),
            Condition::null("c"),
        ];
        assert_eq!(render_conditions(&conds, &conn), "a = 1 OR b = 2 AND c IS NULL");

        let reversed: Vec<Condition> = conds.into_iter().rev().collect();
        assert_eq!(
            render_conditions(&reversed, &conn),
            "c IS NULL OR b = 2 AND a = 1"
        );
    }

    #[test]
    fn first_condition_ignores_its_join() {
        let conn = FakeConnection::new();
        let conds = vec![Condition::equal("a", 1).or()];
        assert_eq!(render_conditions(&conds, &conn), "a = 1");
        assert_eq!(conds[0].join(), Join::Or);
    }
}
