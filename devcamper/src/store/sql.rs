//! sea-orm backed store.
//!
//! Every collection lives in one `documents` table; bodies are JSON text and
//! filters, sorts and windows run inside SQLite through `json_each` and
//! `json_extract`. Projection is applied to the fetched bodies.

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set,
    Value as SqlValue,
};
use serde_json::Value;

use super::document::{Document, ID_FIELD, document_id, merge_changes};
use super::{DocumentStore, FindQuery, new_id};
use crate::filtering::{Comparison, Filter, Operator, Predicate};

pub mod entity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "documents")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub seq: i64,
        pub collection: String,
        #[sea_orm(unique)]
        pub doc_id: String,
        #[sea_orm(column_type = "Text")]
        pub body: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

use entity::{ActiveModel, Column, Entity, Model};

/// Document store over a sea-orm connection.
#[derive(Debug, Clone)]
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    /// Connect to `url` and create the `documents` table if it is missing.
    ///
    /// In-memory SQLite URLs are pinned to a single pooled connection so the
    /// database outlives individual queries.
    ///
    /// # Errors
    /// Returns the connection or schema error.
    pub async fn connect(url: &str) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(url.to_owned());
        if url.contains(":memory:") {
            options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(3600));
        }
        options.sqlx_logging(false);

        let db = Database::connect(options).await?;
        Self::new(db).await
    }

    /// Wrap an existing connection, creating the `documents` table if needed.
    ///
    /// # Errors
    /// Returns the schema error.
    pub async fn new(db: DatabaseConnection) -> Result<Self, DbErr> {
        let backend = db.get_database_backend();
        let mut statement = Schema::new(backend).create_table_from_entity(Entity);
        statement.if_not_exists();
        db.execute(backend.build(&statement)).await?;
        tracing::debug!(?backend, "Document table ready");
        Ok(Self { db })
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn model(&self, collection: &str, id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Collection.eq(collection))
            .filter(Column::DocId.eq(id))
            .one(&self.db)
            .await
    }
}

fn decode(model: &Model) -> Result<Document, DbErr> {
    serde_json::from_str(&model.body).map_err(|e| DbErr::Json(e.to_string()))
}

fn encode(document: &Document) -> Result<String, DbErr> {
    serde_json::to_string(document).map_err(|e| DbErr::Json(e.to_string()))
}

fn json_path(field: &str) -> String {
    format!("$.{field}")
}

/// Largest offset or limit SQLite accepts.
const MAX_WINDOW: u64 = i64::MAX.unsigned_abs();

/// Type rank of the value at `path`: missing and null, then numbers and
/// booleans, then text, then arrays and objects.
fn sort_rank(path: &str) -> SimpleExpr {
    Expr::cust_with_values(
        "(CASE coalesce(json_type(documents.body, ?), 'null') \
         WHEN 'null' THEN 0 WHEN 'text' THEN 2 WHEN 'array' THEN 3 WHEN 'object' THEN 3 ELSE 1 END)",
        [path.to_string()],
    )
}

fn never() -> SimpleExpr {
    Expr::cust("1 = 0")
}

/// The field is missing or JSON `null`.
fn is_null(path: &str) -> SimpleExpr {
    Expr::cust_with_values(
        "(coalesce(json_type(documents.body, ?), 'null') = 'null')",
        [SqlValue::from(path.to_string())],
    )
}

/// Some scalar at `path` (or some element, when it is an array) compares
/// `op` against `literal`, with both sides of the same JSON type.
fn scalar_match(path: &str, op: &str, literal: &Value) -> Result<SimpleExpr, DbErr> {
    let mut values = vec![SqlValue::from(path.to_string()), SqlValue::from(path.to_string())];
    let element = match literal {
        Value::Null => return Ok(if op == "=" { is_null(path) } else { never() }),
        Value::Bool(flag) if op == "=" => format!("json_each.type = '{flag}'"),
        Value::Bool(flag) => {
            values.push(SqlValue::from(i64::from(*flag)));
            format!("json_each.type IN ('true', 'false') AND json_each.value {op} ?")
        }
        Value::Number(number) => {
            values.push(match number.as_i64() {
                Some(int) => SqlValue::from(int),
                None => SqlValue::from(number.as_f64().unwrap_or_default()),
            });
            format!("json_each.type IN ('integer', 'real') AND json_each.value {op} ?")
        }
        Value::String(text) => {
            values.push(SqlValue::from(text.clone()));
            format!("json_each.type = 'text' AND json_each.value {op} ?")
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(DbErr::Custom(format!("can not compare `{path}` against a structured value")));
        }
    };

    Ok(Expr::cust_with_values(
        format!(
            "(coalesce(json_type(documents.body, ?), 'null') <> 'object' \
             AND EXISTS (SELECT 1 FROM json_each(documents.body, ?) WHERE {element}))"
        ),
        values,
    ))
}

/// Some scalar at `path` equals one of `list`. The list is bound once as a
/// JSON array, so its length does not count against the bound-variable limit.
fn list_match(path: &str, list: &[Value]) -> Result<SimpleExpr, DbErr> {
    if list.iter().any(|literal| literal.is_array() || literal.is_object()) {
        return Err(DbErr::Custom(format!("can not compare `{path}` against a structured value")));
    }
    let wanted = serde_json::to_string(list).map_err(|e| DbErr::Json(e.to_string()))?;
    Ok(Expr::cust_with_values(
        "(coalesce(json_type(documents.body, ?), 'null') <> 'object' \
         AND EXISTS (SELECT 1 FROM json_each(documents.body, ?) AS item, json_each(?) AS wanted \
         WHERE item.type <> 'null' \
         AND (item.type = wanted.type \
              OR (item.type IN ('integer', 'real') AND wanted.type IN ('integer', 'real'))) \
         AND item.value = wanted.value))",
        [
            SqlValue::from(path.to_string()),
            SqlValue::from(path.to_string()),
            SqlValue::from(wanted),
        ],
    ))
}

fn comparison_condition(path: &str, comparison: &Comparison) -> Result<Condition, DbErr> {
    let op = match comparison.op {
        Operator::Gt => ">",
        Operator::Gte => ">=",
        Operator::Lt => "<",
        Operator::Lte => "<=",
        Operator::In => {
            let list = comparison.value.as_array().map(Vec::as_slice).unwrap_or_default();
            if list.is_empty() {
                return Ok(Condition::all().add(never()));
            }
            let mut any = Condition::any().add(list_match(path, list)?);
            if list.iter().any(Value::is_null) {
                any = any.add(is_null(path));
            }
            return Ok(any);
        }
    };
    Ok(Condition::all().add(scalar_match(path, op, &comparison.value)?))
}

/// Compile a filter into a sea-orm condition over `documents.body`.
fn filter_condition(filter: &Filter) -> Result<Condition, DbErr> {
    let mut condition = Condition::all();
    for field_filter in filter.fields() {
        let path = json_path(&field_filter.field);
        match &field_filter.predicate {
            Predicate::Equals(literal) => {
                condition = condition.add(scalar_match(&path, "=", literal)?);
            }
            Predicate::Compare(comparisons) => {
                for comparison in comparisons {
                    condition = condition.add(comparison_condition(&path, comparison)?);
                }
            }
        }
    }
    Ok(condition)
}

#[async_trait]
impl DocumentStore for SqlStore {
    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, DbErr> {
        let mut select = Entity::find()
            .filter(Column::Collection.eq(collection))
            .filter(filter_condition(&query.filter)?);

        // SQLite binds windows as i64; past that nothing can be skipped to.
        if query.skip > MAX_WINDOW {
            return Ok(Vec::new());
        }

        for key in &query.sort {
            let path = json_path(&key.field);
            select = select
                .order_by(sort_rank(&path), key.direction.clone())
                .order_by(
                    Expr::cust_with_values("json_extract(documents.body, ?)", [path]),
                    key.direction.clone(),
                );
        }
        select = select.order_by_asc(Column::Seq);

        if query.skip > 0 {
            select = select.offset(query.skip);
        }
        if let Some(limit) = query.limit {
            select = select.limit(limit.min(MAX_WINDOW));
        }

        let models = select.all(&self.db).await?;
        tracing::debug!(collection, rows = models.len(), "Fetched documents");
        models
            .iter()
            .map(|model| decode(model).map(|document| query.projection.apply(document)))
            .collect()
    }

    async fn count_documents(&self, collection: &str) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::Collection.eq(collection))
            .count(&self.db)
            .await
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, DbErr> {
        self.model(collection, id).await?.as_ref().map(decode).transpose()
    }

    async fn insert(&self, collection: &str, mut document: Document) -> Result<Document, DbErr> {
        let id = match document_id(&document) {
            Some(id) => id.to_string(),
            None => {
                let id = new_id();
                document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        let active = ActiveModel {
            seq: NotSet,
            collection: Set(collection.to_string()),
            doc_id: Set(id),
            body: Set(encode(&document)?),
        };
        active.insert(&self.db).await?;
        Ok(document)
    }

    async fn update(&self, collection: &str, id: &str, changes: Document) -> Result<Option<Document>, DbErr> {
        let Some(model) = self.model(collection, id).await? else {
            return Ok(None);
        };
        let mut document = decode(&model)?;
        merge_changes(&mut document, changes);

        let mut active = model.into_active_model();
        active.body = Set(encode(&document)?);
        active.update(&self.db).await?;
        Ok(Some(document))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DbErr> {
        let result = Entity::delete_many()
            .filter(Column::Collection.eq(collection))
            .filter(Column::DocId.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DbErr> {
        let result = Entity::delete_many()
            .filter(Column::Collection.eq(collection))
            .filter(filter_condition(filter)?)
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
