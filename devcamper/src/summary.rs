//! Bootcamp summary values recomputed from courses and reviews.

use serde_json::Value;

use crate::errors::ApiError;
use crate::filtering::Filter;
use crate::models::{BOOTCAMP_FIELD, BOOTCAMPS, COURSES, REVIEWS};
use crate::store::{Document, DocumentStore, FindQuery};

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = values.len() as f64;
    Some(values.iter().sum::<f64>() / count)
}

/// Mean rounded up to the next multiple of ten.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn average_cost(tuitions: &[f64]) -> Option<i64> {
    mean(tuitions).map(|avg| ((avg / 10.0).ceil() * 10.0) as i64)
}

#[must_use]
pub fn average_rating(ratings: &[f64]) -> Option<f64> {
    mean(ratings)
}

async fn numeric_field(store: &dyn DocumentStore, collection: &str, bootcamp_id: &str, field: &str) -> Result<Vec<f64>, ApiError> {
    let documents = store
        .find(collection, &FindQuery::new(Filter::all().eq(BOOTCAMP_FIELD, bootcamp_id)))
        .await?;
    Ok(documents
        .iter()
        .filter_map(|doc| doc.get(field).and_then(Value::as_f64))
        .collect())
}

async fn store_summary(store: &dyn DocumentStore, bootcamp_id: &str, field: &str, value: Value) -> Result<(), ApiError> {
    let mut changes = Document::new();
    changes.insert(field.to_string(), value);
    // The bootcamp may be mid-deletion; a missing document is not an error here.
    store.update(BOOTCAMPS, bootcamp_id, changes).await?;
    Ok(())
}

/// Recompute `averageCost` of a bootcamp; removed when it has no courses.
///
/// # Errors
/// Propagates storage errors.
pub async fn refresh_average_cost(store: &dyn DocumentStore, bootcamp_id: &str) -> Result<(), ApiError> {
    let tuitions = numeric_field(store, COURSES, bootcamp_id, "tuition").await?;
    let value = average_cost(&tuitions).map_or(Value::Null, Value::from);
    tracing::debug!(bootcamp = bootcamp_id, average_cost = %value, "Refreshed average cost");
    store_summary(store, bootcamp_id, "averageCost", value).await
}

/// Recompute `averageRating` of a bootcamp; removed when it has no reviews.
///
/// # Errors
/// Propagates storage errors.
pub async fn refresh_average_rating(store: &dyn DocumentStore, bootcamp_id: &str) -> Result<(), ApiError> {
    let ratings = numeric_field(store, REVIEWS, bootcamp_id, "rating").await?;
    let value = average_rating(&ratings).map_or(Value::Null, Value::from);
    tracing::debug!(bootcamp = bootcamp_id, average_rating = %value, "Refreshed average rating");
    store_summary(store, bootcamp_id, "averageRating", value).await
}
