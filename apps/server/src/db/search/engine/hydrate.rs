//! Batch loading of a page's child collections.
//!
//! One query per collection, keyed by the page's property ids, then grouped
//! in memory. A property with no children gets empty vectors.

use super::SearchEngine;
use crate::metrics::QueryTimer;
use crate::models::{Property, PropertyFeature, PropertyImage, PropertyStation};
use crate::Result;
use sqlx::PgConnection;
use std::collections::HashMap;

const STATIONS_SQL: &str = "SELECT ps.property_id, s.id, s.name, rl.name AS railway_line_name, \
     ps.walking_minutes, ps.display_order \
     FROM property_stations ps \
     JOIN stations s ON ps.station_id = s.id \
     JOIN railway_lines rl ON s.railway_line_id = rl.id \
     WHERE ps.property_id = ANY($1) \
     ORDER BY ps.property_id, ps.display_order";

const IMAGES_SQL: &str = "SELECT property_id, id, image_url, display_order \
     FROM property_images \
     WHERE property_id = ANY($1) \
     ORDER BY property_id, display_order";

const FEATURES_SQL: &str = "SELECT ppf.property_id, pf.id, pf.name \
     FROM property_property_features ppf \
     JOIN property_features pf ON ppf.feature_id = pf.id \
     WHERE ppf.property_id = ANY($1) \
     ORDER BY ppf.property_id, pf.name";

#[derive(Debug, sqlx::FromRow)]
struct StationRow {
    property_id: i32,
    id: i32,
    name: String,
    railway_line_name: String,
    walking_minutes: i32,
    display_order: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    property_id: i32,
    id: i32,
    image_url: String,
    display_order: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct FeatureRow {
    property_id: i32,
    id: i32,
    name: String,
}

impl SearchEngine {
    /// Attach stations, images and features to every property in place.
    pub(super) async fn hydrate(
        &self,
        conn: &mut PgConnection,
        properties: &mut [Property],
    ) -> Result<()> {
        if properties.is_empty() {
            return Ok(());
        }
        let ids: Vec<i32> = properties.iter().map(|p| p.id).collect();

        let timer = QueryTimer::start("stations");
        let result = sqlx::query_as::<_, StationRow>(STATIONS_SQL)
            .bind(&ids)
            .fetch_all(&mut *conn)
            .await;
        timer.finish(&result);
        let stations = result.map_err(crate::Error::Database)?;

        let timer = QueryTimer::start("images");
        let result = sqlx::query_as::<_, ImageRow>(IMAGES_SQL)
            .bind(&ids)
            .fetch_all(&mut *conn)
            .await;
        timer.finish(&result);
        let images = result.map_err(crate::Error::Database)?;

        let timer = QueryTimer::start("features");
        let result = sqlx::query_as::<_, FeatureRow>(FEATURES_SQL)
            .bind(&ids)
            .fetch_all(&mut *conn)
            .await;
        timer.finish(&result);
        let features = result.map_err(crate::Error::Database)?;

        tracing::debug!(
            properties = properties.len(),
            stations = stations.len(),
            images = images.len(),
            features = features.len(),
            "Hydrated search page"
        );

        attach(properties, stations, images, features);
        Ok(())
    }
}

fn group_by_property<R, T>(
    rows: Vec<R>,
    split: impl Fn(R) -> (i32, T),
) -> HashMap<i32, Vec<T>> {
    let mut grouped: HashMap<i32, Vec<T>> = HashMap::new();
    for row in rows {
        let (property_id, item) = split(row);
        grouped.entry(property_id).or_default().push(item);
    }
    grouped
}

/// Rows arrive sorted per property, so grouping preserves display order.
fn attach(
    properties: &mut [Property],
    stations: Vec<StationRow>,
    images: Vec<ImageRow>,
    features: Vec<FeatureRow>,
) {
    let mut stations = group_by_property(stations, |r| {
        (
            r.property_id,
            PropertyStation {
                id: r.id,
                name: r.name,
                railway_line_name: r.railway_line_name,
                walking_minutes: r.walking_minutes,
                display_order: r.display_order,
            },
        )
    });
    let mut images = group_by_property(images, |r| {
        (
            r.property_id,
            PropertyImage {
                id: r.id,
                image_url: r.image_url,
                display_order: r.display_order,
            },
        )
    });
    let mut features = group_by_property(features, |r| {
        (
            r.property_id,
            PropertyFeature {
                id: r.id,
                name: r.name,
            },
        )
    });

    for property in properties.iter_mut() {
        property.stations = stations.remove(&property.id).unwrap_or_default();
        property.images = images.remove(&property.id).unwrap_or_default();
        property.features = features.remove(&property.id).unwrap_or_default();
    }
}
