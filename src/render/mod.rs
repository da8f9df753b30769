//! SVG map of settlement mentions.
//!
//! Mentioned settlements are drawn as magenta markers scaled by how many
//! questions mention them; the rest are small yellow dots. Coordinates are
//! projected with spherical (web) Mercator onto a fixed geographic extent.

use std::collections::HashSet;
use std::f64::consts::FRAC_PI_4;

use askama::Template;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{LocationId, LocationMatches, LocationRecord};
use crate::services::aggregate::max_document_count;
use crate::services::gazetteer::GazetteerIndex;

/// Errors from map rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("Invalid map extent: {0}")]
    InvalidExtent(String),
}

const MENTIONED_FILL: &str = "#bf00bf";
const UNMENTIONED_FILL: &str = "#bfbf00";

/// Geographic bounding box, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapExtent {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Default for MapExtent {
    /// Cyprus.
    fn default() -> Self {
        Self {
            min_lon: 32.0,
            max_lon: 35.0,
            min_lat: 34.5,
            max_lat: 35.75,
        }
    }
}

impl MapExtent {
    fn validate(&self) -> Result<(), RenderError> {
        let ordered = self.min_lon < self.max_lon && self.min_lat < self.max_lat;
        let in_range = self.min_lat > -85.0 && self.max_lat < 85.0;
        if ordered && in_range {
            Ok(())
        } else {
            Err(RenderError::InvalidExtent(format!("{:?}", self)))
        }
    }

    fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
    }
}

fn mercator_y(lat: f64) -> f64 {
    (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln()
}

/// Marker radius for a settlement mentioned in `count` questions.
pub fn marker_radius(count: usize, max_count: usize) -> f64 {
    if max_count == 0 {
        return 3.0;
    }
    3.0 + (count as f64 * 7.0) / max_count as f64
}

struct Marker {
    x: String,
    y: String,
    radius: String,
    fill: &'static str,
    label: String,
}

#[derive(Template)]
#[template(path = "map.svg")]
struct MapTemplate<'a> {
    width: String,
    height: String,
    plot_top: String,
    plot_height: String,
    title: &'a str,
    subtitle: String,
    legend: &'a str,
    markers: Vec<Marker>,
}

/// Renders an aggregation result onto the configured extent.
#[derive(Debug, Clone)]
pub struct MapRenderer {
    extent: MapExtent,
    width: f64,
}

impl MapRenderer {
    const HEADER_HEIGHT: f64 = 70.0;

    pub fn new(extent: MapExtent, width: f64) -> Self {
        Self { extent, width }
    }

    /// Plot area height keeping Mercator proportions.
    fn plot_height(&self) -> f64 {
        let lon_span = (self.extent.max_lon - self.extent.min_lon).to_radians();
        let y_span = mercator_y(self.extent.max_lat) - mercator_y(self.extent.min_lat);
        self.width * y_span / lon_span
    }

    fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = (lon - self.extent.min_lon) / (self.extent.max_lon - self.extent.min_lon)
            * self.width;
        let top = mercator_y(self.extent.max_lat);
        let bottom = mercator_y(self.extent.min_lat);
        let y = (top - mercator_y(lat)) / (top - bottom) * self.plot_height();
        (x, y + Self::HEADER_HEIGHT)
    }

    fn marker(&self, record: &LocationRecord, radius: f64, fill: &'static str, label: String) -> Option<Marker> {
        if !self.extent.contains(record.longitude, record.latitude) {
            tracing::debug!("Location {} lies outside the map extent", record.id);
            return None;
        }
        let (x, y) = self.project(record.longitude, record.latitude);
        Some(Marker {
            x: format!("{:.2}", x),
            y: format!("{:.2}", y),
            radius: format!("{:.2}", radius),
            fill,
            label,
        })
    }

    /// Render `matches` for `query`.
    ///
    /// `max_overall` is the largest document count over the unfiltered
    /// corpus, so marker sizes stay comparable between queries.
    pub fn render(
        &self,
        index: &GazetteerIndex,
        matches: &[LocationMatches],
        max_overall: usize,
        query: &str,
    ) -> Result<String, RenderError> {
        self.extent.validate()?;

        let mut markers = Vec::with_capacity(index.len());
        let mut mentioned: HashSet<LocationId> = HashSet::with_capacity(matches.len());

        for group in matches {
            let Some(record) = index.location(group.location_id) else {
                tracing::warn!("No gazetteer entry for matched location {}", group.location_id);
                continue;
            };
            mentioned.insert(record.id);
            let label = format!("{} ({})", record.name, group.count());
            let radius = marker_radius(group.count(), max_overall);
            markers.extend(self.marker(record, radius, MENTIONED_FILL, label));
        }

        for record in index.records().iter().filter(|l| !mentioned.contains(&l.id)) {
            markers.extend(self.marker(record, 1.0, UNMENTIONED_FILL, record.name.clone()));
        }

        let title = format!("Settlements in MP questions with query {}", query);
        let subtitle = format!(
            "Marker size represents the number of questions (max: {}; max shown: {}).",
            max_overall,
            max_document_count(matches)
        );
        let template = MapTemplate {
            width: format!("{:.0}", self.width),
            height: format!("{:.0}", self.plot_height() + Self::HEADER_HEIGHT),
            plot_top: format!("{:.0}", Self::HEADER_HEIGHT),
            plot_height: format!("{:.0}", self.plot_height()),
            title: &title,
            subtitle,
            legend: "Settlements that have received no mentions are coloured in yellow.",
            markers,
        };
        Ok(template.render()?)
    }
}
