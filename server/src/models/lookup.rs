use campus_events_api_types::{Building, BuildingLabel, Category, LocationInfo};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct CategoryRow {
    pub category_id: i32,
    pub category_name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            category_id: row.category_id,
            category_name: row.category_name,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct LocationRow {
    pub building: String,
    pub label: String,
    pub capacity: Option<i32>,
}

impl From<LocationRow> for LocationInfo {
    fn from(row: LocationRow) -> Self {
        LocationInfo {
            building: row.building,
            label: row.label,
            capacity: row.capacity,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct BuildingRow {
    pub building: String,
    pub label_count: i64,
    pub max_capacity: Option<i32>,
    pub all_labels: Option<String>,
}

impl From<BuildingRow> for Building {
    fn from(row: BuildingRow) -> Self {
        Building {
            building: row.building,
            label_count: row.label_count,
            max_capacity: row.max_capacity,
            all_labels: row.all_labels,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct BuildingLabelRow {
    pub location_id: i32,
    pub label: String,
    pub capacity: Option<i32>,
}

impl From<BuildingLabelRow> for BuildingLabel {
    fn from(row: BuildingLabelRow) -> Self {
        BuildingLabel {
            location_id: row.location_id,
            label: row.label,
            capacity: row.capacity,
        }
    }
}
