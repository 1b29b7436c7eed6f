//! Wire Mapper
//!
//! Translates between the remote service's schema and the domain model, in
//! both directions. Purely structural: field renaming and shape coercion,
//! no validation. Absent or malformed fields become defaults and rows that
//! fail to parse are skipped with a log line — fetches never error here.
//!
//! No other module sees wire column names.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{
    Activity, Barrel, BarrelStatus, Batch, BatchStatus, BeerType, BreweryEvent, ChecklistItem,
    Comment, Ingredient, Location, Notification, Recipe, RecipeStep, Severity,
};

/// Coerce a foreign-key value: anything that does not look like a
/// well-formed reference (empty or too short) becomes "no reference" so it
/// is never sent to the remote service.
pub fn valid_ref(value: Option<&str>) -> Option<String> {
    value.filter(|v| v.len() >= 4).map(str::to_string)
}

fn parse_rows<T: serde::de::DeserializeOwned>(collection: &str, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(collection, error = %e, "Skipping malformed remote row");
                None
            }
        })
        .collect()
}

// ============================================================================
// Barrels
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct BarrelRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    capacity: Option<f64>,
    #[serde(default)]
    beer_type: Option<BeerType>,
    #[serde(default)]
    status: Option<BarrelStatus>,
    #[serde(default)]
    last_location_id: Option<String>,
    #[serde(default)]
    last_location_name: Option<String>,
    #[serde(default)]
    last_update: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

pub fn barrels_to_domain(rows: Vec<Value>) -> Vec<Barrel> {
    parse_rows::<BarrelRow>("barrels", rows)
        .into_iter()
        .map(|row| Barrel {
            id: row.id.unwrap_or_default(),
            code: row.code.unwrap_or_default(),
            capacity: row.capacity.unwrap_or_default(),
            beer_type: row.beer_type.unwrap_or_default(),
            status: row.status.unwrap_or_default(),
            last_location_id: row.last_location_id,
            last_location_name: row.last_location_name,
            last_update: row.last_update.unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
        })
        .collect()
}

pub fn barrel_to_wire(barrel: &Barrel) -> Value {
    serde_json::json!({
        "id": barrel.id,
        "code": barrel.code,
        "capacity": barrel.capacity,
        "beer_type": barrel.beer_type,
        "status": barrel.status,
        "last_location_id": valid_ref(barrel.last_location_id.as_deref()),
        "last_location_name": barrel.last_location_name,
        "last_update": barrel.last_update,
        "created_at": barrel.created_at,
    })
}

// ============================================================================
// Locations
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct LocationRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lng: Option<String>,
}

pub fn locations_to_domain(rows: Vec<Value>) -> Vec<Location> {
    parse_rows::<LocationRow>("locations", rows)
        .into_iter()
        .map(|row| Location {
            id: row.id.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            address: row.address.unwrap_or_default(),
            lat: row.lat.unwrap_or_default(),
            lng: row.lng.unwrap_or_default(),
            // Derived at read time, never stored
            barrel_count: None,
        })
        .collect()
}

pub fn location_to_wire(location: &Location) -> Value {
    serde_json::json!({
        "id": location.id,
        "name": location.name,
        "address": location.address,
        "lat": location.lat,
        "lng": location.lng,
    })
}

// ============================================================================
// Batches
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct BatchRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    fermenter_name: Option<String>,
    #[serde(default)]
    beer_type: Option<BeerType>,
    #[serde(default)]
    total_liters: Option<f64>,
    #[serde(default)]
    remaining_liters: Option<f64>,
    #[serde(default)]
    filling_date: Option<String>,
    #[serde(default)]
    status: Option<BatchStatus>,
    #[serde(default)]
    created_at: Option<String>,
}

pub fn batches_to_domain(rows: Vec<Value>) -> Vec<Batch> {
    parse_rows::<BatchRow>("batches", rows)
        .into_iter()
        .map(|row| Batch {
            id: row.id.unwrap_or_default(),
            fermenter_name: row.fermenter_name.unwrap_or_default(),
            beer_type: row.beer_type.unwrap_or_default(),
            total_liters: row.total_liters.unwrap_or_default(),
            remaining_liters: row.remaining_liters.unwrap_or_default(),
            filling_date: row.filling_date.unwrap_or_default(),
            status: row.status.unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
        })
        .collect()
}

pub fn batch_to_wire(batch: &Batch) -> Value {
    serde_json::json!({
        "id": batch.id,
        "fermenter_name": batch.fermenter_name,
        "beer_type": batch.beer_type,
        "total_liters": batch.total_liters,
        "remaining_liters": batch.remaining_liters,
        "filling_date": batch.filling_date,
        "status": batch.status,
        "created_at": batch.created_at,
    })
}

// ============================================================================
// Activities
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct ActivityRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    barrel_id: Option<String>,
    #[serde(default)]
    barrel_code: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    previous_status: Option<BarrelStatus>,
    #[serde(default)]
    new_status: Option<BarrelStatus>,
    #[serde(default)]
    location_id: Option<String>,
    #[serde(default)]
    location_name: Option<String>,
    #[serde(default)]
    beer_type: Option<BeerType>,
    #[serde(default)]
    batch_id: Option<String>,
    #[serde(default)]
    event_name: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

pub fn activities_to_domain(rows: Vec<Value>) -> Vec<Activity> {
    parse_rows::<ActivityRow>("activities", rows)
        .into_iter()
        .map(|row| Activity {
            id: row.id.unwrap_or_default(),
            barrel_id: row.barrel_id.unwrap_or_default(),
            barrel_code: row.barrel_code.unwrap_or_default(),
            user_name: row.user_name.unwrap_or_default(),
            previous_status: row.previous_status,
            new_status: row.new_status.unwrap_or_default(),
            location_id: row.location_id,
            location_name: row.location_name,
            beer_type: row.beer_type,
            batch_id: row.batch_id,
            event_name: row.event_name,
            notes: row.notes,
            created_at: row.created_at.unwrap_or_default(),
        })
        .collect()
}

pub fn activity_to_wire(activity: &Activity) -> Value {
    serde_json::json!({
        "id": activity.id,
        "barrel_id": activity.barrel_id,
        "barrel_code": activity.barrel_code,
        "user_name": activity.user_name,
        "previous_status": activity.previous_status,
        "new_status": activity.new_status,
        "location_id": valid_ref(activity.location_id.as_deref()),
        "location_name": activity.location_name,
        "beer_type": activity.beer_type,
        "batch_id": valid_ref(activity.batch_id.as_deref()),
        "event_name": activity.event_name,
        "notes": activity.notes,
        "created_at": activity.created_at,
    })
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct EventRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    barrel_ids: Vec<String>,
    #[serde(default)]
    checklist: Vec<ChecklistItem>,
}

pub fn events_to_domain(rows: Vec<Value>) -> Vec<BreweryEvent> {
    parse_rows::<EventRow>("events", rows)
        .into_iter()
        .map(|row| BreweryEvent {
            id: row.id.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            date: row.date.unwrap_or_default(),
            notes: row.notes.unwrap_or_default(),
            barrel_ids: row.barrel_ids,
            checklist: row.checklist,
        })
        .collect()
}

pub fn event_to_wire(event: &BreweryEvent) -> Value {
    serde_json::json!({
        "id": event.id,
        "name": event.name,
        "date": event.date,
        "notes": event.notes,
        "barrel_ids": event.barrel_ids,
        "checklist": event.checklist,
    })
}

// ============================================================================
// Recipes
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecipeRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    ingredients: Vec<Ingredient>,
    #[serde(default)]
    steps: Vec<RecipeStep>,
}

pub fn recipes_to_domain(rows: Vec<Value>) -> Vec<Recipe> {
    parse_rows::<RecipeRow>("recipes", rows)
        .into_iter()
        .map(|row| Recipe {
            id: row.id.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            ingredients: row.ingredients,
            steps: row.steps,
        })
        .collect()
}

pub fn recipe_to_wire(recipe: &Recipe) -> Value {
    serde_json::json!({
        "id": recipe.id,
        "name": recipe.name,
        "description": recipe.description,
        "ingredients": recipe.ingredients,
        "steps": recipe.steps,
    })
}

// ============================================================================
// Notifications
// ============================================================================

/// The remote column for severity is `type` (legacy schema).
#[derive(Debug, Default, Serialize, Deserialize)]
struct NotificationRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    severity: Option<Severity>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    read: Option<bool>,
}

pub fn notifications_to_domain(rows: Vec<Value>) -> Vec<Notification> {
    parse_rows::<NotificationRow>("notifications", rows)
        .into_iter()
        .map(|row| Notification {
            id: row.id.unwrap_or_default(),
            title: row.title.unwrap_or_default(),
            message: row.message.unwrap_or_default(),
            severity: row.severity.unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
            read: row.read.unwrap_or_default(),
        })
        .collect()
}

pub fn notification_to_wire(notification: &Notification) -> Value {
    serde_json::json!({
        "id": notification.id,
        "title": notification.title,
        "message": notification.message,
        "type": notification.severity,
        "created_at": notification.created_at,
        "read": notification.read,
    })
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct CommentRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    barrel_id: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

pub fn comments_to_domain(rows: Vec<Value>) -> Vec<Comment> {
    parse_rows::<CommentRow>("comments", rows)
        .into_iter()
        .map(|row| Comment {
            id: row.id.unwrap_or_default(),
            barrel_id: row.barrel_id.unwrap_or_default(),
            user_name: row.user_name.unwrap_or_default(),
            content: row.content.unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
        })
        .collect()
}

pub fn comment_to_wire(comment: &Comment) -> Value {
    serde_json::json!({
        "id": comment.id,
        "barrel_id": comment.barrel_id,
        "user_name": comment.user_name,
        "content": comment.content,
        "created_at": comment.created_at,
    })
}
