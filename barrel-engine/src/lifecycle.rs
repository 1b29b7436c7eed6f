//! Barrel Lifecycle State Machine + Batch Volume Ledger
//!
//! Pure transition logic over the in-memory collections. The store applies
//! these mutations under the cache lock and then commits the outcome through
//! whichever backend the remote gate selected, so the side-effect order is
//! identical in remote and local mode:
//!
//! 1. batch ledger debit (clamped at zero; zero finishes the batch)
//! 2. barrel field updates (status, beer type, location, last_update)
//! 3. one append-only activity record
//! 4. a notification when the status actually changed
//!
//! No transition out of `Retired` is guarded against; retirement is a
//! convention, not a terminal state.

use shared::models::{
    Activity, Barrel, BarrelCreate, BarrelStatus, Batch, BreweryEvent, Notification, Severity,
    StatusChange,
};
use shared::util;

use crate::cache::Collections;
use crate::error::StoreError;

/// Everything a single status transition produced, for the backend to
/// persist. Collections in the cache are already mutated when this is
/// returned.
#[derive(Debug)]
pub struct TransitionOutcome {
    pub barrel: Barrel,
    /// Updated batch row when the transition debited the ledger.
    pub debited_batch: Option<Batch>,
    pub activity: Activity,
    pub notification: Option<Notification>,
    /// Events whose barrel list changed (detach and/or re-attach).
    pub touched_events: Vec<BreweryEvent>,
}

/// Outcome of registering a new barrel.
#[derive(Debug)]
pub struct RegistrationOutcome {
    pub barrel: Barrel,
    pub activity: Activity,
    pub notification: Notification,
}

/// Append a notification, trimming the oldest beyond the cap.
///
/// Storage order is newest-first, so the trim drops the oldest entries.
pub(crate) fn push_notification(data: &mut Collections, notification: Notification) {
    data.notifications.insert(0, notification);
    data.notifications.truncate(Notification::CAP);
}

/// Validate and apply a status transition.
///
/// Precondition failures (unknown barrel, fill without a usable batch) are
/// rejected before any mutation. `change.new_status == None` keeps the
/// current status but still applies the contextual field updates and
/// appends an activity.
pub fn apply_status_change(
    data: &mut Collections,
    barrel_id: &str,
    change: &StatusChange,
    user_name: &str,
) -> Result<TransitionOutcome, StoreError> {
    let barrel_idx = data
        .barrels
        .iter()
        .position(|b| b.id == barrel_id)
        .ok_or(StoreError::NotFound("Barrel"))?;

    let previous_status = data.barrels[barrel_idx].status;
    let final_status = change.new_status.unwrap_or(previous_status);
    let capacity = data.barrels[barrel_idx].capacity;

    // Fill precondition: checked before any mutation
    let filling = change.new_status == Some(BarrelStatus::Filled);
    let batch_idx = if filling {
        let id = change.batch_id.as_deref().ok_or_else(|| {
            StoreError::Precondition("Se requiere un lote para llenar el barril.".into())
        })?;
        let idx = data
            .batches
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| {
                StoreError::Precondition("El lote seleccionado no existe.".into())
            })?;
        if !data.batches[idx].can_fill(capacity) {
            return Err(StoreError::Precondition(
                "El lote no tiene litros suficientes o ya está terminado.".into(),
            ));
        }
        Some(idx)
    } else {
        None
    };

    // (1) Ledger debit
    let debited_batch = batch_idx.map(|idx| {
        data.batches[idx].debit(capacity);
        data.batches[idx].clone()
    });

    // (2) Barrel + event membership updates.
    // A barrel belongs to at most one event through this path: detach from
    // every event first, then re-attach when entering AtEvent.
    let mut touched = Vec::new();
    for (idx, event) in data.events.iter_mut().enumerate() {
        let before = event.barrel_ids.len();
        event.barrel_ids.retain(|id| id != barrel_id);
        if event.barrel_ids.len() != before {
            touched.push(idx);
        }
    }

    // Context ids are resolved against the in-memory collections; an id
    // that resolves to nothing contributes no reference. Coercion of
    // malformed ids to null happens at the wire boundary, not here.
    let mut event_name = None;
    if final_status == BarrelStatus::AtEvent
        && let Some(id) = change.event_id.as_deref()
        && let Some(idx) = data.events.iter().position(|e| e.id == id)
    {
        event_name = Some(data.events[idx].name.clone());
        if !data.events[idx].barrel_ids.iter().any(|b| b == barrel_id) {
            data.events[idx].barrel_ids.push(barrel_id.to_string());
            if !touched.contains(&idx) {
                touched.push(idx);
            }
        }
    }

    let resolved_location = change
        .location_id
        .as_deref()
        .and_then(|id| data.locations.iter().find(|l| l.id == id))
        .map(|l| (l.id.clone(), l.name.clone()));

    let barrel = &mut data.barrels[barrel_idx];
    barrel.status = final_status;
    barrel.last_update = util::now_iso();
    if let Some(beer_type) = change.beer_type {
        barrel.beer_type = beer_type;
    }
    if let Some((id, name)) = resolved_location {
        barrel.last_location_id = Some(id);
        barrel.last_location_name = Some(name);
    }
    let barrel = barrel.clone();

    // (3) Audit append, capturing the fields as they exist after (1)-(2)
    let activity = Activity {
        id: util::entity_id(),
        barrel_id: barrel.id.clone(),
        barrel_code: barrel.code.clone(),
        user_name: user_name.to_string(),
        previous_status: Some(previous_status),
        new_status: final_status,
        location_id: barrel.last_location_id.clone(),
        location_name: barrel.last_location_name.clone(),
        beer_type: Some(barrel.beer_type),
        batch_id: change.batch_id.clone(),
        event_name,
        notes: change.notes.clone(),
        created_at: util::now_iso(),
    };
    data.activities.push(activity.clone());

    // (4) Notification only on an actual status change
    let notification = (previous_status != final_status).then(|| {
        let severity = if final_status == BarrelStatus::DirtyInWarehouse {
            Severity::Warning
        } else {
            Severity::Info
        };
        let notification = Notification::new(
            format!("Cambio de Estado: {}", barrel.code),
            format!(
                "Barril {} ahora está en estado {}.",
                barrel.code,
                final_status.label()
            ),
            severity,
        );
        push_notification(data, notification.clone());
        notification
    });

    let touched_events = touched
        .into_iter()
        .map(|idx| data.events[idx].clone())
        .collect();

    Ok(TransitionOutcome {
        barrel,
        debited_batch,
        activity,
        notification,
        touched_events,
    })
}

/// Register a new barrel with defaults, its creation activity
/// (`previous_status: None`) and a success notification.
pub fn register_barrel(
    data: &mut Collections,
    payload: BarrelCreate,
    user_name: &str,
) -> RegistrationOutcome {
    let code = payload
        .code
        .unwrap_or_else(|| format!("BRL-{:03}", data.barrels.len() + 1));

    let location = payload
        .location_id
        .as_deref()
        .and_then(|id| data.locations.iter().find(|l| l.id == id))
        .or_else(|| data.locations.first())
        .map(|l| (l.id.clone(), l.name.clone()));

    let barrel = Barrel {
        id: util::entity_id(),
        code: code.clone(),
        capacity: payload.capacity.unwrap_or(50.0),
        beer_type: payload.beer_type.unwrap_or_default(),
        status: payload.status.unwrap_or_default(),
        last_location_id: location.as_ref().map(|(id, _)| id.clone()),
        last_location_name: location.map(|(_, name)| name),
        last_update: util::now_iso(),
        created_at: util::now_iso(),
    };
    data.barrels.push(barrel.clone());

    let activity = Activity {
        id: util::entity_id(),
        barrel_id: barrel.id.clone(),
        barrel_code: barrel.code.clone(),
        user_name: user_name.to_string(),
        previous_status: None,
        new_status: barrel.status,
        location_id: barrel.last_location_id.clone(),
        location_name: barrel.last_location_name.clone(),
        beer_type: Some(barrel.beer_type),
        batch_id: None,
        event_name: None,
        notes: None,
        created_at: util::now_iso(),
    };
    data.activities.push(activity.clone());

    let notification = Notification::new(
        "Nuevo Activo",
        format!("El barril {code} ha sido registrado exitosamente."),
        Severity::Success,
    );
    push_notification(data, notification.clone());

    RegistrationOutcome {
        barrel,
        activity,
        notification,
    }
}
