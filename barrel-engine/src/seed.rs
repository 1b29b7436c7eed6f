//! First-run seed data
//!
//! Used only in local-only mode when the mirror comes up empty: a small,
//! coherent data set so the store is usable out of the box. Remote mode
//! never seeds; the remote service is the source of truth there.

use shared::models::{
    Barrel, BarrelStatus, BeerType, BreweryEvent, ChecklistItem, Ingredient, Location,
    Notification, Recipe, RecipeStep, Severity,
};
use shared::util;

use crate::cache::Collections;

pub fn initial_collections() -> Collections {
    let mut data = Collections::default();

    data.locations = vec![
        Location {
            id: "loc-1".into(),
            name: "Bodega Principal".into(),
            address: "Calle Falsa 123".into(),
            lat: "-33.4489".into(),
            lng: "-70.6693".into(),
            barrel_count: None,
        },
        Location {
            id: "loc-2".into(),
            name: "Depósito Sur".into(),
            address: "Av. Siempre Viva 742".into(),
            lat: "-33.4569".into(),
            lng: "-70.6483".into(),
            barrel_count: None,
        },
        Location {
            id: "loc-3".into(),
            name: "Bar Centro".into(),
            address: "Plaza Italia s/n".into(),
            lat: "-33.4372".into(),
            lng: "-70.6341".into(),
            barrel_count: None,
        },
    ];

    data.barrels = vec![
        Barrel {
            id: "b-1".into(),
            code: "BRL-001".into(),
            capacity: 50.0,
            beer_type: BeerType::GoldenAle,
            status: BarrelStatus::CleanInWarehouse,
            last_location_id: Some("loc-1".into()),
            last_location_name: Some("Bodega Principal".into()),
            last_update: util::now_iso(),
            created_at: util::now_iso(),
        },
        Barrel {
            id: "b-2".into(),
            code: "BRL-002".into(),
            capacity: 50.0,
            beer_type: BeerType::Stout,
            status: BarrelStatus::Filled,
            last_location_id: Some("loc-1".into()),
            last_location_name: Some("Bodega Principal".into()),
            last_update: util::now_iso(),
            created_at: util::now_iso(),
        },
        Barrel {
            id: "b-3".into(),
            code: "BRL-003".into(),
            capacity: 30.0,
            beer_type: BeerType::Calafate,
            status: BarrelStatus::InTransit,
            last_location_id: Some("loc-3".into()),
            last_location_name: Some("Bar Centro".into()),
            last_update: util::now_iso(),
            created_at: util::now_iso(),
        },
    ];

    data.recipes = vec![Recipe {
        id: "r-1".into(),
        name: "Golden Ale Clásica".into(),
        description: "Refrescante y ligera con notas cítricas.".into(),
        ingredients: vec![
            Ingredient {
                name: "Malta Pale".into(),
                quantity: "5".into(),
                unit: "kg".into(),
            },
            Ingredient {
                name: "Lúpulo Cascade".into(),
                quantity: "30".into(),
                unit: "g".into(),
            },
        ],
        steps: vec![
            RecipeStep {
                title: "Maceración".into(),
                description: "Infusión simple a 68°C durante 60 minutos para extracción de azúcares.".into(),
            },
            RecipeStep {
                title: "Hervor".into(),
                description: "Hervido vigoroso de 60 min con adiciones de lúpulo según cronograma.".into(),
            },
            RecipeStep {
                title: "Fermentación".into(),
                description: "Mantener a 19°C constantes durante 7 días.".into(),
            },
        ],
    }];

    data.events = vec![BreweryEvent {
        id: "e-1".into(),
        name: "Festival Cerveza Invierno".into(),
        date: "2024-07-15".into(),
        notes: "Evento principal en plaza central".into(),
        barrel_ids: vec!["b-1".into(), "b-3".into()],
        checklist: vec![
            ChecklistItem {
                id: "c1".into(),
                name: "Hielo".into(),
                checked: true,
            },
            ChecklistItem {
                id: "c2".into(),
                name: "Vasos".into(),
                checked: false,
            },
        ],
    }];

    data.notifications = vec![Notification::new(
        "Bienvenido",
        "BarrelTrack está listo para operar.",
        Severity::Success,
    )];

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_internally_consistent() {
        let data = initial_collections();
        assert!(!data.is_empty());
        // Every barrel location and event barrel reference resolves
        for barrel in &data.barrels {
            let id = barrel.last_location_id.as_deref().unwrap();
            assert!(data.locations.iter().any(|l| l.id == id));
        }
        for event in &data.events {
            for id in &event.barrel_ids {
                assert!(data.barrels.iter().any(|b| b.id == *id));
            }
        }
    }
}
