//! selection.rs
//! Estado de la selección del formulario: salida, destino y vehículo.
//! Cada campo se fija por separado y en cualquier orden.

use crate::error::PlannerError;
use crate::types::{PlanRequest, Vehicle};

pub const SAME_CITY_ERROR: &str = "Les villes de départ et d'arrivée doivent être différentes";

#[derive(Clone, Debug, Default)]
pub struct Selection {
    departure: Option<String>,
    destination: Option<String>,
    vehicle: Option<Vehicle>,
}

impl Selection {
    pub fn departure(&self) -> Option<&str> { self.departure.as_deref() }
    pub fn destination(&self) -> Option<&str> { self.destination.as_deref() }
    pub fn vehicle(&self) -> Option<&Vehicle> { self.vehicle.as_ref() }

    /// Una clave vacía equivale a quitar la selección (placeholder del selector).
    pub fn set_departure(&mut self, key: Option<String>) {
        self.departure = key.filter(|k| !k.is_empty());
    }

    pub fn set_destination(&mut self, key: Option<String>) {
        self.destination = key.filter(|k| !k.is_empty());
    }

    /// Selección exclusiva: sustituye al vehículo anterior.
    pub fn set_vehicle(&mut self, vehicle: Option<Vehicle>) {
        self.vehicle = vehicle;
    }

    /// Los tres campos presentes. La igualdad salida/destino se comprueba
    /// aparte en `validate`, al enviar.
    pub fn is_submittable(&self) -> bool {
        self.departure.is_some() && self.destination.is_some() && self.vehicle.is_some()
    }

    /// Comprobación en el momento del envío.
    pub fn validate(&self) -> Result<PlanRequest, PlannerError> {
        let (Some(dep), Some(dest), Some(v)) = (&self.departure, &self.destination, &self.vehicle) else {
            return Err(PlannerError::Validation("formulario incompleto".into()));
        };
        if dep == dest {
            return Err(PlannerError::Validation(SAME_CITY_ERROR.into()));
        }
        Ok(PlanRequest { vehicle_id: v.id.clone(), departure: dep.clone(), destination: dest.clone() })
    }
}
