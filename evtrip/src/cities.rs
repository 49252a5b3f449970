//! cities.rs
//! Caché del directorio de ciudades. Guarda la lista completa tal cual llega
//! y filtra por subcadena para el buscador de cada selector.

use crate::error::Result;
use crate::gateway::TripApi;
use crate::types::City;

#[derive(Clone, Debug, Default)]
pub struct CityDirectory {
    cities: Vec<City>,
}

impl CityDirectory {
    pub fn new(cities: Vec<City>) -> Self {
        Self { cities }
    }

    pub async fn load(api: &dyn TripApi) -> Result<Self> {
        Ok(Self::new(api.fetch_cities().await?))
    }

    pub fn len(&self) -> usize { self.cities.len() }
    pub fn is_empty(&self) -> bool { self.cities.is_empty() }

    /// Ciudades cuyo nombre contiene `query`, sin distinguir mayúsculas,
    /// en el orden de origen.
    pub fn filter<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a City> + 'a {
        let q = query.to_lowercase();
        self.cities.iter().filter(move |c| c.name.to_lowercase().contains(&q))
    }

    /// Listado por defecto de los selectores.
    pub fn major(&self, min_population: u64) -> impl Iterator<Item = &City> + '_ {
        self.cities.iter().filter(move |c| c.population >= min_population)
    }
}
