//! Built-in reference data: metals, their ores, and known processing routes.
//!
//! The catalog ships inside the binary as JSON and is parsed on first use.
//! Every route passes through the same validator as generator output, so the
//! embedded routes are held to the same rules as any other input.

use super::error::Error;
use crate::model::reference::{Metal, Ore};
use crate::model::route::ProcessingRoute;
use crate::pipeline::validate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};

const BUILTIN_CATALOG_JSON: &str = include_str!("../../resources/catalog.json");

static BUILTIN_CATALOG: OnceLock<Catalog> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Catalog {
    pub metals: Vec<Metal>,
}

#[derive(Deserialize)]
struct RawCatalog {
    metals: Vec<RawMetal>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetal {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    ores: Vec<RawOre>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOre {
    id: String,
    name: String,
    #[serde(default)]
    mineralogy: String,
    #[serde(default)]
    grade_range: String,
    #[serde(default)]
    associated_metals: Vec<String>,
    #[serde(default)]
    source_regions: Vec<String>,
    #[serde(default)]
    routes: Vec<Value>,
}

/// A route found in the catalog, with the metal and ore it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry<'a> {
    pub metal: &'a Metal,
    pub ore: &'a Ore,
    pub route: &'a ProcessingRoute,
}

impl Catalog {
    /// The catalog embedded in the crate.
    pub fn builtin() -> &'static Catalog {
        BUILTIN_CATALOG.get_or_init(|| {
            Catalog::from_json(BUILTIN_CATALOG_JSON)
                .expect("Failed to parse embedded route catalog. This is a library bug.")
        })
    }

    /// Parses a catalog and validates each of its routes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed JSON and [`Error::Catalog`] for
    /// the first route the validator rejects.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let raw: RawCatalog = serde_json::from_str(text)?;

        let mut metals = Vec::with_capacity(raw.metals.len());
        for metal in raw.metals {
            let mut ores = Vec::with_capacity(metal.ores.len());
            for ore in metal.ores {
                let mut routes = Vec::with_capacity(ore.routes.len());
                for (position, payload) in ore.routes.iter().enumerate() {
                    let validated = validate(payload).map_err(|source| Error::Catalog {
                        route: route_label(&metal.id, &ore.id, payload, position),
                        source,
                    })?;
                    for warning in &validated.warnings {
                        warn!(
                            metal = %metal.id,
                            ore = %ore.id,
                            route = %validated.route.id,
                            "catalog route: {}",
                            warning
                        );
                    }
                    routes.push(validated.route);
                }
                ores.push(Ore {
                    id: ore.id,
                    name: ore.name,
                    mineralogy: ore.mineralogy,
                    grade_range: ore.grade_range,
                    associated_metals: ore.associated_metals,
                    source_regions: ore.source_regions,
                    routes,
                });
            }
            metals.push(Metal {
                id: metal.id,
                name: metal.name,
                symbol: metal.symbol,
                category: metal.category,
                ores,
            });
        }

        let catalog = Catalog { metals };
        debug!(
            metals = catalog.metals.len(),
            routes = catalog.route_count(),
            "loaded route catalog"
        );
        Ok(catalog)
    }

    /// Looks up a metal by id, name, or symbol, ignoring case.
    pub fn metal(&self, key: &str) -> Option<&Metal> {
        let key = key.trim();
        self.metals.iter().find(|m| {
            m.id.eq_ignore_ascii_case(key)
                || m.name.eq_ignore_ascii_case(key)
                || m.symbol.eq_ignore_ascii_case(key)
        })
    }

    pub fn ore(&self, metal: &str, ore: &str) -> Option<&Ore> {
        self.metal(metal)?
            .ores
            .iter()
            .find(|o| o.id.eq_ignore_ascii_case(ore) || o.name.eq_ignore_ascii_case(ore))
    }

    /// Finds a route by id anywhere in the catalog.
    pub fn route(&self, id: &str) -> Option<RouteEntry<'_>> {
        self.routes().find(|entry| entry.route.id == id)
    }

    /// Iterates every route in catalog order.
    pub fn routes(&self) -> impl Iterator<Item = RouteEntry<'_>> {
        self.metals.iter().flat_map(|metal| {
            metal.ores.iter().flat_map(move |ore| {
                ore.routes
                    .iter()
                    .map(move |route| RouteEntry { metal, ore, route })
            })
        })
    }

    pub fn route_count(&self) -> usize {
        self.metals.iter().map(Metal::route_count).sum()
    }

    /// Like [`route`](Self::route), but reports a missing id as an error.
    pub fn require_route(&self, id: &str) -> Result<RouteEntry<'_>, Error> {
        self.route(id).ok_or_else(|| Error::unknown("route", id))
    }
}

fn route_label(metal: &str, ore: &str, payload: &Value, position: usize) -> String {
    match payload.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => format!("{}/{}#{}", metal, ore, position + 1),
    }
}
