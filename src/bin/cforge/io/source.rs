use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const CATALOG_PREFIX: &str = "catalog:";

/// Where a route comes from on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSource {
    Stdin,
    File(PathBuf),
    /// A route id in the built-in catalog.
    Catalog(String),
}

impl FromStr for RouteSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("route source cannot be empty".to_string());
        }
        if s == "-" {
            return Ok(RouteSource::Stdin);
        }
        match s.strip_prefix(CATALOG_PREFIX) {
            Some("") => Err(format!("expected a route id after '{}'", CATALOG_PREFIX)),
            Some(id) => Ok(RouteSource::Catalog(id.to_string())),
            None => Ok(RouteSource::File(PathBuf::from(s))),
        }
    }
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteSource::Stdin => write!(f, "<stdin>"),
            RouteSource::File(path) => write!(f, "{}", path.display()),
            RouteSource::Catalog(id) => write!(f, "{}{}", CATALOG_PREFIX, id),
        }
    }
}
