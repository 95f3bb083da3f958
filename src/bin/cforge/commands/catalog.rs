use anyhow::Result;

use circu_forge::Metal;
use circu_forge::io::catalog::Catalog;
use circu_forge::io::{Error as IoError, write_json};

use crate::cli::{CatalogArgs, OutputFormat};
use crate::display::{Context as DisplayContext, print_catalog};
use crate::io::create_output;

pub fn run_catalog(args: CatalogArgs, ctx: DisplayContext) -> Result<()> {
    let catalog = Catalog::builtin();
    let metals = select_metals(catalog, args.metal.as_deref())?;

    if ctx.interactive || args.output.format == OutputFormat::Table {
        print_catalog(&metals);
    }

    if args.output.format == OutputFormat::Json {
        let out = create_output(args.output.output.as_deref())?;
        write_json(out, &metals)?;
    }

    Ok(())
}

fn select_metals<'a>(catalog: &'a Catalog, key: Option<&str>) -> Result<Vec<&'a Metal>, IoError> {
    match key {
        Some(key) => catalog
            .metal(key)
            .map(|m| vec![m])
            .ok_or_else(|| IoError::unknown("metal", key)),
        None => Ok(catalog.metals.iter().collect()),
    }
}
