//! Covers command - does one schema accept every value another accepts?

use super::{exit_code, read_document, write_json};
use crate::error::CliError;
use clap::Args;
use std::path::PathBuf;
use toolschema::covers;
use toolschema_ir::{Components, Document};

#[derive(Args)]
pub struct CoversArgs {
    /// Canonical document holding the wider schema
    pub wider: PathBuf,

    /// Canonical document holding the narrower schema
    pub narrower: PathBuf,

    /// Exit with status 2 when the wider schema does not cover the narrower one
    #[arg(long)]
    pub check: bool,
}

pub fn run(args: CoversArgs) -> i32 {
    exit_code(check(&args))
}

fn check(args: &CoversArgs) -> Result<i32, CliError> {
    let wider = read_document(&args.wider)?;
    let narrower = read_document(&args.narrower)?;
    let components = shared_components(&wider, &narrower);

    let covered = covers(&wider.schema, &narrower.schema, &components);
    write_json(&serde_json::Value::Bool(covered), None)?;
    Ok(if args.check && !covered { 2 } else { 0 })
}

/// Components of both documents; the wider document's entry wins on a name clash.
fn shared_components(wider: &Document, narrower: &Document) -> Components {
    let mut components = wider.components.clone();
    for (name, schema) in narrower.components.iter() {
        match components.get(name) {
            None => {
                components.insert(name, schema.clone());
            }
            Some(existing) if existing != schema => {
                tracing::warn!(name, "component differs between documents, keeping the wider");
            }
            Some(_) => {}
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolschema_ir::{ObjectSchema, Schema};

    #[test]
    fn components_from_both_documents() {
        let point = Schema::object(ObjectSchema::new().property("x", Schema::number(), true));
        let wider = Document::new(
            Schema::reference("IPoint"),
            Components::new().with("IPoint", point.clone()),
        );
        let pixel = Schema::object(ObjectSchema::new().property("x", Schema::integer(), true));
        let narrower = Document::new(
            Schema::reference("IPixel"),
            Components::new()
                .with("IPixel", pixel)
                .with("IPoint", Schema::string()),
        );

        let components = shared_components(&wider, &narrower);
        assert_eq!(components.get("IPoint"), Some(&point));
        assert!(components.contains("IPixel"));
        assert!(covers(&wider.schema, &narrower.schema, &components));
    }
}
