//! Metamodel dump: a plain-text listing of every entity a registry knows.
//!
//! A debugging aid, not a wire format:
//!
//! ```text
//! ABSTRACT ENTITY Expr
//!
//! ENTITY Sum : Expr
//!     relation operand -> Operand*
//!     property PLUS -> STRING*
//! ```

use std::fmt::{self, Write};

use crate::model::{is_positional, Entity, EntityId, Multiplicity};
use crate::registry::Registry;

/// Render the registry's entities, sorted by name. Positional properties
/// are listed only when `include_positions` is set.
pub fn render_metamodel(registry: &Registry, include_positions: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_metamodel(registry, include_positions, &mut out);
    out
}

/// Write the same listing as `render_metamodel` to any `fmt::Write` sink.
pub fn write_metamodel(
    registry: &Registry,
    include_positions: bool,
    writer: &mut dyn Write,
) -> fmt::Result {
    let entities = registry.entities();
    let mut sorted: Vec<&Entity> = entities.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    for (i, entity) in sorted.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        write_entity(entity, &entities, include_positions, writer)?;
    }
    Ok(())
}

fn write_entity(
    entity: &Entity,
    all: &[Entity],
    include_positions: bool,
    writer: &mut dyn Write,
) -> fmt::Result {
    let name_of = |id: EntityId| {
        all.get(id.index()).map(|e| e.name.as_str()).unwrap_or("?")
    };

    if entity.is_abstract {
        write!(writer, "ABSTRACT ")?;
    }
    write!(writer, "ENTITY {}", entity.name)?;
    if let Some(parent) = entity.parent {
        write!(writer, " : {}", name_of(parent))?;
    }
    writeln!(writer)?;

    for relation in entity.relations() {
        writeln!(
            writer,
            "    relation {} -> {}{}",
            relation.name,
            name_of(relation.target),
            many_marker(relation.multiplicity)
        )?;
    }
    for property in entity.properties() {
        if !include_positions && is_positional(&property.name) {
            continue;
        }
        writeln!(
            writer,
            "    property {} -> {}{}",
            property.name,
            property.datatype,
            many_marker(property.multiplicity)
        )?;
    }
    Ok(())
}

fn many_marker(multiplicity: Multiplicity) -> &'static str {
    match multiplicity {
        Multiplicity::One => "",
        Multiplicity::Many => "*",
    }
}
