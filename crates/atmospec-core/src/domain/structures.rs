//! Conformer geometries that accompany the transition records.
//!
//! Upstream workflows hand over either a single structure or a trajectory of
//! structures (one frame per conformer). Both are normalized into a
//! [`ConformerTrajectory`] so that conformer indices line up with the
//! transition records.

use super::{AtmospecError, ComputeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MolecularStructure {
    pub symbols: Vec<String>,
    pub positions: Vec<[f64; 3]>,
}

impl MolecularStructure {
    pub fn atom_count(&self) -> usize {
        self.symbols.len()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConformerTrajectory {
    frames: Vec<MolecularStructure>,
}

impl ConformerTrajectory {
    pub fn new(frames: Vec<MolecularStructure>) -> Self {
        Self { frames }
    }

    /// Accepts a structure object or an array of structure objects.
    ///
    /// Any other JSON type fails with an invalid-argument error naming it.
    pub fn from_value(value: Value) -> ComputeResult<Self> {
        match value {
            Value::Object(_) => {
                let structure = parse_structure(value)?;
                Ok(Self::new(vec![structure]))
            }
            Value::Array(items) => {
                let frames = items
                    .into_iter()
                    .map(parse_structure)
                    .collect::<ComputeResult<Vec<_>>>()?;
                Ok(Self::new(frames))
            }
            other => Err(AtmospecError::input_validation(
                "INPUT.STRUCTURE_TYPE",
                format!("unsupported conformer structure type '{}'", json_type_name(&other)),
            )),
        }
    }

    pub fn frames(&self) -> &[MolecularStructure] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&MolecularStructure> {
        self.frames.get(index)
    }
}

fn parse_structure(value: Value) -> ComputeResult<MolecularStructure> {
    if !value.is_object() {
        return Err(AtmospecError::input_validation(
            "INPUT.STRUCTURE_TYPE",
            format!("unsupported conformer structure type '{}'", json_type_name(&value)),
        ));
    }
    let structure: MolecularStructure = serde_json::from_value(value).map_err(|error| {
        AtmospecError::input_validation(
            "INPUT.STRUCTURE_FORMAT",
            format!("failed to parse conformer structure: {error}"),
        )
    })?;
    if structure.symbols.len() != structure.positions.len() {
        return Err(AtmospecError::input_validation(
            "INPUT.STRUCTURE_FORMAT",
            format!(
                "structure has {} symbols but {} positions",
                structure.symbols.len(),
                structure.positions.len()
            ),
        ));
    }
    Ok(structure)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
