//! Structural and security checks applied to every inbound frame before
//! anything is executed.

use std::{error::Error, fmt};

use crate::{Frame, Instruction, Limits, Module};

/// A rejected instruction, naming the first violated constraint.
#[derive(Debug)]
pub enum ValidationError {
    /// The frame exceeds the payload ceiling; it was never parsed.
    Oversized { len: usize, max: usize },
    /// The frame is not well-formed JSON.
    Malformed(String),
    /// The frame parsed but is not a JSON object.
    NotAnObject,
    /// A required top-level field is absent.
    MissingField(&'static str),
    /// The `module` field is not a string.
    BadModuleField,
    /// The named module does not exist.
    UnknownModule(String),
    /// The module exists but is not in the configured allow-list.
    ModuleNotAllowed(Module),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Oversized { len, max } => {
                write!(f, "frame of {len} bytes exceeds the {max} byte ceiling")
            }
            ValidationError::Malformed(detail) => write!(f, "malformed frame: {detail}"),
            ValidationError::NotAnObject => f.write_str("instruction must be a JSON object"),
            ValidationError::MissingField(name) => write!(f, "missing field: {name}"),
            ValidationError::BadModuleField => f.write_str("module must be a string"),
            ValidationError::UnknownModule(name) => write!(f, "unknown module: {name}"),
            ValidationError::ModuleNotAllowed(module) => {
                write!(f, "module not allowed: {}", module.as_str())
            }
        }
    }
}

impl Error for ValidationError {}

/// Checks a raw frame against the structural constraints and produces a typed
/// instruction.
///
/// Checks run in a fixed order: size ceiling, well-formedness, field
/// presence, module membership. Handler-specific payload rules are not
/// applied here; they stay local to the owning handler.
///
/// # Arguments
/// * `frame` - The raw inbound frame.
/// * `limits` - The resource ceiling table.
/// * `allowed` - The configured module allow-list.
///
/// # Errors
/// Returns the first violated constraint.
pub fn parse_instruction(
    frame: &Frame,
    limits: &Limits,
    allowed: &[Module],
) -> Result<Instruction, ValidationError> {
    let bytes = match frame {
        Frame::Oversized { len } => {
            return Err(ValidationError::Oversized {
                len: *len,
                max: limits.max_payload_size,
            });
        }
        Frame::Line(bytes) => bytes,
    };

    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

    let module_field = object
        .get("module")
        .ok_or(ValidationError::MissingField("module"))?;
    let payload = object
        .get("payload")
        .ok_or(ValidationError::MissingField("payload"))?;

    let name = module_field.as_str().ok_or(ValidationError::BadModuleField)?;
    let module =
        Module::from_name(name).ok_or_else(|| ValidationError::UnknownModule(name.to_string()))?;

    if !allowed.contains(&module) {
        return Err(ValidationError::ModuleNotAllowed(module));
    }

    Ok(Instruction {
        module,
        payload: payload.clone(),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn line(s: &str) -> Frame {
        Frame::Line(s.as_bytes().to_vec())
    }

    const ALL: [Module; 3] = [Module::Model, Module::Accelerator, Module::Quantum];

    #[test]
    fn accepts_a_well_formed_instruction() {
        let frame = line(r#"{"module": "quantum", "payload": {"n_qubits": 2}}"#);
        let instruction = parse_instruction(&frame, &Limits::default(), &ALL).unwrap();
        assert_eq!(instruction.module, Module::Quantum);
        assert_eq!(instruction.payload["n_qubits"], 2);
    }

    #[test]
    fn rejects_oversized_frames_without_parsing() {
        let frame = Frame::Oversized { len: 10_000_000 };
        let err = parse_instruction(&frame, &Limits::default(), &ALL).unwrap_err();
        assert!(matches!(err, ValidationError::Oversized { .. }));
    }

    #[test]
    fn rejects_missing_module_field() {
        let frame = line(r#"{"payload": {}}"#);
        let err = parse_instruction(&frame, &Limits::default(), &ALL).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("module")));
    }

    #[test]
    fn rejects_missing_payload_field() {
        let frame = line(r#"{"module": "model"}"#);
        let err = parse_instruction(&frame, &Limits::default(), &ALL).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("payload")));
    }

    #[test]
    fn rejects_an_unknown_module_name() {
        let frame = line(r#"{"module": "filesystem", "payload": {}}"#);
        let err = parse_instruction(&frame, &Limits::default(), &ALL).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownModule(_)));
    }

    #[test]
    fn rejects_a_module_outside_the_allow_list() {
        let frame = line(r#"{"module": "quantum", "payload": {}}"#);
        let err = parse_instruction(&frame, &Limits::default(), &[Module::Model]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ModuleNotAllowed(Module::Quantum)
        ));
    }

    #[test]
    fn rejects_garbage_bytes_as_malformed() {
        let frame = line("not json at all");
        let err = parse_instruction(&frame, &Limits::default(), &ALL).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }
}
