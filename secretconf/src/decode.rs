//! Table-driven struct decoder

use std::fs;

use tracing::trace;

use crate::de;
use crate::error::ConfError;
use crate::field::{AssignFn, EnvConfig, Field, FieldSpec};
use crate::lookup::Lookuper;
use crate::mutate::{Mutator, Value};

/// Walks a struct's field table, looking up, mutating and converting each
/// field in declaration order and recursing into nested structs.
///
/// The first failing field aborts the decode. Fields decoded before the
/// failure stay written, so callers must discard the target on error.
pub struct Decoder<'a> {
    lookuper: &'a dyn Lookuper,
    mutators: &'a [Box<dyn Mutator>],
    prefix: String,
    path: Vec<&'static str>,
}

impl<'a> Decoder<'a> {
    pub fn new(lookuper: &'a dyn Lookuper, mutators: &'a [Box<dyn Mutator>]) -> Self {
        Self {
            lookuper,
            mutators,
            prefix: String::new(),
            path: Vec::new(),
        }
    }

    /// Populate `target` from the lookuper.
    pub fn decode<T: EnvConfig>(&mut self, target: &mut T) -> Result<(), ConfError> {
        for field in T::fields() {
            match field {
                Field::Scalar { spec, assign } => self.decode_scalar(target, spec, assign)?,
                Field::Nested {
                    name,
                    prefix,
                    decode,
                } => {
                    let saved = self.prefix.len();
                    self.prefix.push_str(prefix);
                    self.path.push(name);
                    let result = decode(target, self);
                    self.path.pop();
                    self.prefix.truncate(saved);
                    result?;
                }
            }
        }
        Ok(())
    }

    /// Apply the enclosing prefixes and struct path to a table entry.
    fn qualify(&self, mut spec: FieldSpec) -> FieldSpec {
        spec.key = format!("{}{}", self.prefix, spec.key);
        if !self.path.is_empty() {
            spec.path = format!("{}.{}", self.path.join("."), spec.path);
        }
        spec
    }

    /// Look the key up, falling back to `{KEY}_FILE` for `from_file` fields.
    ///
    /// The flag is true when the value was read from a file.
    fn lookup(&self, spec: &FieldSpec) -> Result<Option<(String, bool)>, ConfError> {
        if let Some(value) = self.lookuper.lookup(&spec.key) {
            return Ok(Some((value, false)));
        }
        if !spec.from_file {
            return Ok(None);
        }

        let file_var_name = format!("{}_FILE", spec.key);
        let Some(file_path) = self.lookuper.lookup(&file_var_name) else {
            return Ok(None);
        };
        let contents = fs::read_to_string(&file_path).map_err(|e| ConfError::FileRead {
            name: file_var_name,
            path: file_path,
            source: e,
        })?;
        Ok(Some((contents.trim().to_string(), true)))
    }

    fn decode_scalar<T>(
        &self,
        target: &mut T,
        spec: FieldSpec,
        assign: AssignFn<T>,
    ) -> Result<(), ConfError> {
        let spec = self.qualify(spec);
        if spec.required && spec.default.is_some() {
            return Err(ConfError::Conflict { name: spec.key });
        }

        let (raw, from_file) = match self.lookup(&spec)? {
            Some(found) => found,
            None => match &spec.default {
                Some(default) => {
                    trace!(key = %spec.key, "using default");
                    (default.clone(), false)
                }
                None if spec.required => return Err(ConfError::missing(spec.key.clone())),
                None => {
                    trace!(key = %spec.key, "unset, keeping zero value");
                    return Ok(());
                }
            },
        };

        let mut value = Value::classify(raw);
        let redact = from_file || value.is_secret();
        for mutator in self.mutators {
            value = mutator
                .mutate(&spec, value)
                .map_err(|source| ConfError::Mutate {
                    name: spec.key.clone(),
                    source,
                })?;
        }

        let raw = value.into_raw();
        let parse_error = |message: String| ConfError::Parse {
            name: spec.key.clone(),
            type_name: spec.kind.to_string(),
            value: (!redact).then(|| raw.clone()),
            message: if redact {
                format!("value is not a valid {}", spec.kind)
            } else {
                message
            },
        };
        let scalar = de::convert(spec.kind, &raw).map_err(parse_error)?;
        assign(target, scalar).map_err(parse_error)?;
        trace!(key = %spec.key, path = %spec.path, "decoded");
        Ok(())
    }
}

/// Decode a fresh `T` with no mutators.
pub fn process<T: EnvConfig>(lookuper: &dyn Lookuper) -> Result<T, ConfError> {
    let mut target = T::default();
    process_with(&mut target, lookuper, &[])?;
    Ok(target)
}

/// Decode into `target`, threading every value through `mutators` in order.
pub fn process_with<T: EnvConfig>(
    target: &mut T,
    lookuper: &dyn Lookuper,
    mutators: &[Box<dyn Mutator>],
) -> Result<(), ConfError> {
    Decoder::new(lookuper, mutators).decode(target)
}
