// src/form.rs
// Per-link parameter fields. build() lays out three numeric fields per link with positional
// defaults; read() collects their current values into a ChainConfiguration.
// Rebuilding always starts from defaults: values typed for a previous chain length are dropped.

use crate::error::FormError;
use crate::model::{ChainConfiguration, LinkParams};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Longest chain the form will lay out.
pub const MAX_CHAIN_LENGTH: usize = 100;

/// Which parameter of a link a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Mass,
    Length,
    Angle,
}

impl FieldKind {
    const ALL: [FieldKind; 3] = [FieldKind::Mass, FieldKind::Length, FieldKind::Angle];

    fn prefix(self) -> &'static str {
        match self {
            FieldKind::Mass => "mass",
            FieldKind::Length => "length",
            FieldKind::Angle => "angle",
        }
    }

    fn label(self) -> &'static str {
        match self {
            FieldKind::Mass => "Mass",
            FieldKind::Length => "Length",
            FieldKind::Angle => "Angle (deg)",
        }
    }
}

/// Stable field identifier, rendered as `mass_3`, `length_1`, `angle_2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId {
    pub kind: FieldKind,
    pub link: usize, // 1-based
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.prefix(), self.link)
    }
}

impl FromStr for FieldId {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || FormError::UnknownField(s.to_string());
        let (prefix, link) = s.rsplit_once('_').ok_or_else(unknown)?;
        let kind = FieldKind::ALL
            .into_iter()
            .find(|kind| kind.prefix() == prefix)
            .ok_or_else(unknown)?;
        let link: usize = link.parse().map_err(|_| unknown())?;
        if link == 0 {
            return Err(unknown());
        }
        Ok(FieldId { kind, link })
    }
}

impl Serialize for FieldId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One labeled numeric input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub id: FieldId,
    pub label: String,
    pub value: f64,
}

/// The fields of the last build, three per link in link order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of links this set was built for.
    pub fn links(&self) -> usize {
        self.fields.len() / FieldKind::ALL.len()
    }

    fn position(&self, id: FieldId) -> Option<usize> {
        if id.link == 0 || id.link > self.links() {
            return None;
        }
        let column = FieldKind::ALL.iter().position(|&k| k == id.kind)?;
        Some((id.link - 1) * FieldKind::ALL.len() + column)
    }

    pub fn get(&self, id: FieldId) -> Option<f64> {
        self.position(id).map(|pos| self.fields[pos].value)
    }
}

/// Owns the current field set and rebuilds it on chain-length changes.
#[derive(Debug, Clone)]
pub struct ChainFormBuilder {
    current: FieldSet,
}

impl ChainFormBuilder {
    /// Starts with the fields for an `n`-link chain.
    pub fn new(n: usize) -> Result<Self, FormError> {
        let mut builder = Self {
            current: FieldSet { fields: Vec::new() },
        };
        builder.build(n)?;
        Ok(builder)
    }

    /// Replaces every field with the defaults for `n` links.
    pub fn build(&mut self, n: usize) -> Result<&FieldSet, FormError> {
        if n == 0 {
            return Err(FormError::EmptyChain);
        }
        if n > MAX_CHAIN_LENGTH {
            return Err(FormError::TooLong {
                requested: n,
                max: MAX_CHAIN_LENGTH,
            });
        }
        let capacity = n.checked_mul(FieldKind::ALL.len()).ok_or(FormError::TooLong {
            requested: n,
            max: MAX_CHAIN_LENGTH,
        })?; // three fields per link
        let mut fields = Vec::with_capacity(capacity);
        for link in 1..=n {
            let defaults = LinkParams::default_for(link);
            for kind in FieldKind::ALL {
                let value = match kind {
                    FieldKind::Mass => defaults.mass,
                    FieldKind::Length => defaults.length,
                    FieldKind::Angle => defaults.initial_angle_deg,
                };
                fields.push(Field {
                    id: FieldId { kind, link },
                    label: format!("{} {}", kind.label(), link),
                    value,
                });
            }
        }
        self.current = FieldSet { fields };
        Ok(&self.current)
    }

    pub fn fields(&self) -> &FieldSet {
        &self.current
    }

    /// Number of links in the last build.
    pub fn chain_length(&self) -> usize {
        self.current.links()
    }

    /// Edits one field. Masses and lengths must stay positive; all values must be finite.
    pub fn set(&mut self, id: FieldId, value: f64) -> Result<(), FormError> {
        let invalid = |reason| FormError::InvalidValue {
            field: id.to_string(),
            value,
            reason,
        };
        if !value.is_finite() {
            return Err(invalid("must be a finite number"));
        }
        if id.kind != FieldKind::Angle && value <= 0.0 {
            return Err(invalid("must be greater than zero"));
        }
        let pos = self
            .current
            .position(id)
            .ok_or_else(|| FormError::UnknownField(id.to_string()))?;
        self.current.fields[pos].value = value;
        Ok(())
    }

    /// Reads the current values for links `1..=n`.
    pub fn read(&self, n: usize) -> Result<ChainConfiguration, FormError> {
        let built = self.current.links();
        if n > built {
            return Err(FormError::NotBuilt { requested: n, built });
        }
        let value = |kind, link| {
            self.current
                .get(FieldId { kind, link })
                .ok_or_else(|| FormError::UnknownField(FieldId { kind, link }.to_string()))
        };
        let mut links = Vec::with_capacity(n);
        for link in 1..=n {
            links.push(LinkParams {
                mass: value(FieldKind::Mass, link)?,
                length: value(FieldKind::Length, link)?,
                initial_angle_deg: value(FieldKind::Angle, link)?,
            });
        }
        ChainConfiguration::new(links).ok_or(FormError::EmptyChain)
    }
}
