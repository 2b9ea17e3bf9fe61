//! Spatially varying models and the aperture correction map
//!
//! A [`BoundedField`] maps a pixel position inside its bounding box to a scalar.
//! Positions outside the box yield a [`DomainError`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{DomainError, Point2D};

/// Floating-point bounding box, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Box2D {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Box2D {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn contains(&self, point: Point2D) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Scalar model over a bounded 2-D region
pub trait BoundedField: fmt::Debug + Send + Sync {
    /// Valid region
    fn bbox(&self) -> Box2D;

    /// Evaluate at `point`
    ///
    /// # Errors
    /// `DomainError` if `point` is outside [`BoundedField::bbox`].
    fn evaluate(&self, point: Point2D) -> Result<f64, DomainError>;
}

fn check_domain(bbox: &Box2D, point: Point2D) -> Result<(), DomainError> {
    if bbox.contains(point) {
        Ok(())
    } else {
        Err(DomainError {
            x: point.x,
            y: point.y,
        })
    }
}

/// Same value everywhere inside the box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantField {
    pub bbox: Box2D,
    pub value: f64,
}

impl ConstantField {
    pub fn new(bbox: Box2D, value: f64) -> Self {
        Self { bbox, value }
    }
}

impl BoundedField for ConstantField {
    fn bbox(&self) -> Box2D {
        self.bbox
    }

    fn evaluate(&self, point: Point2D) -> Result<f64, DomainError> {
        check_domain(&self.bbox, point)?;
        Ok(self.value)
    }
}

/// 2-D Chebyshev series over the bounding box
///
/// `coefficients[j][i]` multiplies `T_j(y) * T_i(x)`, with x and y
/// rescaled so the box maps onto [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChebyshevField {
    pub bbox: Box2D,
    pub coefficients: Vec<Vec<f64>>,
}

impl ChebyshevField {
    pub fn new(bbox: Box2D, coefficients: Vec<Vec<f64>>) -> Self {
        Self { bbox, coefficients }
    }

    fn normalize(value: f64, min: f64, max: f64) -> f64 {
        let span = max - min;
        if span <= 0.0 {
            0.0
        } else {
            (2.0 * (value - min) / span - 1.0).clamp(-1.0, 1.0)
        }
    }
}

/// T_0..T_{n-1} at `t`
fn chebyshev_polynomials(t: f64, n: usize) -> Vec<f64> {
    let mut polynomials = vec![0.0; n];
    if n > 0 {
        polynomials[0] = 1.0;
    }
    if n > 1 {
        polynomials[1] = t;
    }
    for degree in 2..n {
        polynomials[degree] = 2.0 * t * polynomials[degree - 1] - polynomials[degree - 2];
    }
    polynomials
}

impl BoundedField for ChebyshevField {
    fn bbox(&self) -> Box2D {
        self.bbox
    }

    fn evaluate(&self, point: Point2D) -> Result<f64, DomainError> {
        check_domain(&self.bbox, point)?;

        let x = Self::normalize(point.x, self.bbox.min_x, self.bbox.max_x);
        let y = Self::normalize(point.y, self.bbox.min_y, self.bbox.max_y);

        let nx = self.coefficients.iter().map(Vec::len).max().unwrap_or(0);
        let tx = chebyshev_polynomials(x, nx);
        let ty = chebyshev_polynomials(y, self.coefficients.len());

        let value = self
            .coefficients
            .iter()
            .zip(&ty)
            .map(|(row, ty_j)| {
                ty_j * row
                    .iter()
                    .zip(&tx)
                    .map(|(c, tx_i)| c * tx_i)
                    .sum::<f64>()
            })
            .sum();

        Ok(value)
    }
}

/// Serializable model description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundedFieldSpec {
    Constant(ConstantField),
    Chebyshev(ChebyshevField),
}

impl BoundedFieldSpec {
    pub fn into_field(self) -> Arc<dyn BoundedField> {
        match self {
            Self::Constant(field) => Arc::new(field),
            Self::Chebyshev(field) => Arc::new(field),
        }
    }
}

/// Aperture correction map: field name -> model
///
/// Supplied by the caller and read-only to the correction task.
#[derive(Debug, Clone, Default)]
pub struct ApCorrMap {
    models: BTreeMap<String, Arc<dyn BoundedField>>,
}

impl ApCorrMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a model
    pub fn insert(&mut self, name: impl Into<String>, model: Arc<dyn BoundedField>) {
        self.models.insert(name.into(), model);
    }

    pub fn get(&self, name: &str) -> Option<&dyn BoundedField> {
        self.models.get(name).map(|m| m.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Interchange form of an [`ApCorrMap`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApCorrMapDocument {
    #[serde(default)]
    pub fields: BTreeMap<String, BoundedFieldSpec>,
}

impl From<ApCorrMapDocument> for ApCorrMap {
    fn from(document: ApCorrMapDocument) -> Self {
        let mut map = ApCorrMap::new();
        for (name, spec) in document.fields {
            map.insert(name, spec.into_field());
        }
        map
    }
}
