#![forbid(unsafe_code)]

//! Document-model boundary for the NetPad history engine.
//!
//! NetPad documents are mutable graphs whose connectors carry multi-point
//! paths and per-token weight expressions. This crate holds only the slice
//! of that model the history engine mutates: connectors addressed by stable
//! id, their ordered [`PathPoint`] sequences, and their token-weight maps.
//!
//! # Ownership
//!
//! The [`Document`] owns every connector. History commands hold a
//! [`ConnectorId`] lookup handle, never a reference, so recorded history
//! can never extend the lifetime of a deleted entity. A handle that no
//! longer resolves is the "stale target" condition the history engine
//! reports.
//!
//! # Invariants
//!
//! 1. Connector ids are assigned monotonically and never reused within a
//!    document.
//! 2. A connector's path always contains its two endpoints; intermediate
//!    points live between them.
//! 3. A token with no explicit weight reads as [`DEFAULT_WEIGHT`].

use std::fmt;

use ahash::AHashMap;

/// Weight expression for tokens with no explicit entry.
pub const DEFAULT_WEIGHT: &str = "1";

/// Stable identifier for a connector within a [`Document`].
///
/// Commands store this id to locate their target at apply/revert time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectorId(pub u64);

impl ConnectorId {
    /// Create a connector id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connector#{}", self.0)
    }
}

/// Identifier for a token colour whose weight a connector annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(pub u32);

impl TokenId {
    /// Create a token id from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A position on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint of the segment between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// One point of a connector's path.
///
/// `curved` selects the segment kind leading out of the point: straight
/// polyline or Bezier curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub position: Point,
    pub curved: bool,
}

impl PathPoint {
    #[must_use]
    pub const fn new(position: Point, curved: bool) -> Self {
        Self { position, curved }
    }

    /// Flip the curve flag. Self-inverse.
    pub fn toggle_kind(&mut self) {
        self.curved = !self.curved;
    }
}

/// A connector between two graph nodes: an ordered path of points plus a
/// weight expression per token.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    weights: AHashMap<TokenId, String>,
    points: Vec<PathPoint>,
}

impl Connector {
    /// Create a connector with straight endpoints at `source` and `target`.
    #[must_use]
    pub fn new(source: Point, target: Point) -> Self {
        Self {
            weights: AHashMap::new(),
            points: vec![PathPoint::new(source, false), PathPoint::new(target, false)],
        }
    }

    // ========================================================================
    // Weights
    // ========================================================================

    /// Weight expression for `token`, or [`DEFAULT_WEIGHT`] if unset.
    #[must_use]
    pub fn weight_for(&self, token: TokenId) -> &str {
        self.weights
            .get(&token)
            .map_or(DEFAULT_WEIGHT, String::as_str)
    }

    /// The explicit weight entry for `token`, `None` when the token reads
    /// as the default weight.
    #[must_use]
    pub fn explicit_weight(&self, token: TokenId) -> Option<&str> {
        self.weights.get(&token).map(String::as_str)
    }

    /// Set the weight expression for `token`.
    ///
    /// Expression syntax is not validated here; callers run the expression
    /// evaluator before constructing an edit.
    pub fn set_weight(&mut self, token: TokenId, expr: impl Into<String>) {
        self.weights.insert(token, expr.into());
    }

    /// Remove the explicit weight entry for `token`, so it reads as
    /// [`DEFAULT_WEIGHT`] again. Returns the removed expression.
    pub fn clear_weight(&mut self, token: TokenId) -> Option<String> {
        self.weights.remove(&token)
    }

    /// All explicit token weights.
    #[must_use]
    pub fn token_weights(&self) -> &AHashMap<TokenId, String> {
        &self.weights
    }

    /// Whether any weight is a functional expression rather than a plain
    /// integer literal.
    #[must_use]
    pub fn has_functional_weight(&self) -> bool {
        self.weights
            .values()
            .any(|expr| expr.trim().parse::<u64>().is_err())
    }

    // ========================================================================
    // Path points
    // ========================================================================

    /// The full path, endpoints included.
    #[must_use]
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    /// Number of path points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// The point at `index`, if in bounds.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<&PathPoint> {
        self.points.get(index)
    }

    /// Mutable access to the point at `index`, if in bounds.
    pub fn point_mut(&mut self, index: usize) -> Option<&mut PathPoint> {
        self.points.get_mut(index)
    }

    /// Insert `point` at `index`, shifting later points back.
    ///
    /// Returns `false` (and leaves the path unchanged) if `index` is past
    /// the end of the path.
    pub fn insert_point(&mut self, index: usize, point: PathPoint) -> bool {
        if index > self.points.len() {
            return false;
        }
        self.points.insert(index, point);
        true
    }

    /// Remove and return the point at `index`, if in bounds.
    pub fn remove_point(&mut self, index: usize) -> Option<PathPoint> {
        if index < self.points.len() {
            Some(self.points.remove(index))
        } else {
            None
        }
    }

    /// A new path point halfway along the segment from `index` to
    /// `index + 1`, inheriting the leading point's curve flag.
    ///
    /// `None` if `index` does not name a segment.
    #[must_use]
    pub fn midpoint(&self, index: usize) -> Option<PathPoint> {
        let lead = self.points.get(index)?;
        let next = self.points.get(index + 1)?;
        Some(PathPoint::new(
            lead.position.midpoint(next.position),
            lead.curved,
        ))
    }
}

/// An open NetPad document: the owning collection of connectors.
///
/// The document controls entity lifetime; the history engine only observes
/// and reverses state transitions on entities it looks up here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    connectors: AHashMap<ConnectorId, Connector>,
    next_id: u64,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connector, returning its freshly assigned id.
    pub fn add_connector(&mut self, connector: Connector) -> ConnectorId {
        let id = ConnectorId::new(self.next_id);
        self.next_id += 1;
        self.connectors.insert(id, connector);
        id
    }

    /// Remove a connector. Returns the entity, or `None` if the id was
    /// already gone.
    pub fn remove_connector(&mut self, id: ConnectorId) -> Option<Connector> {
        self.connectors.remove(&id)
    }

    /// Resolve a connector id.
    #[must_use]
    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    /// Resolve a connector id mutably.
    pub fn connector_mut(&mut self, id: ConnectorId) -> Option<&mut Connector> {
        self.connectors.get_mut(&id)
    }

    /// Whether `id` still names a live connector.
    #[must_use]
    pub fn contains(&self, id: ConnectorId) -> bool {
        self.connectors.contains_key(&id)
    }

    /// Number of live connectors.
    #[must_use]
    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
