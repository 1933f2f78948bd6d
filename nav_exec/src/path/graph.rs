//! Path graph traversal

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use std::collections::HashMap;
use std::fmt;

use super::{PathError, Segment, INIT_SEGMENT_ID, START_SEGMENT_ID};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The mission graph and the traversal cursor through it.
///
/// The segments are immutable once the graph is built. The cursor is held as segment names, the
/// current one and the pending success and fail edges.
#[derive(Debug, Clone)]
pub struct PathGraph {
    /// Name shown in status text, usually the file the path was loaded from
    name: String,

    segments: Vec<Segment>,

    /// Segment id to index in `segments`
    index: HashMap<String, usize>,

    current_id: String,
    success_id: String,
    fail_id: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The outgoing edge to follow.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Edge {
    Success,
    Failure,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathGraph {
    /// Build the graph from a list of segments.
    ///
    /// Segment ids must be unique, must not be the `__init__` pseudo-node, and one of them must be
    /// `__start__`.
    pub fn new(segments: Vec<Segment>) -> Result<Self, PathError> {
        Self::with_name("path", segments)
    }

    /// Build the graph giving it a name for status text.
    pub fn with_name(name: &str, segments: Vec<Segment>) -> Result<Self, PathError> {
        let mut index = HashMap::with_capacity(segments.len());

        for (i, segment) in segments.iter().enumerate() {
            if segment.id == INIT_SEGMENT_ID {
                return Err(PathError::ReservedSegmentId(segment.id.clone()));
            }

            if index.insert(segment.id.clone(), i).is_some() {
                return Err(PathError::DuplicateSegment(segment.id.clone()));
            }
        }

        if !index.contains_key(START_SEGMENT_ID) {
            return Err(PathError::NoStartSegment);
        }

        Ok(Self {
            name: format!("{} - loaded {} segments", name, segments.len()),
            segments,
            index,
            current_id: INIT_SEGMENT_ID.to_string(),
            success_id: INIT_SEGMENT_ID.to_string(),
            fail_id: INIT_SEGMENT_ID.to_string(),
        })
    }

    /// Find a segment by name.
    ///
    /// `None` is a normal result, edges may deliberately name segments which don't exist.
    pub fn get_segment(&self, id: &str) -> Option<&Segment> {
        self.index.get(id).map(|&i| &self.segments[i])
    }

    /// Move along the success edge of the current segment.
    pub fn move_on_success(&mut self) -> Option<&Segment> {
        self.advance(Edge::Success)
    }

    /// Move along the fail edge of the current segment.
    pub fn move_on_failure(&mut self) -> Option<&Segment> {
        self.advance(Edge::Failure)
    }

    /// Move along the given edge.
    ///
    /// From the `__init__` pseudo-node both edges lead to `__start__`. If the edge names a segment
    /// which doesn't exist `None` is returned and the cursor is left where it was, so calling
    /// again gives the same result.
    pub fn advance(&mut self, edge: Edge) -> Option<&Segment> {
        let target_id = if self.current_id == INIT_SEGMENT_ID {
            START_SEGMENT_ID.to_string()
        } else {
            match edge {
                Edge::Success => self.success_id.clone(),
                Edge::Failure => self.fail_id.clone(),
            }
        };

        let i = match self.index.get(&target_id) {
            Some(&i) => i,
            None => {
                debug!(
                    "No segment \"{}\" on the {:?} edge of \"{}\"",
                    target_id, edge, self.current_id
                );
                return None;
            }
        };

        let segment = &self.segments[i];
        self.current_id = target_id;
        self.success_id = segment.success.clone();
        self.fail_id = segment.fail.clone();

        Some(segment)
    }

    /// The segment the cursor is on, `None` before the first advance.
    pub fn current(&self) -> Option<&Segment> {
        self.get_segment(&self.current_id)
    }

    pub fn current_id(&self) -> &str {
        &self.current_id
    }

    /// Name of the pending success edge.
    pub fn next_id(&self) -> &str {
        &self.success_id
    }

    /// Name of the pending fail edge.
    pub fn fallback_id(&self) -> &str {
        &self.fail_id
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterate over the segments in the order they were given.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }
}

impl fmt::Display for PathGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\t file:  {}\n\t current:  {}\n\t next:  {}\n\t fallback:  {}",
            self.name, self.current_id, self.success_id, self.fail_id
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
