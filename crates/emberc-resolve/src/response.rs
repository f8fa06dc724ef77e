//! The cooperative signal a `resolve` call hands back to its caller: either
//! it made forward progress (`Ok`) or it needs another pass over the whole
//! tree before it can proceed (`Loop`). The driver ORs these together across
//! a full pass (`wholeAgain`) to decide whether to iterate again.

/// Outcome of resolving a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// This node (and everything under it) is as resolved as it's going to
    /// get this pass; no further progress is blocked on a later pass.
    Ok,
    /// Something this node needed isn't available yet (an overload whose
    /// target hasn't been resolved, a generic argument that can't be
    /// inferred yet, ...). The whole tree needs at least one more pass.
    Loop,
}

impl Response {
    pub fn is_loop(self) -> bool {
        matches!(self, Response::Loop)
    }

    /// Combine this response with another from a sibling/child: `Loop` is
    /// sticky, mirroring `wholeAgain ||= (response == LOOP)`.
    pub fn combine(self, other: Response) -> Response {
        if self.is_loop() || other.is_loop() {
            Response::Loop
        } else {
            Response::Ok
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Response::Ok
    }
}

impl FromIterator<Response> for Response {
    fn from_iter<T: IntoIterator<Item = Response>>(iter: T) -> Self {
        iter.into_iter().fold(Response::Ok, Response::combine)
    }
}
