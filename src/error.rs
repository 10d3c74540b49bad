// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The ways a render can fail.  There are only two: the request was
//! nonsense, and we refused it before doing any work, or one of the
//! workers fell over.  The numeric kernel itself cannot fail.

/// Everything that can go wrong between receiving a request and
/// handing back a raster.
#[derive(Debug, Fail, PartialEq)]
pub enum RenderError {
    /// The request described an image or a viewport we cannot
    /// render: a zero dimension, a non-positive zoom, and so on.
    #[fail(display = "invalid render request: {}", reason)]
    InvalidRequest {
        /// A human-readable account of what was wrong.
        reason: String,
    },

    /// A column worker panicked before the barrier was reached.
    #[fail(display = "a render worker panicked")]
    WorkerPanic,
}

impl RenderError {
    pub(crate) fn invalid<S: Into<String>>(reason: S) -> Self {
        RenderError::InvalidRequest {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_displays_its_reason() {
        let err = RenderError::invalid("width must be positive");
        assert_eq!(
            err.to_string(),
            "invalid render request: width must be positive"
        );
    }
}
