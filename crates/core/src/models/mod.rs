//! Black-box model collaborators.
//!
//! The scanners only see these traits. Each call returns a typed result and
//! the scoring layer decides what a failure means, which is nearly always
//! "no signal" for that input.

use std::path::Path;

use crate::{
    error::Result,
    types::{Classification, Detection, Rect, Transcript},
};

mod command;
#[cfg(feature = "vit")]
mod vit;

pub use command::{CommandClassifier, CommandDetector, CommandFaceLocator, program_available};
#[cfg(feature = "vit")]
pub use vit::VitClassifier;

/// Object detector returning labelled boxes for an image file
pub trait ObjectDetector: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    fn detect(&self, image: &Path) -> Result<Vec<Detection>>;
}

/// Locates frontal faces in an image file
pub trait FaceLocator: Send + Sync {
    fn locate(&self, image: &Path) -> Result<Vec<Rect>>;
}

/// Optional content classifier returning label/confidence pairs.
///
/// Callers must check `is_available` before `classify`; an unavailable
/// classifier is skipped, not treated as an error.
pub trait ImageClassifier: Send + Sync {
    fn name(&self) -> &str;
    fn is_available(&self) -> bool;
    fn classify(&self, image: &Path) -> Result<Vec<Classification>>;
}

/// Speech-to-text engine
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio: &Path) -> Result<Transcript>;
}
