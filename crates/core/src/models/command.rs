use std::{
    path::{Path, PathBuf},
    process::Command,
};

use serde::de::DeserializeOwned;

use super::{FaceLocator, ImageClassifier, ObjectDetector};
use crate::{
    error::{Result, ScanError},
    types::{Classification, Detection, Rect},
};

/// Run `argv` with `image` appended and parse its stdout as JSON
fn run_json<T: DeserializeOwned>(name: &str, argv: &[String], image: &Path) -> Result<T> {
    let Some((program, args)) = argv.split_first() else {
        return Err(ScanError::ModelUnavailable {
            name: name.to_string(),
        });
    };

    let output = Command::new(program)
        .args(args)
        .arg(image)
        .output()
        .map_err(|e| ScanError::model(name, e))?;

    if !output.status.success() {
        return Err(ScanError::ModelFailed {
            name: name.to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    // tools like YOLO print progress lines before the result, so take the
    // last line that looks like a JSON array
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with('[') && line.ends_with(']'))
        .unwrap_or("[]");

    Ok(serde_json::from_str(payload)?)
}

/// Whether `program` is an existing path or resolves on `PATH`
pub fn program_available(program: &str) -> bool {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file();
    }

    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths).any(|dir: PathBuf| dir.join(program).is_file())
        })
        .unwrap_or(false)
}

/// Object detector backed by an external program printing
/// `[{"label", "confidence", "bbox": {"x1", "y1", "x2", "y2"}}]`
pub struct CommandDetector {
    argv: Vec<String>,
}

impl CommandDetector {
    pub const NAME: &'static str = "object detector";

    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl ObjectDetector for CommandDetector {
    fn is_available(&self) -> bool {
        self.argv
            .first()
            .is_some_and(|program| program_available(program))
    }

    fn detect(&self, image: &Path) -> Result<Vec<Detection>> {
        run_json(Self::NAME, &self.argv, image)
    }
}

/// Face locator backed by an external program printing
/// `[{"x", "y", "width", "height"}]`
pub struct CommandFaceLocator {
    argv: Vec<String>,
}

impl CommandFaceLocator {
    pub const NAME: &'static str = "face locator";

    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl FaceLocator for CommandFaceLocator {
    fn locate(&self, image: &Path) -> Result<Vec<Rect>> {
        run_json(Self::NAME, &self.argv, image)
    }
}

/// Classifier backed by an external program printing
/// `[{"label", "confidence"}]`
pub struct CommandClassifier {
    argv: Vec<String>,
}

impl CommandClassifier {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl ImageClassifier for CommandClassifier {
    fn name(&self) -> &str {
        "command classifier"
    }

    fn is_available(&self) -> bool {
        self.argv
            .first()
            .is_some_and(|program| program_available(program))
    }

    fn classify(&self, image: &Path) -> Result<Vec<Classification>> {
        run_json(self.name(), &self.argv, image)
    }
}
