//! External collaborators: frame capture and scene description.
//!
//! Both are consumed through traits. Export formatting and naming belong to
//! the capture target; the describer is a one-shot request with no retry.

/// An opaque snapshot of the render surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub media_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("no render surface to capture")]
    Unavailable,
    #[error("capture failed: {0}")]
    Failed(String),
}

/// Something that can hand over the current rendered frame.
pub trait CaptureTarget {
    fn snapshot(&mut self) -> Result<CapturedFrame, CaptureError>;
}

/// A target without a render surface, for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl CaptureTarget for NoCapture {
    fn snapshot(&mut self) -> Result<CapturedFrame, CaptureError> {
        Err(CaptureError::Unavailable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescribeError {
    #[error("credential missing: set {env}")]
    MissingCredential { env: String },
    #[error("description request failed: {0}")]
    Request(String),
}

/// A service that describes a captured scene in free text.
pub trait SceneDescriber {
    fn describe(&self, api_key: &str, image: &CapturedFrame) -> Result<String, DescribeError>;
}

/// Where the describer's API key comes from.
pub trait Credential {
    fn resolve(&self) -> Result<String, DescribeError>;
}

const NO_ANALYSIS: &str = "No analysis could be generated.";
pub(crate) const ANALYSIS_FAILED: &str = "Failed to analyze the scene. Please try again.";

/// Ask for a description, turning every failure into a fixed message. The
/// describer is not called without a credential.
pub fn describe_scene(
    describer: &dyn SceneDescriber,
    credential: &dyn Credential,
    image: &CapturedFrame,
) -> String {
    let outcome = credential
        .resolve()
        .and_then(|key| describer.describe(&key, image));
    match outcome {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => NO_ANALYSIS.to_string(),
        Err(DescribeError::MissingCredential { env }) => {
            tracing::error!(%env, "scene description credential is missing");
            format!("API Key is missing. Please configure {env}.")
        }
        Err(error) => {
            tracing::warn!(%error, "scene description failed");
            ANALYSIS_FAILED.to_string()
        }
    }
}

/// Credential read from an environment variable at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvCredential {
    pub var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Credential for EnvCredential {
    fn resolve(&self) -> Result<String, DescribeError> {
        match std::env::var(&self.var) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(DescribeError::MissingCredential {
                env: self.var.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<String, DescribeError>);

    impl SceneDescriber for Fixed {
        fn describe(&self, api_key: &str, _image: &CapturedFrame) -> Result<String, DescribeError> {
            assert_eq!(api_key, "test-key");
            self.0.clone()
        }
    }

    struct Key;

    impl Credential for Key {
        fn resolve(&self) -> Result<String, DescribeError> {
            Ok("test-key".into())
        }
    }

    const UNSET: &str = "ARPLACE_TEST_CREDENTIAL_THAT_IS_NEVER_SET";

    fn frame() -> CapturedFrame {
        CapturedFrame {
            media_type: "image/png".into(),
            data: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn passes_through_text() {
        let d = Fixed(Ok("Two cubes on a wooden floor.".into()));
        assert_eq!(describe_scene(&d, &Key, &frame()), "Two cubes on a wooden floor.");
    }

    #[test]
    fn empty_answer_gets_fallback() {
        let d = Fixed(Ok("   ".into()));
        assert_eq!(describe_scene(&d, &Key, &frame()), NO_ANALYSIS);
    }

    #[test]
    fn missing_credential_names_the_variable() {
        let d = Fixed(Ok("never asked".into()));
        assert_eq!(
            describe_scene(&d, &EnvCredential::new(UNSET), &frame()),
            format!("API Key is missing. Please configure {UNSET}.")
        );
    }

    #[test]
    fn request_failure_is_fixed_message() {
        let d = Fixed(Err(DescribeError::Request("timeout".into())));
        assert_eq!(describe_scene(&d, &Key, &frame()), ANALYSIS_FAILED);
    }

    #[test]
    fn headless_capture_is_unavailable() {
        assert_eq!(NoCapture.snapshot(), Err(CaptureError::Unavailable));
    }

    #[test]
    fn unset_env_credential_is_missing() {
        assert_eq!(
            EnvCredential::new(UNSET).resolve(),
            Err(DescribeError::MissingCredential { env: UNSET.into() })
        );
    }
}
