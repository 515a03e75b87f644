//! Synthesis Engine
//!
//! Turns stored metadata into annotation instances. A
//! [`SynthesizedAnnotation`] carries every attribute of its contract with
//! defaults filled in and nested annotations completed. Types known at
//! compile time can implement [`AnnotationType`] and be produced with
//! [`SynthesisEngine::synthesize_as`].

mod engine;
mod instance;

pub use engine::SynthesisEngine;
pub use instance::SynthesizedAnnotation;

use crate::error::EngineResult;

/// A Rust type mirroring one annotation type
///
/// ```ignore
/// struct Timeout { seconds: f64 }
///
/// impl AnnotationType for Timeout {
///     const NAME: &'static str = "com.acme.Timeout";
///
///     fn from_annotation(annotation: &SynthesizedAnnotation) -> EngineResult<Self> {
///         Ok(Timeout { seconds: annotation.double("seconds").unwrap_or_default() })
///     }
/// }
/// ```
pub trait AnnotationType: Sized {
    /// Fully-qualified annotation name
    const NAME: &'static str;

    /// Convert a synthesized instance
    fn from_annotation(annotation: &SynthesizedAnnotation) -> EngineResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::store::{ElementMetadata, MetadataBuilder};
    use annometa_types::{
        AnnotationContract, AttributeSpec, AttributeType, AttributeValue, ContractRegistry,
        EnumType,
    };
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    enum Mode {
        Fast,
        Slow,
    }

    #[derive(Debug, PartialEq)]
    struct Retry {
        attempts: i32,
        mode: Mode,
    }

    impl AnnotationType for Retry {
        const NAME: &'static str = "com.acme.Retry";

        fn from_annotation(annotation: &SynthesizedAnnotation) -> EngineResult<Self> {
            let mode = match annotation.enum_constant("mode") {
                Some("FAST") => Mode::Fast,
                Some("SLOW") => Mode::Slow,
                other => {
                    return Err(EngineError::Synthesis {
                        annotation: Self::NAME.to_string(),
                        attribute: "mode".to_string(),
                        reason: format!("unexpected constant {:?}", other),
                    })
                }
            };
            Ok(Retry {
                attempts: annotation.int("attempts").unwrap_or_default(),
                mode,
            })
        }
    }

    fn registry() -> Arc<ContractRegistry> {
        let mode = EnumType::new("com.acme.Mode", ["FAST", "SLOW"]);
        let slow = AttributeValue::enum_constant("com.acme.Mode", "SLOW");
        Arc::new(
            ContractRegistry::new()
                .with(
                    AnnotationContract::new(Retry::NAME)
                        .attribute(
                            AttributeSpec::new("attempts", AttributeType::Int).with_default(3),
                        )
                        .attribute(
                            AttributeSpec::new("mode", AttributeType::Enum(mode))
                                .with_default(slow),
                        ),
                )
                .unwrap(),
        )
    }

    #[test]
    fn test_synthesize_as() {
        let metadata = MetadataBuilder::new()
            .declare_with(Retry::NAME, [("mode", "FAST")])
            .build(registry())
            .unwrap();
        let retry = SynthesisEngine::default().synthesize_as::<Retry>(&metadata).unwrap();
        assert_eq!(
            retry,
            Some(Retry {
                attempts: 3,
                mode: Mode::Fast
            })
        );
    }

    #[test]
    fn test_synthesize_as_absent() {
        let engine = SynthesisEngine::default();
        assert_eq!(engine.synthesize_as::<Retry>(ElementMetadata::empty()).unwrap(), None);
    }
}
