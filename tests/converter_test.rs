//! Integration tests for the converter adapter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docxmath::convert::{
    ConversionResult, FormulaConverter, NativeTransform, OmmlTransform, TransformError,
    XsltTransform,
};
use docxmath::{Engine, FixOptions};

/// Mock transform recording the MathML it receives.
struct MockTransform {
    calls: Arc<AtomicUsize>,
    name: &'static str,
}

impl MockTransform {
    fn new(name: &'static str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                name,
            },
            calls,
        )
    }
}

impl OmmlTransform for MockTransform {
    fn name(&self) -> &str {
        self.name
    }

    fn transform(&self, mathml: &str) -> Result<String, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !mathml.starts_with("<math") {
            return Err(TransformError::Failed("not MathML".to_string()));
        }
        Ok("<m:oMath xmlns:m=\"http://schemas.openxmlformats.org/officeDocument/2006/math\"/>".to_string())
    }
}

#[test]
fn test_mock_receives_mathml() {
    let (mock, calls) = MockTransform::new("mock");
    let converter = FormulaConverter::new(mock);

    assert!(converter.convert("a^2+b^2=c^2").is_markup());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(converter.transform().name(), "mock");
}

#[test]
fn test_blank_formula_never_reaches_transform() {
    let (mock, calls) = MockTransform::new("mock");
    let converter = FormulaConverter::new(mock);

    assert!(matches!(converter.convert(""), ConversionResult::Failed(_)));
    assert!(matches!(converter.convert(" \t"), ConversionResult::Failed(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_missing_stylesheet_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let transform = XsltTransform::new(dir.path().join("MML2OMML.XSL"));
    assert!(!transform.is_available());

    let converter = FormulaConverter::new(transform);
    assert_eq!(converter.convert("E=mc^2"), ConversionResult::Unavailable);
}

#[test]
fn test_missing_processor_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("MML2OMML.XSL");
    std::fs::write(&sheet, "<xsl:stylesheet/>").unwrap();

    let transform = XsltTransform::new(&sheet).with_processor("docxmath-no-such-xsltproc");
    assert!(transform.is_available());

    let converter = FormulaConverter::new(transform);
    assert_eq!(converter.convert("x"), ConversionResult::Unavailable);
}

#[test]
fn test_options_select_transform() {
    assert_eq!(FixOptions::new().transform().name(), "xslt");
    assert_eq!(
        FixOptions::new().with_engine(Engine::Native).transform().name(),
        "native"
    );
    assert_eq!(
        FormulaConverter::new(NativeTransform::new()).transform().name(),
        "native"
    );
}
