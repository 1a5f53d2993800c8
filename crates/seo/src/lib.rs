// SEO auditing: HTML signal extraction and the site checklist

pub mod checklist;
pub mod checks;
pub mod signals;

pub use checklist::{FetchError, HttpFetcher, PageFetcher, SeoEvaluator};
pub use checks::{CHECK_LABELS, evaluate_checks};
pub use signals::{MetaKey, PageSignals};
