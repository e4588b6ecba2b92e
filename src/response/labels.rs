//! Section label translation.

use crate::i18n::Catalog;

/// Recognized section labels (lowercase) and their catalog keys.
const SECTION_LABELS: &[(&str, &str)] = &[
    ("risk", "response.risk"),
    ("risks", "response.risks"),
    ("disclaimer", "response.disclaimer"),
    ("warning", "response.warning"),
    ("warnings", "response.warnings"),
    ("legal analysis", "response.legal_analysis"),
    ("case summary", "response.case_summary"),
    ("document summary", "response.document_summary"),
    ("recommendation", "response.recommendation"),
    ("recommendations", "response.recommendations"),
    ("next steps", "response.next_steps"),
    ("legal implications", "response.legal_implications"),
    ("compliance", "response.compliance"),
    ("jurisdiction", "response.jurisdiction"),
    ("relevant laws", "response.relevant_laws"),
    ("key points", "response.key_points"),
    ("analysis", "response.analysis"),
    ("summary", "response.summary"),
    ("conclusion", "response.conclusion"),
    ("important note", "response.important_note"),
    ("legal advice", "response.legal_advice"),
    ("court decisions", "response.court_decisions"),
    ("statute", "response.statute"),
    ("statutes", "response.statutes"),
    ("recent developments", "response.recent_developments"),
    ("action required", "response.action_required"),
    ("tenant rights", "response.tenant_rights"),
    ("rental laws", "response.rental_laws"),
    ("employment law", "response.employment_law"),
    ("contract terms", "response.contract_terms"),
    ("legal rights", "response.legal_rights"),
    ("category", "response.category"),
    ("key findings", "response.key_findings"),
    ("risk assessment", "response.risk_assessment"),
    ("level", "response.level"),
    ("factors", "response.factors"),
    ("compliance issues", "response.compliance_issues"),
];

/// Catalog key for a recognized section label.
pub fn section_key(raw_label: &str) -> Option<&'static str> {
    let lower = raw_label.trim().to_lowercase();
    SECTION_LABELS
        .iter()
        .find(|(label, _)| *label == lower)
        .map(|(_, key)| *key)
}

/// Maps recognized section labels to their localized display text.
///
/// Unknown labels, and known labels the catalog has no entry for, come back
/// exactly as given.
#[derive(Debug, Clone, Copy)]
pub struct LabelTranslator<'a> {
    catalog: &'a Catalog,
}

impl<'a> LabelTranslator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Localized label, only when the label is recognized and translated.
    pub fn lookup(&self, raw_label: &str) -> Option<String> {
        section_key(raw_label)
            .and_then(|key| self.catalog.get(key))
            .map(str::to_string)
    }

    pub fn translate(&self, raw_label: &str) -> String {
        self.lookup(raw_label)
            .unwrap_or_else(|| raw_label.to_string())
    }
}
