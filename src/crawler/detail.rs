//! Job detail page extraction
//!
//! Each field has an ordered list of selector candidates because the site
//! serves several layouts of the same page. The first candidate that matches
//! an element with non-empty text wins. Experience and degree additionally
//! fall back to a keyword scan over the header tags when no candidate yields
//! text.
//!
//! A page without a job name is rejected; every other field is optional.

use crate::crawler::parser::{compile_selector, element_text};
use crate::storage::JobRecord;
use crate::TrawlError;
use scraper::{Html, Selector};

const NAME_SELECTORS: &[&str] = &[
    "div.name h1",
    ".job-name h1",
    "h1.job-name",
    ".job-detail-header h1",
];

const SALARY_SELECTORS: &[&str] = &[
    "div.name span.salary",
    ".job-primary span.salary",
    "span.salary-text",
    ".salary",
];

const ADDRESS_SELECTORS: &[&str] = &[
    "div.location-address",
    ".location-address",
    ".job-location",
    "[class*=location]",
];

const CONTENT_SELECTORS: &[&str] = &[
    "div.job-sec-text",
    ".job-sec-text",
    ".job-detail-content",
    ".job-detail-text",
];

const EXPERIENCE_SELECTORS: &[&str] = &[
    "p.text-experience",
    ".text-experience",
    "[class*=experience]",
    ".job-require span",
];

const DEGREE_SELECTORS: &[&str] = &[
    "p.text-degree",
    ".text-degree",
    "[class*=degree]",
    ".job-require span",
];

const HR_ACTIVE_SELECTORS: &[&str] = &[
    "h2.name span",
    ".hr-info span",
    ".hr-active-time",
    "[class*=active]",
];

const COMPANY_SELECTORS: &[&str] = &[
    "a.company-name",
    ".company-name",
    ".company-info a",
    "[class*=company] a",
];

/// Header tags scanned when the experience or degree candidates find nothing
const TAG_SCAN_SELECTOR: &str = ".job-primary-info span, .job-detail-header .text";

const EXPERIENCE_KEYWORDS: &[&str] = &["经验", "年"];

const DEGREE_KEYWORDS: &[&str] = &["学历", "大专", "本科", "硕士"];

/// A job record field filled from the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobField {
    Name,
    Salary,
    Address,
    Content,
    Experience,
    Degree,
    HrActiveTime,
    Company,
}

impl JobField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Salary => "salary",
            Self::Address => "address",
            Self::Content => "content",
            Self::Experience => "experience",
            Self::Degree => "degree",
            Self::HrActiveTime => "hr_active_time",
            Self::Company => "company",
        }
    }

    fn slot<'a>(&self, record: &'a mut JobRecord) -> &'a mut Option<String> {
        match self {
            Self::Name => &mut record.work_name,
            Self::Salary => &mut record.salary,
            Self::Address => &mut record.address,
            Self::Content => &mut record.content,
            Self::Experience => &mut record.years_experience,
            Self::Degree => &mut record.degree,
            Self::HrActiveTime => &mut record.hr_active_time,
            Self::Company => &mut record.company_name,
        }
    }
}

/// Result of extracting one detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    /// A record with a non-empty name
    Accepted(JobRecord),

    /// The page produced no job name and must not be persisted
    Rejected { url: String, reason: String },
}

struct FieldRule {
    field: JobField,
    candidates: Vec<Selector>,
    keywords: Option<&'static [&'static str]>,
}

/// Turns rendered detail pages into job records
pub struct DetailExtractor {
    rules: Vec<FieldRule>,
    tag_scan: Selector,
}

impl DetailExtractor {
    /// Compiles every selector chain
    pub fn new() -> Result<Self, TrawlError> {
        let table: [(JobField, &[&str], Option<&'static [&'static str]>); 8] = [
            (JobField::Name, NAME_SELECTORS, None),
            (JobField::Salary, SALARY_SELECTORS, None),
            (JobField::Address, ADDRESS_SELECTORS, None),
            (JobField::Content, CONTENT_SELECTORS, None),
            (
                JobField::Experience,
                EXPERIENCE_SELECTORS,
                Some(EXPERIENCE_KEYWORDS),
            ),
            (JobField::Degree, DEGREE_SELECTORS, Some(DEGREE_KEYWORDS)),
            (JobField::HrActiveTime, HR_ACTIVE_SELECTORS, None),
            (JobField::Company, COMPANY_SELECTORS, None),
        ];

        let mut rules = Vec::with_capacity(table.len());
        for (field, patterns, keywords) in table {
            let candidates = patterns
                .iter()
                .map(|pattern| compile_selector(pattern))
                .collect::<Result<Vec<_>, _>>()?;
            rules.push(FieldRule {
                field,
                candidates,
                keywords,
            });
        }

        Ok(Self {
            rules,
            tag_scan: compile_selector(TAG_SCAN_SELECTOR)?,
        })
    }

    /// Extracts a job record from a rendered detail page
    pub fn extract(&self, html: &str, url: &str) -> DetailOutcome {
        let document = Html::parse_document(html);
        let mut record = JobRecord::new(url);
        let mut missing = Vec::new();

        for rule in &self.rules {
            let value = first_text(&document, &rule.candidates).or_else(|| {
                rule.keywords
                    .and_then(|keywords| self.scan_tags(&document, keywords))
            });

            if value.is_none() {
                missing.push(rule.field.as_str());
            }
            *rule.field.slot(&mut record) = value;
        }

        if !missing.is_empty() {
            tracing::debug!("No value for [{}] on {}", missing.join(", "), url);
        }

        if !record.has_name() {
            return DetailOutcome::Rejected {
                url: url.to_string(),
                reason: "no job name found".to_string(),
            };
        }

        DetailOutcome::Accepted(record)
    }

    fn scan_tags(&self, document: &Html, keywords: &[&str]) -> Option<String> {
        document
            .select(&self.tag_scan)
            .map(|element| element_text(&element))
            .find(|text| keywords.iter().any(|keyword| text.contains(keyword)))
    }
}

/// Returns the text of the first candidate whose first match is non-empty
fn first_text(document: &Html, candidates: &[Selector]) -> Option<String> {
    candidates.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .map(|element| element_text(&element))
            .filter(|text| !text.is_empty())
    })
}
