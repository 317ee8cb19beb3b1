//! Theme tags: primary theme extraction and ESG categorisation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::tone::leading_field;
use crate::error::FieldError;

pub const THEME_DELIMITER: char = ';';
pub const UNKNOWN_THEME: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EsgCategory {
    Environmental,
    Social,
    Governance,
    Economic,
    Technology,
    Political,
}

impl EsgCategory {
    pub const ALL: [EsgCategory; 6] = [
        EsgCategory::Environmental,
        EsgCategory::Social,
        EsgCategory::Governance,
        EsgCategory::Economic,
        EsgCategory::Technology,
        EsgCategory::Political,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EsgCategory::Environmental => "Environmental",
            EsgCategory::Social => "Social",
            EsgCategory::Governance => "Governance",
            EsgCategory::Economic => "Economic",
            EsgCategory::Technology => "Technology",
            EsgCategory::Political => "Political",
        }
    }
}

impl fmt::Display for EsgCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keyword table; a theme belongs to the first category with a keyword it contains.
pub const ESG_KEYWORDS: &[(EsgCategory, &[&str])] = &[
    (
        EsgCategory::Environmental,
        &[
            "WB_1331_HEALTH_TECHNOLOGIES",
            "UNGP_FORESTS_RIVERS_OCEANS",
            "NATURAL_DISASTER",
            "TAX_ETHNICITY_CHINESE",
            "TAX_WORLDLANGUAGES_CHINESE",
        ],
    ),
    (
        EsgCategory::Social,
        &[
            "WB_615_GENDER",
            "WB_924_VOICE_AND_AGENCY",
            "WB_621_HEALTH_NUTRITION_AND_POPULATION",
            "GENERAL_HEALTH",
            "MEDICAL",
            "TAX_DISEASE",
            "WB_926_POLITICAL_PARTICIPATION",
        ],
    ),
    (
        EsgCategory::Governance,
        &[
            "WB_831_GOVERNANCE",
            "WB_832_ANTI_CORRUPTION",
            "WB_2019_ANTI_CORRUPTION_LEGISLATION",
            "WB_2020_BRIBERY_FRAUD_AND_COLLUSION",
            "CORRUPTION",
            "LEGISLATION",
            "EPU_POLICY",
            "WB_845_LEGAL_AND_REGULATORY_FRAMEWORK",
            "WB_696_PUBLIC_SECTOR_MANAGEMENT",
            "WB_969_CAPITAL_MARKETS_LAW_AND_REGULATION",
            "TAX_FNCACT_EXECUTIVES",
        ],
    ),
    (
        EsgCategory::Economic,
        &["ECON_STOCKMARKET", "TAX_ECON_PRICE", "WB_698_TRADE"],
    ),
    (
        EsgCategory::Technology,
        &[
            "WB_678_DIGITAL_GOVERNMENT",
            "WB_694_BROADCAST_AND_MEDIA",
            "WB_133_INFORMATION_AND_COMMUNICATION_TECHNOLOGIES",
            "SOC_EMERGINGTECH",
            "WB_652_ICT_APPLICATIONS",
            "WB_662_SOCIAL_MEDIA",
        ],
    ),
    (
        EsgCategory::Political,
        &[
            "USPEC_POLITICS_GENERAL1",
            "TAX_POLITICAL_PARTY",
            "ELECTION",
            "TAX_FNCACT_PRESIDENT",
        ],
    ),
];

// GKG 2.x appends a character offset to each theme ("ECON_STOCKMARKET,1234").
fn strip_offset(token: &str) -> &str {
    token.split(',').next().unwrap_or_default().trim()
}

/// First theme token of the raw theme field.
pub fn primary_theme(raw: Option<&str>) -> Result<String, FieldError> {
    let first: String = leading_field(raw, THEME_DELIMITER)?;
    let code = strip_offset(&first);
    if code.is_empty() {
        return Err(FieldError::Empty);
    }
    Ok(code.to_string())
}

/// Every non-empty theme token, in field order.
pub fn extract_themes(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(THEME_DELIMITER)
            .map(strip_offset)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub fn esg_category_of(theme: &str) -> Option<EsgCategory> {
    ESG_KEYWORDS
        .iter()
        .find(|(_, kws)| kws.iter().any(|kw| theme.contains(kw)))
        .map(|(cat, _)| *cat)
}

/// Per-category theme counts for one article, every category present.
pub fn categorize_themes<S: AsRef<str>>(themes: &[S]) -> [(EsgCategory, usize); 6] {
    let mut out = EsgCategory::ALL.map(|c| (c, 0usize));
    for t in themes {
        if let Some(cat) = esg_category_of(t.as_ref()) {
            if let Some(slot) = out.iter_mut().find(|(c, _)| *c == cat) {
                slot.1 += 1;
            }
        }
    }
    out
}
