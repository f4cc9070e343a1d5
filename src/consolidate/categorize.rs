// Fixed-taxonomy classification. A plain ordered rule table, first match
// wins; every section lands in exactly one category.

use std::collections::HashMap;

use super::Section;

/// The fixed set of output buckets. `ALL` is the declaration order used for
/// rendering; rule evaluation order below differs and is equally fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    CorePrinciples,
    Frameworks,
    Methodologies,
    Dialogues,
    GuardianArchitecture,
    ProcessingProtocols,
    TeachingContent,
    Configuration,
    Miscellaneous,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::CorePrinciples,
        Category::Frameworks,
        Category::Methodologies,
        Category::Dialogues,
        Category::GuardianArchitecture,
        Category::ProcessingProtocols,
        Category::TeachingContent,
        Category::Configuration,
        Category::Miscellaneous,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::CorePrinciples => "Core Principles",
            Category::Frameworks => "Frameworks",
            Category::Methodologies => "Methodologies",
            Category::Dialogues => "Dialogues",
            Category::GuardianArchitecture => "Guardian Architecture",
            Category::ProcessingProtocols => "Processing Protocols",
            Category::TeachingContent => "Teaching Content",
            Category::Configuration => "Configuration",
            Category::Miscellaneous => "Miscellaneous",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleScope {
    Title,
    Body,
}

struct CategoryRule {
    scope: RuleScope,
    keywords: &'static [&'static str],
    category: Category,
}

/// Evaluation order. Keyword tests are case-folded substring containment,
/// so e.g. a title holding "processing" already satisfies the earlier
/// "process" keyword and lands in Methodologies.
const RULES: &[CategoryRule] = &[
    CategoryRule {
        scope: RuleScope::Title,
        keywords: &["principle", "core", "foundation", "immutable"],
        category: Category::CorePrinciples,
    },
    CategoryRule {
        scope: RuleScope::Title,
        keywords: &["framework", "structure", "architecture"],
        category: Category::Frameworks,
    },
    CategoryRule {
        scope: RuleScope::Title,
        keywords: &["methodology", "protocol", "process", "imm", "sarc"],
        category: Category::Methodologies,
    },
    CategoryRule {
        scope: RuleScope::Title,
        keywords: &["dialogue", "teacher", "student", "conversation"],
        category: Category::Dialogues,
    },
    CategoryRule {
        scope: RuleScope::Title,
        keywords: &["guardian", "mirego", "sphinx", "daemon"],
        category: Category::GuardianArchitecture,
    },
    CategoryRule {
        scope: RuleScope::Title,
        keywords: &["processing", "engine", "validation"],
        category: Category::ProcessingProtocols,
    },
    CategoryRule {
        scope: RuleScope::Title,
        keywords: &["config", "setting", "parameter"],
        category: Category::Configuration,
    },
    CategoryRule {
        scope: RuleScope::Body,
        keywords: &["teach", "learn", "understanding", "wisdom"],
        category: Category::TeachingContent,
    },
];

/// Assign the section's category. Total: falls through to Miscellaneous.
pub fn categorize(section: &Section) -> Category {
    let title = section.title.to_lowercase();
    let body = section.body.to_lowercase();

    for rule in RULES {
        let haystack = match rule.scope {
            RuleScope::Title => &title,
            RuleScope::Body => &body,
        };
        if rule.keywords.iter().any(|kw| haystack.contains(kw)) {
            return rule.category;
        }
    }

    Category::Miscellaneous
}

/// Group sections into declaration-order buckets, preserving arrival order
/// within each bucket. Empty categories are omitted.
pub fn group_by_category(sections: Vec<Section>) -> Vec<(Category, Vec<Section>)> {
    let mut grouped: HashMap<Category, Vec<Section>> = HashMap::new();
    for section in sections {
        grouped.entry(categorize(&section)).or_default().push(section);
    }

    Category::ALL
        .iter()
        .filter_map(|category| grouped.remove(category).map(|sections| (*category, sections)))
        .collect()
}
