//! Keyword-based category inference for events that arrive without one.
//!
//! Each category owns a closed keyword list. Groups are tried in
//! [`KEYWORD_GROUPS`] order and the first group with any hit wins, so a
//! text mentioning both 战争 and 皇帝 is 军事, never 政治.

use regex::Regex;
use timeline_types::Category;

/// Priority-ordered keyword groups. Anything unmatched is 其他.
pub const KEYWORD_GROUPS: &[(Category, &[&str])] = &[
    (
        Category::Military,
        &["战争", "战役", "起义", "军队", "将军", "攻打", "征服", "入侵"],
    ),
    (
        Category::Political,
        &["皇帝", "政权", "改革", "制度", "法律", "朝廷", "官员", "宰相"],
    ),
    (
        Category::Cultural,
        &["文学", "艺术", "哲学", "思想", "宗教", "教育", "文化", "诗人"],
    ),
    (
        Category::Economic,
        &["经济", "商业", "贸易", "农业", "税收", "货币", "财政"],
    ),
    (
        Category::Scientific,
        &["发明", "科技", "技术", "天文", "医学", "工程", "建筑"],
    ),
];

/// Build a regex alternation over `keywords`, longest first.
pub fn build_keyword_regex(keywords: &[&str]) -> String {
    let mut all: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
    all.sort_by_key(|k| std::cmp::Reverse(k.chars().count()));
    all.dedup();
    format!("(?:{})", all.join("|"))
}

pub struct CategoryClassifier {
    groups: Vec<(Category, Regex)>,
}

impl CategoryClassifier {
    pub fn new() -> Self {
        let groups = KEYWORD_GROUPS
            .iter()
            .map(|(category, keywords)| {
                let re = Regex::new(&build_keyword_regex(keywords)).expect("keyword regex");
                (*category, re)
            })
            .collect();
        CategoryClassifier { groups }
    }

    /// Classify an event from its title and description.
    pub fn infer(&self, title: &str, description: &str) -> Category {
        let text = format!("{title} {description}").to_lowercase();
        self.groups
            .iter()
            .find(|(_, re)| re.is_match(&text))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new()
    }
}
