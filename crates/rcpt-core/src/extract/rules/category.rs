//! Keyword-based expense categorization.

use crate::models::receipt::Category;

/// Keyword groups tested in order against the lower-cased text.
const CATEGORY_KEYWORDS: [(Category, &[&str]); 5] = [
    (Category::Groceries, &["grocer", "supermarket", "food"]),
    (Category::Utilities, &["electric", "power", "utility"]),
    (Category::InternetTelecom, &["internet", "broadband", "telecom"]),
    (Category::Dining, &["restaurant", "cafe", "dine"]),
    (Category::Health, &["pharmacy", "medicine", "health"]),
];

/// Pick a category for the document text, or [`Category::Miscellaneous`].
pub fn categorize(text: &str) -> Category {
    let lower = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Miscellaneous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_groups() {
        assert_eq!(categorize("FRESH FOODS MARKET"), Category::Groceries);
        assert_eq!(categorize("City Electric Co."), Category::Utilities);
        assert_eq!(categorize("Fiber Broadband bill"), Category::InternetTelecom);
        assert_eq!(categorize("Luigi's Restaurant"), Category::Dining);
        assert_eq!(categorize("Corner Pharmacy"), Category::Health);
        assert_eq!(categorize("Hardware depot"), Category::Miscellaneous);
    }

    #[test]
    fn test_first_group_wins() {
        // Both a grocery and a dining keyword; groceries are tested first.
        assert_eq!(categorize("Supermarket cafe corner"), Category::Groceries);
        // Utilities come before internet.
        assert_eq!(categorize("Power & Internet bundle"), Category::Utilities);
    }
}
