use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::catalog::Catalog;

lazy_static! {
    // ASCII letters plus the accented Vietnamese lowercase letters; everything else is stripped.
    static ref DISALLOWED: Regex = Regex::new(
        "[^a-zA-Záàảãạâấầẩẫậăắằẳẵặđéèẻẽẹêếềểễệíìỉĩịóòỏõọôốồổỗộơớờởỡợúùủũụưứừửữựýỳỷỹỵ]"
    )
    .expect("valid regex");
}

/// Lowercase one text field (after NFC composition) and split it on runs of whitespace.
fn split_field(text: &str) -> Vec<String> {
    let normalized = text.nfc().collect::<String>().to_lowercase();
    normalized.split_whitespace().map(str::to_string).collect()
}

/// Remove every character outside the allowed alphabet. May return an empty string.
pub fn strip_token(token: &str) -> String {
    DISALLOWED.replace_all(token, "").into_owned()
}

/// Keyword list for one product: name tokens, then description tokens, then category tokens.
/// Tokens that strip down to nothing are kept as empty strings; they still count towards
/// the keyword length used for term frequency.
///
/// Fields are split with `split_whitespace`, so an empty field or leading/trailing whitespace
/// produces no tokens at all. A regex split on `\s+` would yield `""` tokens there and a
/// larger TF denominator. Raw TF values can therefore differ from such a splitter, but the
/// factor is the same for every term of a product, so cosine rankings are unchanged.
pub fn keywords(name: &str, description: &str, category: &str) -> Vec<String> {
    [name, description, category]
        .iter()
        .flat_map(|field| split_field(field))
        .map(|token| strip_token(&token))
        .collect()
}

/// Populate `keywords` on every product of the catalog.
pub fn build_keywords(catalog: &mut Catalog) {
    for category in catalog.categories.iter_mut() {
        let category_name = category.name.clone();
        for product in category.products.iter_mut() {
            product.keywords = keywords(&product.name, &product.description, &category_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_keywords() {
        let k = keywords("Red Shoes", "size 42!", "Footwear");
        assert_eq!(k, vec!["red", "shoes", "size", "", "footwear"]);
    }

    #[test]
    fn padding_and_empty_fields_add_no_tokens() {
        assert_eq!(keywords("  Red \t Shoes  ", "", ""), vec!["red", "shoes"]);
        assert!(keywords("", " ", "").is_empty());
    }

    #[test]
    fn keeps_vietnamese_letters() {
        let k = keywords("Áo Sơ Mi", "", "Thời trang");
        assert_eq!(k, vec!["áo", "sơ", "mi", "thời", "trang"]);
    }
}
