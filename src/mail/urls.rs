use once_cell::sync::Lazy;
use regex::Regex;

/// Scheme-qualified URLs only: `scheme://rest` or `mailto:rest`. Bare domains
/// such as `example.com` are not matched.
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:[a-z][a-z0-9+.\-]*://|mailto:)[^\s<>"'`{}|\\^]+"#)
        .expect("url regex is valid")
});

const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?'];

/// All URLs in `text`, left to right, non-overlapping.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| trim_trailing(m.as_str()))
        .filter(|url| has_content_after_scheme(url))
        .map(str::to_string)
        .collect()
}

/// Drops sentence punctuation and closing brackets that have no opening
/// partner inside the match.
fn trim_trailing(mut url: &str) -> &str {
    loop {
        let before = url.len();
        url = url.trim_end_matches(TRAILING_PUNCT);
        for (open, close) in [('(', ')'), ('[', ']')] {
            if url.ends_with(close) && url.matches(close).count() > url.matches(open).count() {
                url = &url[..url.len() - 1];
            }
        }
        if url.len() == before {
            return url;
        }
    }
}

fn has_content_after_scheme(url: &str) -> bool {
    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url.split_once(':').map(|(_, r)| r).unwrap_or_default(),
    };
    !rest.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_url_in_sentence() {
        assert_eq!(
            extract_urls("See http://example.com/pasta for details"),
            vec!["http://example.com/pasta"]
        );
    }

    #[test]
    fn keeps_order_of_appearance() {
        let text = "first https://a.example/x then ftp://files.example/y and mailto:me@example.com";
        assert_eq!(
            extract_urls(text),
            vec![
                "https://a.example/x",
                "ftp://files.example/y",
                "mailto:me@example.com"
            ]
        );
    }

    #[test]
    fn bare_domains_are_ignored() {
        assert!(extract_urls("visit example.com or www.example.org").is_empty());
        assert!(extract_urls("").is_empty());
    }

    #[test]
    fn html_attributes_are_delimited() {
        let html = r#"<a href="https://example.com/recipe?id=4&amp;x=1">Go</a>"#;
        assert_eq!(
            extract_urls(html),
            vec!["https://example.com/recipe?id=4&amp;x=1"]
        );
    }

    #[test]
    fn trailing_punctuation_is_trimmed() {
        assert_eq!(
            extract_urls("Go to https://example.com/a. Or (https://example.com/b)!"),
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn balanced_parens_are_kept() {
        assert_eq!(
            extract_urls("https://en.wikipedia.org/wiki/Pasta_(dish)"),
            vec!["https://en.wikipedia.org/wiki/Pasta_(dish)"]
        );
    }

    #[test]
    fn scheme_alone_is_not_a_url() {
        assert!(extract_urls("http:// nothing").is_empty());
    }

    #[test]
    fn rescanning_output_is_stable() {
        let text = "a http://x.example/1, b <https://y.example/2?q=(1)> c (http://z.example/3).";
        let urls = extract_urls(text);
        assert_eq!(urls.len(), 3);
        assert_eq!(extract_urls(&urls.join(" ")), urls);
    }
}
