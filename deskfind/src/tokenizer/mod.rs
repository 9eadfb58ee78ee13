//! Text tokenization for queries and item metadata
//!
//! Pipeline: split on non-word runs (keeping CJK ideographs) → emit each
//! coarse token lowercased → decompose into camel-case, digit and CJK units
//! → lowercase → deduplicate preserving first occurrence.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Separator runs: anything that is neither a word character nor a CJK ideograph
fn split_re() -> &'static Regex {
    static SPLIT_RE: OnceLock<Regex> = OnceLock::new();
    SPLIT_RE.get_or_init(|| {
        Regex::new(r"[^\w\u{4e00}-\u{9fff}]+").expect("separator pattern is valid")
    })
}

/// Decimal digits (Unicode `Nd`), excluding superscripts and numeral letters
fn is_decimal_digit(c: char) -> bool {
    static DIGIT_RE: OnceLock<Regex> = OnceLock::new();
    let re = DIGIT_RE.get_or_init(|| Regex::new(r"^\d$").expect("digit pattern is valid"));
    let mut buf = [0u8; 4];
    re.is_match(c.encode_utf8(&mut buf))
}

/// CJK Unified Ideographs block
#[inline]
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Tokenize text into lowercase terms.
///
/// Every coarse token is emitted whole, followed by its sub-units from
/// [`split_mixed_token`]. Duplicates are dropped, first occurrence wins.
///
/// # Example
///
/// ```
/// use deskfind::tokenizer::tokenize;
///
/// let tokens = tokenize("HTMLParser v2");
/// assert_eq!(tokens, vec!["htmlparser", "html", "parser", "v2", "v", "2"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for raw in split_re().split(text).filter(|t| !t.is_empty()) {
        let units = std::iter::once(raw).chain(split_mixed_token(raw));
        for unit in units {
            let lowered = unit.to_lowercase();
            if seen.insert(lowered.clone()) {
                tokens.push(lowered);
            }
        }
    }

    tokens
}

/// Decompose one coarse token into sub-units, case preserved.
///
/// Units are matched leftmost-first, trying in order:
/// 1. an optional ASCII capital followed by ASCII lowercase letters (`Parser`, `shop`)
/// 2. a run of digits (`05`)
/// 3. a run of ASCII capitals ending before a capital+lowercase pair or at
///    the end of the token (`HTML` in `HTMLParser`, `GL` in `GL`)
/// 4. a single CJK ideograph
///
/// Characters that start none of these are skipped.
pub fn split_mixed_token(token: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = token.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(token.len(), |&(b, _)| b);

    let mut units = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match match_unit(&chars, i) {
            Some(end) => {
                units.push(&token[byte_at(i)..byte_at(end)]);
                i = end;
            }
            None => i += 1,
        }
    }
    units
}

/// Returns the exclusive char index where the unit starting at `start` ends
fn match_unit(chars: &[(usize, char)], start: usize) -> Option<usize> {
    let at = |i: usize| chars.get(i).map(|&(_, c)| c);
    let is_upper = |i: usize| at(i).is_some_and(|c| c.is_ascii_uppercase());
    let is_lower = |i: usize| at(i).is_some_and(|c| c.is_ascii_lowercase());
    let is_digit = |i: usize| at(i).is_some_and(is_decimal_digit);
    let run_end = |from: usize, pred: &dyn Fn(usize) -> bool| {
        let mut j = from;
        while pred(j) {
            j += 1;
        }
        j
    };

    // [A-Z]?[a-z]+
    let word_start = if is_upper(start) { start + 1 } else { start };
    let word_end = run_end(word_start, &is_lower);
    if word_end > word_start {
        return Some(word_end);
    }

    // \d+
    let digit_end = run_end(start, &is_digit);
    if digit_end > start {
        return Some(digit_end);
    }

    // [A-Z]+ followed by [A-Z][a-z] or end of token, backing off greedily
    let upper_end = run_end(start, &is_upper);
    let mut end = upper_end;
    while end > start {
        if end == chars.len() || (is_upper(end) && is_lower(end + 1)) {
            return Some(end);
        }
        end -= 1;
    }

    if at(start).is_some_and(is_cjk) {
        return Some(start + 1);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn token_set(tokens: &[String]) -> BTreeSet<String> {
        tokens.iter().cloned().collect()
    }

    fn retokenize(tokens: &[String]) -> Vec<String> {
        tokenize(&tokens.join(" "))
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n").is_empty());
        assert!(tokenize("--- !!! ...").is_empty());
    }

    #[test]
    fn test_tokenize_file_name() {
        let tokens = tokenize("GL-05_shop_drawing.dwg");
        assert_eq!(
            tokens,
            vec!["gl", "05_shop_drawing", "05", "shop", "drawing", "dwg"]
        );
    }

    #[test]
    fn test_tokenize_camel_case() {
        assert_eq!(
            tokenize("readMe"),
            vec!["readme", "read", "me"]
        );
        assert_eq!(
            tokenize("parseHTTPResponse"),
            vec!["parsehttpresponse", "parse", "http", "response"]
        );
    }

    #[test]
    fn test_digit_runs_are_decimal_only() {
        assert_eq!(split_mixed_token("x²3"), vec!["x", "3"]);
        assert_eq!(split_mixed_token("Ⅻ12"), vec!["12"]);
        assert_eq!(split_mixed_token("v٣٤"), vec!["v", "٣٤"]);
    }

    #[test]
    fn test_tokenize_cjk_characters() {
        let tokens = tokenize("GL-05 預製圖");
        assert_eq!(tokens, vec!["gl", "05", "預製圖", "預", "製", "圖"]);
    }

    #[test]
    fn test_tokenize_mixed_cjk_and_latin() {
        let tokens = tokenize("管線line");
        assert_eq!(tokens, vec!["管線line", "管", "線", "line"]);
    }

    #[test]
    fn test_tokenize_dedups_preserving_order() {
        let tokens = tokenize("Shop shop SHOP");
        assert_eq!(tokens, vec!["shop"]);
    }

    #[test]
    fn test_split_mixed_token_upper_run_needs_boundary() {
        // "GL" is followed by a digit: no capital+lowercase pair and not at end
        assert_eq!(split_mixed_token("GL05"), vec!["05"]);
        assert_eq!(split_mixed_token("GL"), vec!["GL"]);
        assert_eq!(split_mixed_token("ABc"), vec!["A", "Bc"]);
        assert_eq!(split_mixed_token("HTMLParser"), vec!["HTML", "Parser"]);
    }

    #[test]
    fn test_split_mixed_token_skips_underscores() {
        assert_eq!(split_mixed_token("line_no_2"), vec!["line", "no", "2"]);
    }

    #[test]
    fn test_tokenize_idempotent_on_decomposed_input() {
        for text in [
            "HTMLParser GL-05_shop_drawing.dwg",
            "預製配管圖 line number",
            "quarterly_report 2024 final",
        ] {
            let once = tokenize(text);
            assert_eq!(token_set(&retokenize(&once)), token_set(&once), "{}", text);
        }
    }

    #[test]
    fn test_tokenize_reaches_fixpoint_after_second_pass() {
        // Lowercasing erases camel boundaries inside letter+digit tokens, so
        // a second pass may add units; from then on the set is stable.
        for text in ["readMe2024", "GL05 ShopDwg", "x86_64Linux"] {
            let twice = retokenize(&tokenize(text));
            assert_eq!(token_set(&retokenize(&twice)), token_set(&twice), "{}", text);
        }
    }
}
