//! Heuristic decomposition of free-text employee names into first, middle
//! and last parts.

/// Honorific prefixes that bind to the following token as one first name.
const HONORIFIC_PREFIXES: [&str; 4] = ["md", "mohd", "md.", "mohd."];

/// The split parts of a full name. Any part may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitName {
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
}

/// Split a free-text full name into (first, middle, last).
///
/// Token rules:
/// - 0 tokens → nothing
/// - 1 token → first
/// - 2 tokens → first + last
/// - 3 tokens → first + middle + last
/// - 4+ tokens → last token is the last name; if the leading token is an
///   honorific ("Md", "Mohd", optional trailing period, any case) the first
///   name is the first two tokens joined, e.g. "Md ghulam Abdul sattar
///   Mustafa" → ("Md Ghulam", "Abdul Sattar", "Mustafa"). Otherwise the
///   first token stands alone and the interior tokens form the middle name.
///
/// Every emitted part is title-cased. Pure and total.
pub fn split_full_name(raw: &str) -> SplitName {
    let tokens: Vec<&str> = raw.split_whitespace().collect();

    let (first, middle, last) = match tokens.len() {
        0 => (None, None, None),
        1 => (Some(tokens[0].to_string()), None, None),
        2 => (Some(tokens[0].to_string()), None, Some(tokens[1].to_string())),
        3 => (
            Some(tokens[0].to_string()),
            Some(tokens[1].to_string()),
            Some(tokens[2].to_string()),
        ),
        n => {
            let last = tokens[n - 1].to_string();
            let leading = tokens[0].to_lowercase();
            let (first, interior) = if HONORIFIC_PREFIXES.contains(&leading.as_str()) {
                (tokens[0..2].join(" "), &tokens[2..n - 1])
            } else {
                (tokens[0].to_string(), &tokens[1..n - 1])
            };
            let middle = if interior.is_empty() {
                None
            } else {
                Some(interior.join(" "))
            };
            (Some(first), middle, Some(last))
        }
    };

    SplitName {
        first: first.map(|s| title_case(&s)),
        middle: middle.map(|s| title_case(&s)),
        last: last.map(|s| title_case(&s)),
    }
}

/// Capitalize the first letter of each whitespace-separated word and
/// lower-case the rest.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(raw: &str) -> (Option<String>, Option<String>, Option<String>) {
        let split = split_full_name(raw);
        (split.first, split.middle, split.last)
    }

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(parts(""), (None, None, None));
        assert_eq!(parts("   "), (None, None, None));
    }

    #[test]
    fn test_single_token() {
        assert_eq!(parts("RAHIM"), (s("Rahim"), None, None));
    }

    #[test]
    fn test_two_tokens() {
        assert_eq!(parts("ali khan"), (s("Ali"), None, s("Khan")));
    }

    #[test]
    fn test_three_tokens_title_cased() {
        assert_eq!(parts("md ali Khan"), (s("Md"), s("Ali"), s("Khan")));
    }

    #[test]
    fn test_honorific_binds_second_token() {
        assert_eq!(
            parts("Md ghulam Abdul sattar Mustafa"),
            (s("Md Ghulam"), s("Abdul Sattar"), s("Mustafa"))
        );
    }

    #[test]
    fn test_honorific_with_trailing_period() {
        assert_eq!(
            parts("MD. Ghulam Abdul Mustafa"),
            (s("Md. Ghulam"), s("Abdul"), s("Mustafa"))
        );
    }

    #[test]
    fn test_honorific_exactly_four_tokens_no_middle() {
        assert_eq!(parts("mohd Ghulam x Mustafa"), (s("Mohd Ghulam"), s("X"), s("Mustafa")));
        // First two join, single interior token remains the middle name.
        assert_eq!(parts("mohd Ghulam Mustafa Ali"), (s("Mohd Ghulam"), s("Mustafa"), s("Ali")));
    }

    #[test]
    fn test_four_tokens_without_honorific() {
        assert_eq!(
            parts("Anil kumar sharma gupta"),
            (s("Anil"), s("Kumar Sharma"), s("Gupta"))
        );
    }

    #[test]
    fn test_honorific_three_tokens_not_special() {
        // The two-token first name needs at least 4 tokens; 3-token names
        // split positionally.
        assert_eq!(parts("md ghulam mustafa"), (s("Md"), s("Ghulam"), s("Mustafa")));
    }

    #[test]
    fn test_extra_internal_whitespace() {
        assert_eq!(parts("  ali   khan  "), (s("Ali"), None, s("Khan")));
    }
}
