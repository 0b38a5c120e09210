use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("PD numbers start at 1; got 0.")]
    ZeroPdNumber,

    #[error("PD {number} does not exist; the store holds {count} PDs.")]
    PdNumberOutOfRange { number: usize, count: usize },

    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidKeyValue(String),

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },
}

/// Converts a 1-based PD number, as shown to users, into a store index.
pub fn pd_index(number: usize, count: usize) -> Result<usize, ParseError> {
    if number == 0 {
        return Err(ParseError::ZeroPdNumber);
    }
    if number > count {
        return Err(ParseError::PdNumberOutOfRange { number, count });
    }
    Ok(number - 1)
}

/// Splits a `KEY=VALUE` override. Only the first `=` separates; the value may contain more.
pub fn parse_key_value(input: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidKeyValue(input.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            input: input.to_string(),
        });
    }
    Ok((key, value.trim()))
}

/// Interprets an answer to a yes/no prompt. Anything but an explicit yes declines.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pd_numbers_map_to_zero_based_indices() {
        assert_eq!(pd_index(1, 3), Ok(0));
        assert_eq!(pd_index(3, 3), Ok(2));
        assert_eq!(pd_index(0, 3), Err(ParseError::ZeroPdNumber));
        assert_eq!(
            pd_index(4, 3),
            Err(ParseError::PdNumberOutOfRange {
                number: 4,
                count: 3
            })
        );
    }

    #[test]
    fn key_value_pairs_split_on_first_equals() {
        assert_eq!(
            parse_key_value("gate.required-coverage=0.8"),
            Ok(("gate.required-coverage", "0.8"))
        );
        assert_eq!(parse_key_value("out-dir=a=b"), Ok(("out-dir", "a=b")));
        assert_eq!(
            parse_key_value("num-psi"),
            Err(ParseError::InvalidKeyValue("num-psi".to_string()))
        );
        assert!(matches!(
            parse_key_value("=4"),
            Err(ParseError::EmptyComponent { component: "key", .. })
        ));
    }

    #[test]
    fn only_explicit_yes_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" YES\n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("sure"));
    }
}
