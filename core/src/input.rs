use anyhow::{anyhow, Result};

/// Splits `key:value` arguments into pairs. Arguments without a colon, or with
/// an empty key, are returned separately as positional words.
pub fn parse_pairs(args: &[String]) -> (Vec<(String, String)>, Vec<String>) {
    let mut pairs = Vec::new();
    let mut rest = Vec::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() {
                pairs.push((key.trim().to_string(), value.trim().to_string()));
                continue;
            }
        }
        rest.push(arg.clone());
    }

    (pairs, rest)
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let args = vec![
            "01:absent".to_string(),
            "stray".to_string(),
            "10A: Grade 10 A".to_string(),
            ":nokey".to_string(),
        ];
        let (pairs, rest) = parse_pairs(&args);
        assert_eq!(
            pairs,
            vec![
                ("01".to_string(), "absent".to_string()),
                ("10A".to_string(), "Grade 10 A".to_string()),
            ]
        );
        assert_eq!(rest, vec!["stray".to_string(), ":nokey".to_string()]);
    }

    #[test]
    fn test_expand_key() {
        let candidates = vec!["present", "absent", "late", "excused"];

        assert_eq!(expand_key("p", &candidates).unwrap(), "present");
        assert_eq!(expand_key("abs", &candidates).unwrap(), "absent");
        assert_eq!(expand_key("late", &candidates).unwrap(), "late");

        assert!(expand_key("", &candidates).is_err());
        assert!(expand_key("x", &candidates).is_err());
    }
}
