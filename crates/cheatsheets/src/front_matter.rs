use std::collections::BTreeMap;

use crate::error::CheatsheetError;

/// Front matter values keyed by lower-cased name.
pub type CheatsheetMeta = BTreeMap<String, String>;

/// Borrowed slices of a document split into front matter and body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrontMatterSplit<'a> {
    pub yaml: Option<&'a str>,
    pub body: &'a str,
}

/// Splits newline-normalized markdown into an optional `---` delimited front
/// matter block and the body. Leading blank lines are skipped.
pub fn split_front_matter(content: &str) -> Result<FrontMatterSplit<'_>, CheatsheetError> {
    let stripped = content
        .trim_start_matches('\u{feff}')
        .trim_start_matches('\n');
    let Some(rest) = stripped.strip_prefix("---\n") else {
        return Ok(FrontMatterSplit {
            yaml: None,
            body: stripped,
        });
    };

    // Only a line that is exactly `---` closes the block.
    let mut offset = 0;
    let mut closing = None;
    for line in rest.split_inclusive('\n') {
        if line.strip_suffix('\n').unwrap_or(line) == "---" {
            closing = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let Some((start, end)) = closing else {
        return Err(CheatsheetError::FrontMatter(
            "missing closing front matter delimiter (---)".into(),
        ));
    };
    let yaml = &rest[..start];
    let yaml = yaml.strip_suffix('\n').unwrap_or(yaml);
    let body = &rest[end..];
    Ok(FrontMatterSplit {
        yaml: Some(yaml),
        body,
    })
}

/// Parses a front matter block as YAML, falling back to a line-based
/// `key: value` reading when the block is not valid YAML.
pub fn parse_meta(yaml: &str) -> CheatsheetMeta {
    if yaml.trim().is_empty() {
        return CheatsheetMeta::new();
    }
    match serde_yaml::from_str::<serde_yaml::Value>(yaml) {
        Ok(serde_yaml::Value::Mapping(mapping)) => mapping
            .into_iter()
            .filter_map(|(key, value)| {
                let key = scalar_to_string(&key)?;
                Some((key.trim().to_lowercase(), value_to_string(&value)))
            })
            .collect(),
        _ => {
            tracing::debug!("front matter is not a yaml mapping, reading it line by line");
            parse_meta_lines(yaml)
        }
    }
}

/// Line-based reading: `key: value` pairs with quotes and a leading `|`
/// stripped; lines without a colon continue the previous value.
pub fn parse_meta_lines(block: &str) -> CheatsheetMeta {
    let mut meta = CheatsheetMeta::new();
    let mut last_key = String::new();
    for line in block.lines() {
        match line.split_once(':') {
            Some((key, value)) => {
                let key = key.trim().to_lowercase();
                let value = value.trim().trim_matches('"').trim_start_matches('|');
                meta.insert(key.clone(), value.to_string());
                last_key = key;
            }
            None => {
                let text = line.trim().trim_matches('"');
                let entry = meta.entry(last_key.clone()).or_default();
                if !entry.is_empty() {
                    entry.push('\n');
                }
                entry.push_str(text);
            }
        }
    }
    meta
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        serde_yaml::Value::Tagged(tagged) => value_to_string(&tagged.value),
        other => match scalar_to_string(other) {
            Some(s) => s.trim_end().to_string(),
            None => serde_yaml::to_string(other)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_without_front_matter_is_all_body() {
        let split = split_front_matter("\n\n# Title\n").unwrap();
        assert!(split.yaml.is_none());
        assert_eq!(split.body, "# Title\n");
    }

    #[test]
    fn front_matter_is_split_from_body() {
        let split = split_front_matter("---\ntitle: Go\n---\n# Body\n").unwrap();
        assert_eq!(split.yaml, Some("title: Go"));
        assert_eq!(split.body, "# Body\n");
    }

    #[test]
    fn empty_front_matter_block() {
        let split = split_front_matter("---\n---\nbody").unwrap();
        assert_eq!(split.yaml, Some(""));
        assert_eq!(split.body, "body");
    }

    #[test]
    fn longer_dash_lines_do_not_close_the_block() {
        let split = split_front_matter("---\ntitle: Go\n----\nnote: x\n---\n# Body\n").unwrap();
        assert_eq!(split.yaml, Some("title: Go\n----\nnote: x"));
        assert_eq!(split.body, "# Body\n");

        let split = split_front_matter("---\n---\n").unwrap();
        assert_eq!(split.yaml, Some(""));
        assert_eq!(split.body, "");

        let err = split_front_matter("---\ntitle: Go\n---- \n# Body\n").unwrap_err();
        assert!(err.is_content_error());
    }

    #[test]
    fn unterminated_front_matter_is_an_error() {
        let err = split_front_matter("---\ntitle: x\n# Body\n").unwrap_err();
        assert!(err.is_content_error());
    }

    #[test]
    fn yaml_keys_are_lower_cased_and_sequences_joined() {
        let meta = parse_meta("Title: \"Git\"\ncategory: VCS\ntags: [a, b]\nweight: 3\n");
        assert_eq!(meta.get("title").map(String::as_str), Some("Git"));
        assert_eq!(meta.get("category").map(String::as_str), Some("VCS"));
        assert_eq!(meta.get("tags").map(String::as_str), Some("a, b"));
        assert_eq!(meta.get("weight").map(String::as_str), Some("3"));
    }

    #[test]
    fn yaml_block_scalars_keep_their_lines() {
        let meta = parse_meta("intro: |\n  line one\n  line two\n");
        assert_eq!(
            meta.get("intro").map(String::as_str),
            Some("line one\nline two")
        );
    }

    #[test]
    fn invalid_yaml_falls_back_to_lines() {
        // the second colon makes this invalid yaml
        let meta = parse_meta("title: Vim: the basics\ndescription: one\n  two\n");
        assert_eq!(
            meta.get("title").map(String::as_str),
            Some("Vim: the basics")
        );
        assert_eq!(
            meta.get("description").map(String::as_str),
            Some("one\ntwo")
        );
    }

    #[test]
    fn line_reader_strips_quotes_and_pipes() {
        let meta = parse_meta_lines("Intro: |\n\"first\"\nsecond\nname: \"x\"");
        assert_eq!(meta.get("intro").map(String::as_str), Some("first\nsecond"));
        assert_eq!(meta.get("name").map(String::as_str), Some("x"));
    }
}
