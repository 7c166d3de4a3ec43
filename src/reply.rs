//! Tolerant handling of model replies that are supposed to be JSON but
//! arrive wrapped in markdown code fences or surrounded by chatter.

use regex::Regex;

/// Strip one wrapping triple-backtick fence, with or without a `json`
/// language tag. Anything else is returned trimmed and untouched.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest.trim_start();
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s
}

/// Pull the JSON object out of a reply that may bury it in prose: fenced
/// block first, then a bare `{...}` scan, else the trimmed input.
pub fn extract_json_block(text: &str) -> &str {
    let fenced = Regex::new(r"(?s)```json(.*?)```").unwrap();
    if let Some(caps) = fenced.captures(text) {
        return caps.get(1).unwrap().as_str().trim();
    }
    let any_fence = Regex::new(r"(?s)```(.*?)```").unwrap();
    if let Some(caps) = any_fence.captures(text) {
        return caps.get(1).unwrap().as_str().trim();
    }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return text[start..=end].trim();
        }
    }
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"status\":\"new\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"status\":\"new\"}");
    }

    #[test]
    fn strips_plain_fence() {
        let raw = "```\n[\"a\",\"b\"]\n```";
        assert_eq!(strip_code_fences(raw), "[\"a\",\"b\"]");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("  {\"x\": 1}  "), "{\"x\": 1}");
    }

    #[test]
    fn extracts_fenced_object_from_prose() {
        let text = "Sure, here you go:\n```json\n{\"year\": 800}\n```\nHope that helps.";
        assert_eq!(extract_json_block(text), "{\"year\": 800}");
    }

    #[test]
    fn extracts_bare_object_by_brace_scan() {
        let text = "The metadata follows. {\"title\": \"x\", \"year\": 800} Done.";
        assert_eq!(extract_json_block(text), "{\"title\": \"x\", \"year\": 800}");
    }

    #[test]
    fn falls_back_to_trimmed_input() {
        assert_eq!(extract_json_block("  no json here  "), "no json here");
    }
}
