// tsconfig JSON
//
// tsconfig files are JSON with comments and trailing commas. Both are
// removed here before handing the text to serde_json.

/// Strip `//` and `/* */` comments and trailing commas outside of strings.
pub fn strip_json_comments(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    let mut in_string = false;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    // Keep line structure so serde errors point at the right line.
                    if chars[i] == '\n' {
                        out.push('\n');
                    }
                    i += 1;
                }
                i += 2;
            }
            ',' => {
                // A comment between the comma and the closing bracket still
                // makes it trailing.
                let rest: String = chars[i + 1..].iter().collect();
                let next = strip_leading_comments(&rest).chars().next();
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn strip_leading_comments(input: &str) -> &str {
    let mut rest = input.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.find('\n').map_or("", |n| &after[n..]).trim_start();
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.find("*/").map_or("", |n| &after[n + 2..]).trim_start();
        } else {
            return rest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_strip_comments_outside_strings() {
        let input = r#"{
            // line comment
            "a": "http://not-a-comment", /* block */ "b": 1
        }"#;
        let value: serde_json::Value = serde_json::from_str(&strip_json_comments(input)).unwrap();
        assert_eq!(value["a"], "http://not-a-comment");
        assert_eq!(value["b"], 1);
    }

    #[test]
    fn should_strip_trailing_commas() {
        let input = r#"{ "include": ["src",  ], "x": { "y": 1, // done
        }, }"#;
        let value: serde_json::Value = serde_json::from_str(&strip_json_comments(input)).unwrap();
        assert_eq!(value["include"][0], "src");
        assert_eq!(value["x"]["y"], 1);
    }

    #[test]
    fn should_keep_escaped_quotes() {
        let input = r#"{ "a": "say \"hi\" // still string" }"#;
        let value: serde_json::Value = serde_json::from_str(&strip_json_comments(input)).unwrap();
        assert_eq!(value["a"], "say \"hi\" // still string");
    }
}
