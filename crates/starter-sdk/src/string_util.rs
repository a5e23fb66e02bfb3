/// Small string helpers.
pub struct StringUtil;

impl StringUtil {
    /// Convert a string to a boolean.
    ///
    /// Valid true values: `"1"`, `"true"`, `"yes"` (case-insensitive).
    /// Valid false values: `"0"`, `"false"`, `"no"` (case-insensitive).
    /// Returns `None` for unrecognized values.
    pub fn convert_to_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        }
    }

    /// Returns the portion of `input` before the first occurrence of `separator`.
    /// If `separator` is not found, returns the entire string.
    pub fn sub_string_before(input: &str, separator: char) -> &str {
        match input.find(separator) {
            Some(idx) => &input[..idx],
            None => input,
        }
    }

    /// Quote a value for a POSIX shell using single quotes.
    pub fn sh_quote(value: &str) -> String {
        format!("'{}'", value.replace('\'', "'\\''"))
    }

    /// Split an argument string the way a POSIX shell would: whitespace
    /// separates words, single and double quotes group, backslash escapes
    /// outside single quotes.
    pub fn shell_split(input: &str) -> Vec<String> {
        let mut args = Vec::new();
        let mut current = String::new();
        let mut in_word = false;
        let mut in_single_quote = false;
        let mut in_double_quote = false;
        let mut escape_next = false;

        for ch in input.chars() {
            if escape_next {
                current.push(ch);
                escape_next = false;
                continue;
            }

            match ch {
                '\\' if !in_single_quote => {
                    escape_next = true;
                    in_word = true;
                }
                '\'' if !in_double_quote => {
                    in_single_quote = !in_single_quote;
                    in_word = true;
                }
                '"' if !in_single_quote => {
                    in_double_quote = !in_double_quote;
                    in_word = true;
                }
                ' ' | '\t' | '\n' if !in_single_quote && !in_double_quote => {
                    if in_word {
                        args.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    current.push(ch);
                    in_word = true;
                }
            }
        }

        if in_word {
            args.push(current);
        }

        args
    }
}
