//! `{{placeholder}}` substitution for the stored email templates.

/// Replace every `{{name}}` in `template` with its value from `vars`.
/// Unknown placeholders render as empty strings so an admin typo never
/// leaks raw braces into an email.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let name = after[..close].trim();
                if let Some((_, value)) = vars.iter().find(|(key, _)| *key == name) {
                    out.push_str(value);
                }
                rest = &after[close + 2..];
            }
            // Unclosed braces pass through verbatim.
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_placeholders() {
        let rendered = render_template(
            "Hi {{username}}, welcome to {{site_name}}!",
            &[("username", "ava"), ("site_name", "Vowline")],
        );
        assert_eq!(rendered, "Hi ava, welcome to Vowline!");
    }

    #[test]
    fn unknown_placeholders_render_empty() {
        assert_eq!(render_template("Hi {{nobody}}!", &[]), "Hi !");
    }

    #[test]
    fn whitespace_inside_braces_is_tolerated() {
        assert_eq!(
            render_template("{{ username }}", &[("username", "ava")]),
            "ava"
        );
    }

    #[test]
    fn text_without_placeholders_is_untouched() {
        assert_eq!(render_template("plain text", &[]), "plain text");
    }

    #[test]
    fn unclosed_braces_pass_through() {
        assert_eq!(render_template("oops {{username", &[]), "oops {{username");
    }

    #[test]
    fn repeated_placeholder_substitutes_every_time() {
        assert_eq!(
            render_template("{{a}} and {{a}}", &[("a", "x")]),
            "x and x"
        );
    }
}
