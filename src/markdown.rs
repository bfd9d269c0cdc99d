//! Minimal markdown → HTML for chat answers.
//!
//! The input is HTML-escaped before any markup is produced, so model output
//! cannot inject tags. Only the constructs the chat model actually emits are
//! handled.

use std::sync::LazyLock;

use regex::{Captures, Regex};

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("valid markdown pattern"),
        replacement,
    }
}

/// Code spans, rendered first and hidden from every other rule.
static CODE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"```(?:[a-zA-Z0-9_+-]*\n)?([\s\S]*?)```", "<pre><code>${1}</code></pre>"),
        rule(r"`([^`\n]+)`", "<code>${1}</code>"),
    ]
});

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"(?m)^### (.*)$", "<h3>${1}</h3>"),
        rule(r"(?m)^## (.*)$", "<h2>${1}</h2>"),
        rule(r"(?m)^# (.*)$", "<h1>${1}</h1>"),
        rule(r"\*\*(.+?)\*\*", "<strong>${1}</strong>"),
        rule(r"\*([^*\n]+?)\*", "<em>${1}</em>"),
        rule(r"(?m)^- (.*)$", "<li>${1}</li>"),
    ]
});

static LIST_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(<li>.*</li>)").expect("valid list pattern"));

/// Stand-in for a stashed code span. NUL never survives into the input.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x00(\d+)\x00").expect("valid placeholder pattern"));

pub fn render_markdown(text: &str) -> String {
    let mut html = escape_html(&text.replace("\r\n", "\n").replace('\0', ""));

    let mut stash: Vec<String> = Vec::new();
    for rule in CODE_RULES.iter() {
        html = rule
            .pattern
            .replace_all(&html, |caps: &Captures| {
                let mut code = String::new();
                caps.expand(rule.replacement, &mut code);
                stash.push(code);
                format!("\0{}\0", stash.len() - 1)
            })
            .into_owned();
    }

    for rule in RULES.iter() {
        html = rule
            .pattern
            .replace_all(&html, rule.replacement)
            .into_owned();
    }

    html = LIST_BLOCK.replace(&html, "<ul>${1}</ul>").into_owned();
    html = html.replace('\n', "<br />");

    // Code keeps its own line breaks
    PLACEHOLDER
        .replace_all(&html, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| stash.get(i))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
