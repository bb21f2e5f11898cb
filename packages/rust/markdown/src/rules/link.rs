//! Images, inline links, autolinks, obfuscated email links and raw tags.
//!
//! Link labels and destinations are escaped with [`protect_link_text`] so
//! the emphasis pass that follows leaves them alone. Autolinks and raw tags
//! are found in their escaped form (`&lt;...&gt;`).

use std::fmt::Write as _;
use std::sync::LazyLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::{Captures, Regex};

use mdhtml_shared::RenderConfig;

use super::Rule;
use crate::pipeline::BlockContext;

/// `mailto:` with most letters numerically encoded.
const MAILTO: &str = "&#x6D;&#x61;&#x69;l&#x74;&#x6F;:";

/// Escape characters in a label or destination that other rules react to.
pub fn protect_link_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '_' => out.push_str("&lowbar;"),
            '*' => out.push_str("&ast;"),
            '[' => out.push_str("&lbrack;"),
            ']' => out.push_str("&rbrack;"),
            '(' => out.push_str("&lpar;"),
            ')' => out.push_str("&rpar;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// `![alt](src)` becomes a self-closing `<img>`.
#[derive(Debug, Default)]
pub struct ImageRule;

impl ImageRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for ImageRule {
    fn name(&self) -> &'static str {
        "image"
    }

    fn process(&mut self, block: &str, _ctx: &BlockContext) -> String {
        static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"!\[(?P<alt>[^\[\]]+)\]\((?P<src>[^()]+)\)").expect("valid regex")
        });

        IMAGE_RE
            .replace_all(block, |caps: &Captures| render_image(&caps["src"], &caps["alt"]))
            .into_owned()
    }
}

fn render_image(src: &str, alt: &str) -> String {
    format!(
        r#"<img src = "{}" alt = "{}" />"#,
        protect_link_text(src),
        protect_link_text(alt)
    )
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// Inline links, URL and email autolinks, and re-exposure of raw tags.
#[derive(Debug)]
pub struct LinkRule {
    emails: EmailObfuscator,
}

impl LinkRule {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            emails: EmailObfuscator::new(config),
        }
    }
}

impl Default for LinkRule {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

impl Rule for LinkRule {
    fn name(&self) -> &'static str {
        "link"
    }

    fn process(&mut self, block: &str, _ctx: &BlockContext) -> String {
        static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"\[(?P<label>[^\[\]]+)\]\((?P<dest>[^()]+)\)").expect("valid regex")
        });
        static URL_AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"&lt;(?P<url>[A-Za-z][A-Za-z0-9+.-]*://\S*?)&gt;").expect("valid regex")
        });
        static EMAIL_AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"&lt;(?P<email>\w+(?:[-+.]\w+)*@\w+(?:[-.]\w+)*\.\w+(?:[-.]\w+)*)&gt;")
                .expect("valid regex")
        });
        static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"&lt;(?P<tag>/?[A-Za-z][A-Za-z0-9-]*(?:[ \t][^\n]*?)?/?)&gt;")
                .expect("valid regex")
        });

        let text = LINK_RE
            .replace_all(block, |caps: &Captures| render_anchor(&caps["dest"], &caps["label"]))
            .into_owned();

        let text = URL_AUTOLINK_RE
            .replace_all(&text, |caps: &Captures| render_anchor(&caps["url"], &caps["url"]))
            .into_owned();

        let emails = &mut self.emails;
        let text = EMAIL_AUTOLINK_RE
            .replace_all(&text, |caps: &Captures| emails.anchor(&caps["email"]))
            .into_owned();

        TAG_RE.replace_all(&text, "<${tag}>").into_owned()
    }
}

fn render_anchor(dest: &str, label: &str) -> String {
    format!(
        r#"<a href = "{}">{}</a>"#,
        protect_link_text(dest),
        protect_link_text(label)
    )
}

// ---------------------------------------------------------------------------
// Email obfuscation
// ---------------------------------------------------------------------------

/// Re-encodes email addresses character by character.
///
/// `@` and `.` always become numeric references and markdown-significant
/// characters become named entities. Every other character is numerically
/// encoded with probability `ratio`, so the literal output varies between
/// runs while the decoded address never does.
#[derive(Debug)]
pub struct EmailObfuscator {
    rng: StdRng,
    ratio: f64,
    enabled: bool,
}

impl EmailObfuscator {
    pub fn new(config: &RenderConfig) -> Self {
        let rng = match config.email_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ratio = if (0.0..=1.0).contains(&config.email_encode_ratio) {
            config.email_encode_ratio
        } else {
            RenderConfig::default().email_encode_ratio
        };
        Self {
            rng,
            ratio,
            enabled: config.obfuscate_emails,
        }
    }

    /// Encode one address.
    pub fn obfuscate(&mut self, address: &str) -> String {
        let mut out = String::with_capacity(address.len() * 6);
        for c in address.chars() {
            match c {
                '@' => out.push_str("&#64;"),
                '.' => out.push_str("&#x2E;"),
                '_' => out.push_str("&lowbar;"),
                '*' => out.push_str("&ast;"),
                '+' => out.push_str("&plus;"),
                c if self.enabled && self.rng.gen_bool(self.ratio) => {
                    let _ = write!(out, "&#x{:x};", c as u32);
                }
                c => out.push(c),
            }
        }
        out
    }

    /// A complete `mailto:` anchor for `address`.
    pub fn anchor(&mut self, address: &str) -> String {
        let encoded = self.obfuscate(address);
        format!(r#"<a href = "{MAILTO}{encoded}">{encoded}</a>"#)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn link(block: &str) -> String {
        LinkRule::default().process(block, &BlockContext::default())
    }

    fn seeded(seed: u64) -> RenderConfig {
        RenderConfig {
            email_seed: Some(seed),
            ..RenderConfig::default()
        }
    }

    /// Decode the entities produced by [`EmailObfuscator`].
    fn decode(encoded: &str) -> String {
        let re = Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|[a-z]+);").unwrap();
        re.replace_all(encoded, |caps: &Captures| {
            let body = &caps[1];
            let c = if let Some(hex) = body.strip_prefix("#x") {
                char::from_u32(u32::from_str_radix(hex, 16).unwrap()).unwrap()
            } else if let Some(dec) = body.strip_prefix('#') {
                char::from_u32(dec.parse().unwrap()).unwrap()
            } else {
                match body {
                    "lowbar" => '_',
                    "ast" => '*',
                    "plus" => '+',
                    other => panic!("unexpected entity {other}"),
                }
            };
            c.to_string()
        })
        .into_owned()
    }

    #[test]
    fn inline_link() {
        assert_eq!(link("[a](b)"), r#"<a href = "b">a</a>"#);
    }

    #[test]
    fn link_text_is_protected() {
        assert_eq!(
            link("[snake_case](http://x.org/a_b)"),
            r#"<a href = "http://x.org/a&lowbar;b">snake&lowbar;case</a>"#
        );
    }

    #[test]
    fn link_destination_quote_is_escaped() {
        assert_eq!(link(r#"[a](b"c)"#), r#"<a href = "b&quot;c">a</a>"#);
    }

    #[test]
    fn unmatched_brackets_stay_literal() {
        assert_eq!(link("[a](b"), "[a](b");
        assert_eq!(link("[](b)"), "[](b)");
    }

    #[test]
    fn image() {
        let out = ImageRule::new().process("![a cat](img/cat_1.png)", &BlockContext::default());
        assert_eq!(out, r#"<img src = "img/cat&lowbar;1.png" alt = "a cat" />"#);
    }

    #[test]
    fn url_autolink() {
        assert_eq!(
            link("see &lt;https://example.com/x&gt; now"),
            r#"see <a href = "https://example.com/x">https://example.com/x</a> now"#
        );
    }

    #[test]
    fn raw_tags_are_reexposed() {
        assert_eq!(
            link("&lt;div class=\"note\"&gt;hi&lt;/div&gt;&lt;br/&gt;"),
            "<div class=\"note\">hi</div><br/>"
        );
    }

    #[test]
    fn non_tag_brackets_stay_escaped() {
        assert_eq!(link("1 &lt; 2 &gt; 0"), "1 &lt; 2 &gt; 0");
    }

    #[test]
    fn email_autolink_decodes_to_address() {
        let mut rule = LinkRule::new(&seeded(42));
        let out = rule.process("&lt;first.last_name@mail.example.org&gt;", &BlockContext::default());

        let re = Regex::new(r#"^<a href = "(?P<href>[^"]+)">(?P<text>[^<]+)</a>$"#).unwrap();
        let caps = re.captures(&out).expect("anchor");
        assert_eq!(decode(&caps["text"]), "first.last_name@mail.example.org");
        assert_eq!(decode(&caps["href"]), "mailto:first.last_name@mail.example.org");
    }

    #[test]
    fn email_fixed_characters_always_encoded() {
        let mut emails = EmailObfuscator::new(&seeded(1));
        let out = emails.obfuscate("a_b@c.d");
        assert!(out.contains("&#64;"));
        assert!(out.contains("&#x2E;"));
        assert!(out.contains("&lowbar;"));
        assert!(!out.contains('@'));
    }

    #[test]
    fn obfuscation_varies_but_decodes_identically() {
        let address = "someone.with.a.long.name@example.com";
        let mut outputs = std::collections::HashSet::new();
        for seed in 0..16 {
            let mut emails = EmailObfuscator::new(&seeded(seed));
            let encoded = emails.obfuscate(address);
            assert_eq!(decode(&encoded), address);
            outputs.insert(encoded);
        }
        assert!(outputs.len() > 1);
    }

    #[test]
    fn same_seed_same_output() {
        let a = EmailObfuscator::new(&seeded(9)).obfuscate("user@host.net");
        let b = EmailObfuscator::new(&seeded(9)).obfuscate("user@host.net");
        assert_eq!(a, b);
    }

    #[test]
    fn disabled_obfuscation_keeps_letters() {
        let config = RenderConfig {
            obfuscate_emails: false,
            ..RenderConfig::default()
        };
        let out = EmailObfuscator::new(&config).obfuscate("user@host.net");
        assert_eq!(out, "user&#64;host&#x2E;net");
    }
}
