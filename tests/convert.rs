use botmarkup::{convert_html, highlight_codes, normalize, PolicyConfig};
use indoc::indoc;
use pretty_assertions::assert_eq;

fn markup(html: &str) -> String {
    convert_html(html, &PolicyConfig::default()).unwrap().markup
}

#[test]
fn otp_is_wrapped() {
    let out = markup("<p>Your code is 123456 today</p>");
    assert_eq!(out, "Your code is <code>123456</code> today");
}

#[test]
fn hidden_element_never_surfaces() {
    let out = markup("<div style=\"display:none\">secret</div>visible");
    assert!(out.contains("visible"));
    assert!(!out.contains("secret"));

    let out = markup("<p style=\"visibility : HIDDEN\"><b>secret</b></p><p>shown</p>");
    assert_eq!(out, "shown");
}

#[test]
fn heading_becomes_bold() {
    assert_eq!(markup("<h2>Title</h2>"), "<b>Title</b>");
    assert_eq!(
        markup("<table><tr><th>Qty</th><td>2</td></tr></table>"),
        "<b>Qty</b> 2"
    );
}

#[test]
fn link_extraction() {
    assert_eq!(
        markup("<a href=\"https://x.test\">  Click  </a>"),
        "<a href=\"https://x.test\">Click</a>"
    );
    assert_eq!(
        markup("<a href=\"https://x.test\" class=\"btn\" target=\"_blank\"><b>Open</b> <i>now</i></a>"),
        "<a href=\"https://x.test\">Open now</a>"
    );
    assert_eq!(markup("<a href=\"https://x.test\"><img src=\"i.png\"></a>"), "");
}

#[test]
fn unsupported_table_is_flattened() {
    assert_eq!(markup("<table><tr><td>A</td></tr></table>"), "A");
    assert_eq!(
        markup("<p>before</p><table><tr><td>A</td><td>B</td></tr><tr><td>C</td></tr></table>"),
        "before\n\nA B\nC"
    );
}

#[test]
fn scripts_styles_and_comments_are_dropped() {
    let html = indoc! {r#"
        <html>
          <head><title>Receipt</title><style>p { color: red }</style></head>
          <body>
            <!-- tracking -->
            <script>alert(1)</script>
            <p>Thanks for your order</p>
          </body>
        </html>
    "#};
    assert_eq!(markup(html), "Thanks for your order");
}

#[test]
fn typical_verification_mail() {
    let html = indoc! {r#"
        <!DOCTYPE html>
        <html>
        <body>
          <div class="wrapper">
            <h1>Confirm your sign-in</h1>
            <p>Hello <strong>Alex</strong>,</p>
            <p>Use this code to finish signing in:</p>
            <p style="font-size: 24px"><span class="otp">739 201</span> <span>4821.9930</span></p>
            <p>It expires at 12:30 on 2024-05-01.</p>
            <span style="display:none">preheader text</span>
            <p><a href="https://acme.test/help?a=1&amp;b=2">Get help</a> &middot; <em>Acme</em></p>
          </div>
        </body>
        </html>
    "#};
    let expected = indoc! {r#"
        <b>Confirm your sign-in</b>
        Hello <strong>Alex</strong> ,
        Use this code to finish signing in:
        739 201 <code>4821.9930</code>
        It expires at 12:30 on 2024-05-01.
        <a href="https://acme.test/help?a=1&amp;b=2">Get help</a> · <em>Acme</em>"#};
    let roomy = PolicyConfig {
        max_lines: 20,
        ..PolicyConfig::default()
    };
    let conv = convert_html(html, &roomy).unwrap();
    assert_eq!(conv.markup, expected);
    assert!(!conv.state.truncated);

    // Eleven text chunks cost at least a line each; the stock ten-line
    // budget stops before the last one.
    let conv = convert_html(html, &PolicyConfig::default()).unwrap();
    assert!(conv.state.truncated);
    assert!(conv.markup.ends_with("Get help</a> ·"), "{}", conv.markup);
    assert!(!conv.markup.contains("Acme"));
}

#[test]
fn single_line_pre_keeps_its_spacing() {
    assert_eq!(
        markup("<p>run   this:</p><pre>make    all</pre>"),
        "run this:<pre>make    all</pre>"
    );
}

#[test]
fn lists_get_bullets() {
    let html = "<ul><li>Milk</li><li>Eggs</li></ul>";
    assert_eq!(markup(html), "• Milk\n• Eggs");
}

#[test]
fn line_breaks_are_kept() {
    assert_eq!(markup("line one<br>line two<BR/>three"), "line one\nline two\nthree");
}

#[test]
fn blank_line_runs_collapse() {
    assert_eq!(markup("<p>a</p><div><div><div></div></div></div><p>b</p>"), "a\n\nb");
}

#[test]
fn budget_truncation_is_forward_only() {
    let paragraphs: String = (1..=20).map(|i| format!("<p>paragraph {i}</p>")).collect();
    let conv = convert_html(&paragraphs, &PolicyConfig::default()).unwrap();
    assert!(conv.state.truncated);
    assert_eq!(conv.state.lines_used, 11);
    let expected: Vec<String> = (1..=10).map(|i| format!("paragraph {i}")).collect();
    assert_eq!(conv.markup, expected.join("\n"));
}

#[test]
fn char_budget_is_configurable() {
    let config = PolicyConfig {
        max_chars: 30,
        ..PolicyConfig::default()
    };
    let html = "<p>twenty characters!!</p><p>ten chars.</p><p>over the top</p>";
    let conv = convert_html(html, &config).unwrap();
    assert_eq!(conv.markup, "twenty characters!!\nten chars.");
    assert_eq!(conv.state.chars_used, 41);
    assert!(conv.state.truncated);
}

#[test]
fn independent_conversions_do_not_share_budget() {
    let config = PolicyConfig {
        max_lines: 1,
        ..PolicyConfig::default()
    };
    let first = convert_html("<p>a</p><p>b</p>", &config).unwrap();
    let second = convert_html("<p>c</p>", &config).unwrap();
    assert_eq!(first.markup, "a");
    assert!(first.state.truncated);
    assert_eq!(second.markup, "c");
    assert!(!second.state.truncated);
}

#[test]
fn deeply_nested_markup_terminates() {
    let html = format!("{}x{}", "<div>".repeat(5000), "</div>".repeat(5000));
    let conv = convert_html(&html, &PolicyConfig::default()).unwrap();
    assert!(!conv.markup.contains('x'));
}

#[test]
fn malformed_markup_still_renders() {
    assert_eq!(markup("<p>unclosed <b>bold <i>both"), "unclosed <b>bold <i>both</i></b>");
    assert_eq!(markup(""), "");
    assert_eq!(markup("<<<>>>"), "&lt;&lt;&lt;&gt;&gt;&gt;");
}

#[test]
fn output_is_bounded() {
    let html = "<p>".to_string() + &"word ".repeat(100_000) + "</p>";
    let conv = convert_html(&html, &PolicyConfig::default()).unwrap();
    assert_eq!(conv.markup, "");
    assert!(conv.state.truncated);
}

#[test]
fn normalizer_is_idempotent_on_conversions() {
    for html in [
        "<p>a</p><p></p><p></p><p>b</p>",
        "<ul><li><b></b></li><li>x</li></ul>",
        "<pre>  keep\n\n\n  this</pre><p>1234</p>",
    ] {
        let out = markup(html);
        assert_eq!(normalize(&out), out, "{html}");
    }
}

#[test]
fn highlighter_identity_without_codes() {
    for text in ["no digits here", "123 and 45", "2024-05-01", "A1B2C3D4"] {
        assert_eq!(highlight_codes(text), text);
    }
}
