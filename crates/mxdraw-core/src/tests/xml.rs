use crate::xml::{XmlElement, XmlNode, escape_attr, fmt_number, next_xml_id};

#[test]
fn escapes_each_special_character_once() {
    assert_eq!(
        escape_attr(r#"<a "b" & c>"#),
        "&lt;a &quot;b&quot; &amp; c&gt;"
    );
    assert_eq!(escape_attr("it's"), "it&apos;s");
    assert_eq!(escape_attr("&amp;"), "&amp;amp;");
    assert!(matches!(escape_attr("plain"), std::borrow::Cow::Borrowed(_)));
}

#[test]
fn attribute_values_are_escaped_in_tags() {
    let cell = XmlElement::new("mxCell").attr("value", r#"<a "b" & c>"#);
    let tag = cell.open_tag();
    assert_eq!(tag, r#"<mxCell value="&lt;a &quot;b&quot; &amp; c&gt;">"#);
    assert_eq!(tag.matches("&amp;").count(), 1);
}

#[test]
fn tags_follow_the_open_close_self_closing_forms() {
    let cell = XmlElement::new("mxCell")
        .attr("id", "1")
        .attr_opt("parent", Some("0"))
        .attr_opt("source", None::<String>);
    assert_eq!(cell.open_tag(), r#"<mxCell id="1" parent="0">"#);
    assert_eq!(cell.close_tag(), "</mxCell>");
    assert_eq!(cell.self_closing(), r#"<mxCell id="1" parent="0" />"#);
    assert_eq!(cell.attribute("source"), None);
}

#[test]
fn nested_elements_render_with_two_space_indent() {
    let doc = XmlElement::new("root")
        .child(XmlElement::new("mxCell").attr("id", "0"))
        .child(XmlElement::new("a").child(XmlElement::new("b")));
    assert_eq!(
        doc.to_xml_string(),
        "<root>\n  <mxCell id=\"0\" />\n  <a>\n    <b />\n  </a>\n</root>\n"
    );
}

#[test]
fn generated_ids_are_unique_and_skip_sentinels() {
    let a = next_xml_id();
    let b = next_xml_id();
    assert_ne!(a, b);
    for id in [&a, &b] {
        let n: u64 = id.parse().unwrap();
        assert!(n >= 2);
    }
}

#[test]
fn numbers_drop_trailing_zero_fractions() {
    assert_eq!(fmt_number(120.0), "120");
    assert_eq!(fmt_number(-0.5), "-0.5");
    assert_eq!(fmt_number(10.25), "10.25");
    assert_eq!(fmt_number(-0.0), "0");
    assert_eq!(fmt_number(f64::NAN), "0");
}
