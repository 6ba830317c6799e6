use crate::common::{registry, SAMPLES};
use scribe_babel::ParseOptions;

const THEMED: &[(&str, &str)] = &[
    ("latex", "latex-document"),
    ("asciidoc", "asciidoc"),
    ("restructuredtext", "rst-document"),
    ("orgmode", "org-mode-document"),
    ("jupyter", "jupyter-notebook"),
];

fn sample(id: &str) -> &'static str {
    SAMPLES
        .iter()
        .find(|(sample_id, _)| *sample_id == id)
        .map(|(_, content)| *content)
        .unwrap()
}

#[test]
fn themed_dialects_render_both_variants() {
    let registry = registry();
    for (id, container) in THEMED {
        let doc = registry
            .parse_as(id, sample(id), &ParseOptions::new())
            .unwrap();
        let light = registry.to_html(&doc, true).unwrap();
        let dark = registry.to_html(&doc, false).unwrap();
        assert!(light.contains(&format!("<div class='{container} light'>")), "{id}");
        assert!(dark.contains(&format!("<div class='{container} dark'>")), "{id}");
        assert_eq!(light, doc.parsed_content, "{id} parses in light mode");
    }
}

#[test]
fn to_html_is_deterministic() {
    let registry = registry();
    for (id, content) in SAMPLES {
        let doc = registry
            .parse_as(id, content, &ParseOptions::new())
            .unwrap();
        for light in [true, false] {
            assert_eq!(
                registry.to_html(&doc, light).unwrap(),
                registry.to_html(&doc, light).unwrap(),
                "{id}"
            );
        }
    }
}

#[test]
fn every_sample_parses_in_its_own_dialect() {
    let registry = registry();
    for (id, content) in SAMPLES {
        let doc = registry
            .parse_as(id, content, &ParseOptions::new())
            .unwrap();
        assert_eq!(doc.format.id, *id);
        assert_eq!(doc.raw_content, *content);
        assert!(!doc.parsed_content.is_empty(), "{id}");
    }
}
