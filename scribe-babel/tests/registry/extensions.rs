use crate::common::registry;
use scribe_babel::ids;
use std::collections::HashMap;

#[test]
fn every_declared_extension_resolves_to_its_dialect() {
    let registry = registry();
    for format in registry.formats() {
        for extension in format.extensions {
            assert_eq!(
                registry.detect_by_extension(extension).id,
                format.id,
                "extension {extension} should resolve to {}",
                format.id
            );
        }
    }
}

#[test]
fn extension_sets_are_disjoint() {
    let registry = registry();
    let mut owners: HashMap<&str, &str> = HashMap::new();
    for format in registry.formats() {
        for extension in format.extensions {
            if let Some(previous) = owners.insert(extension, format.id) {
                panic!("{extension} claimed by both {previous} and {}", format.id);
            }
        }
    }
}

#[test]
fn extensions_are_normalized_before_lookup() {
    let registry = registry();
    assert_eq!(registry.detect_by_extension("MD").id, ids::MARKDOWN);
    assert_eq!(registry.detect_by_extension(".Tex").id, ids::LATEX);
    assert_eq!(registry.detect_by_extension(" ipynb ").id, ids::JUPYTER);
}

#[test]
fn txt_resolves_to_plaintext() {
    let registry = registry();
    assert_eq!(registry.detect_by_extension(".txt").id, ids::PLAINTEXT);
    assert_eq!(registry.detect_by_filename("notes/ideas.txt").id, ids::PLAINTEXT);
}

#[test]
fn todo_filenames_resolve_to_todotxt() {
    let registry = registry();
    assert_eq!(registry.detect_by_filename("todo.txt").id, ids::TODOTXT);
    assert_eq!(registry.detect_by_filename("/home/me/done.txt").id, ids::TODOTXT);
    assert_eq!(registry.detect_by_filename("work-todo.txt").id, ids::TODOTXT);
    assert_eq!(registry.detect_by_filename("TODO.TXT").id, ids::TODOTXT);
}

#[test]
fn unknown_extensions_fall_back_to_plaintext() {
    let registry = registry();
    assert_eq!(registry.detect_by_extension(".nope").id, ids::PLAINTEXT);
    assert_eq!(registry.detect_by_extension("").id, ids::PLAINTEXT);
    assert!(registry.get_by_extension(".nope").is_none());
}

#[test]
fn documented_extension_table_is_preserved() {
    let registry = registry();
    let table = [
        (".md", ids::MARKDOWN),
        (".taskpaper", ids::TASKPAPER),
        (".org", ids::ORGMODE),
        (".ldg", ids::PLAINTEXT),
        (".ledger", ids::PLAINTEXT),
        (".m3u", ids::PLAINTEXT),
        (".m3u8", ids::PLAINTEXT),
        (".svg", ids::PLAINTEXT),
        (".lrc", ids::PLAINTEXT),
        (".fen", ids::PLAINTEXT),
        (".yml", ids::KEYVALUE),
        (".yaml", ids::KEYVALUE),
        (".toml", ids::KEYVALUE),
        (".vcf", ids::KEYVALUE),
        (".ics", ids::KEYVALUE),
        (".ini", ids::KEYVALUE),
        (".json", ids::KEYVALUE),
        (".zim", ids::KEYVALUE),
        (".tex", ids::LATEX),
        (".latex", ids::LATEX),
        (".rst", ids::RESTRUCTUREDTEXT),
        (".rest", ids::RESTRUCTUREDTEXT),
        (".rmd", ids::RMARKDOWN),
        (".rmarkdown", ids::RMARKDOWN),
        (".ipynb", ids::JUPYTER),
        (".tid", ids::TIDDLYWIKI),
        (".tiddler", ids::TIDDLYWIKI),
        (".csv", ids::CSV),
        (".png", ids::BINARY),
        (".mp3", ids::BINARY),
        (".mp4", ids::BINARY),
    ];
    for (extension, id) in table {
        assert_eq!(registry.detect_by_extension(extension).id, id, "{extension}");
    }
}

#[test]
fn all_extensions_is_sorted_and_unique() {
    let extensions = registry().all_extensions();
    let mut sorted = extensions.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(extensions, sorted);
    assert!(extensions.contains(&".ipynb"));
}
