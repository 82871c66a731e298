use std::fs;

use cheatsheets::{
    CheatsheetError, MarkdownPreprocessor, PageTemplates, RenderContext, TemplateSource,
    find_by_name, read_cheatsheets, render_cheatsheet_html, render_index_html,
};
use tempfile::tempdir;

const GIT_MD: &str = r#"---
title: Git
category: Tools
tags:
  - vcs
  - cli
---
# Intro
Day to day git.

# Branches
## Create
`git switch -c name`
## Delete
`git branch -d name`

# Remotes {#remote-repos}
## Fetch
`git fetch`
"#;

#[test]
fn catalog_renders_pages_with_toc_and_search_index() {
    let temp = tempdir().unwrap();
    let dir = temp.path().join("cheatsheets");
    fs::create_dir_all(dir.join("good")).unwrap();
    fs::create_dir_all(dir.join("misc")).unwrap();
    fs::write(dir.join("good").join("git.md"), GIT_MD).unwrap();
    fs::write(dir.join("misc").join("git.md"), "# Other\n").unwrap();

    let catalog = read_cheatsheets(&dir).unwrap();
    assert_eq!(catalog.len(), 2);
    let names: Vec<&str> = catalog.iter().map(|cs| cs.name.as_str()).collect();
    assert_eq!(names, vec!["git", "git1"]);

    let git = find_by_name(&catalog, "GIT").unwrap();
    assert!(git.in_main);
    assert_eq!(git.title, "Git");
    assert_eq!(git.meta.get("tags").map(String::as_str), Some("vcs, cli"));

    let preprocessor = MarkdownPreprocessor::new().unwrap();
    let templates = PageTemplates::embedded().unwrap();
    let ctx = RenderContext {
        preprocessor: &preprocessor,
        templates: &templates,
        alpine_url: "/alpine.js",
    };

    let page = render_cheatsheet_html(git, &ctx).unwrap();
    assert!(page.contains(r#"<h1 id="branches">Branches</h1>"#));
    assert!(page.contains(r#"<h1 id="remote-repos">Remotes</h1>"#));
    assert!(page.contains(r##"href="#delete""##));
    assert!(!page.contains(r##"href="#intro""##));
    assert!(page.contains(r#"["Fetch","fetch","fetch",1]"#));

    let index = render_index_html(&catalog, false, &ctx).unwrap();
    assert!(index.contains("1 cheatsheets"));
    assert!(index.contains("Tools"));
    let all = render_index_html(&catalog, true, &ctx).unwrap();
    assert!(all.contains("2 cheatsheets"));
}

#[test]
fn broken_cheatsheet_fails_with_content_error() {
    let preprocessor = MarkdownPreprocessor::new().unwrap();
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("bad.md"), "# A\n\n### Too deep\n").unwrap();

    let catalog = read_cheatsheets(temp.path()).unwrap();
    let templates = PageTemplates::embedded().unwrap();
    let ctx = RenderContext {
        preprocessor: &preprocessor,
        templates: &templates,
        alpine_url: "",
    };
    let err = render_cheatsheet_html(&catalog[0], &ctx).unwrap_err();
    assert!(matches!(err, CheatsheetError::LevelSkip { .. }));
    assert!(err.is_content_error());
}

#[test]
fn templates_in_www_dir_override_embedded_ones() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("index.tmpl.html"),
        "count={{cheatsheets_count}}",
    )
    .unwrap();

    let templates = PageTemplates::load(Some(temp.path())).unwrap();
    assert!(matches!(
        templates.source("index"),
        Some(TemplateSource::Override(_))
    ));
    assert_eq!(
        templates.source("cheatsheet"),
        Some(&TemplateSource::Embedded)
    );

    let preprocessor = MarkdownPreprocessor::new().unwrap();
    let ctx = RenderContext {
        preprocessor: &preprocessor,
        templates: &templates,
        alpine_url: "",
    };
    assert_eq!(render_index_html(&[], true, &ctx).unwrap(), "count=0");
}
