use std::collections::BTreeMap;

use serde::Serialize;

use crate::cheatsheet::Cheatsheet;
use crate::error::CheatsheetError;
use crate::html::to_html;
use crate::parse::MarkdownPreprocessor;
use crate::template::{CHEATSHEET_TEMPLATE, INDEX_TEMPLATE, PageTemplates};
use crate::toc::{Navigation, TocNode, build_navigation, search_index_json};

/// Shared pieces needed to turn cheatsheets into pages.
pub struct RenderContext<'a> {
    pub preprocessor: &'a MarkdownPreprocessor,
    pub templates: &'a PageTemplates,
    pub alpine_url: &'a str,
}

/// Cheatsheet markdown turned into HTML plus its navigation.
pub struct RenderedCheatsheet {
    pub content: String,
    pub navigation: Navigation,
}

#[derive(Serialize)]
struct CheatsheetPage<'a> {
    title: &'a str,
    md_file_name: &'a str,
    content: &'a str,
    toc: &'a [TocNode],
    search_index_static: String,
    alpine_url: &'a str,
}

#[derive(Serialize)]
struct CategoryGroup<'a> {
    category: &'a str,
    cheatsheets: Vec<&'a Cheatsheet>,
}

#[derive(Serialize)]
struct IndexPage<'a> {
    cheatsheets: Vec<&'a Cheatsheet>,
    cheatsheets_count: usize,
    categories: Vec<CategoryGroup<'a>>,
    alpine_url: &'a str,
}

/// Cleans, parses and splices one cheatsheet, returning the body HTML.
pub fn render_markdown(
    preprocessor: &MarkdownPreprocessor,
    markdown: &str,
    path: &str,
) -> Result<RenderedCheatsheet, CheatsheetError> {
    let cleaned = preprocessor.cleanup(markdown);
    let mut doc = preprocessor.parse(&cleaned)?;
    let navigation = build_navigation(&mut doc, path)?;
    Ok(RenderedCheatsheet {
        content: to_html(&doc),
        navigation,
    })
}

pub fn render_cheatsheet_html(
    cheatsheet: &Cheatsheet,
    ctx: &RenderContext<'_>,
) -> Result<String, CheatsheetError> {
    let rendered = render_markdown(ctx.preprocessor, &cheatsheet.markdown, &cheatsheet.md_file_name)?;
    let page = CheatsheetPage {
        title: &cheatsheet.title,
        md_file_name: &cheatsheet.md_file_name,
        content: &rendered.content,
        toc: &rendered.navigation.toc,
        search_index_static: search_index_json(&rendered.navigation.search_index)?,
        alpine_url: ctx.alpine_url,
    };
    ctx.templates.render(CHEATSHEET_TEMPLATE, &page)
}

/// Renders `/index.html` (main cheatsheets only) or `/all.html`.
pub fn render_index_html(
    cheatsheets: &[Cheatsheet],
    all: bool,
    ctx: &RenderContext<'_>,
) -> Result<String, CheatsheetError> {
    let mut listed: Vec<&Cheatsheet> = cheatsheets.iter().filter(|cs| all || cs.in_main).collect();
    listed.sort_by_cached_key(|cs| cs.title.to_lowercase());

    let mut by_category: BTreeMap<&str, Vec<&Cheatsheet>> = BTreeMap::new();
    for cs in listed.iter().copied() {
        if let Some(category) = cs.category() {
            by_category.entry(category).or_default().push(cs);
        }
    }

    let page = IndexPage {
        cheatsheets_count: listed.len(),
        categories: by_category
            .into_iter()
            .map(|(category, cheatsheets)| CategoryGroup {
                category,
                cheatsheets,
            })
            .collect(),
        cheatsheets: listed,
        alpine_url: ctx.alpine_url,
    };
    ctx.templates.render(INDEX_TEMPLATE, &page)
}
