pub mod cheatsheet;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod front_matter;
pub mod html;
pub mod parse;
pub mod render;
pub mod slug;
pub mod template;
pub mod toc;

pub use cheatsheet::{
    Cheatsheet, base_name, discover_markdown, find_by_name, read_cheatsheets, unique_names,
};
pub use config::{DEFAULT_CONFIG_FILE, SiteConfig, StaticFile};
pub use document::{Document, Heading, NodeId, NodeKind, WalkEvent};
pub use error::CheatsheetError;
pub use format::{format_duration, format_size};
pub use front_matter::{CheatsheetMeta, parse_meta, split_front_matter};
pub use html::to_html;
pub use parse::{MarkdownPreprocessor, normalize_newlines};
pub use render::{
    RenderContext, RenderedCheatsheet, render_cheatsheet_html, render_index_html, render_markdown,
};
pub use slug::{HeadingIds, slugify_heading};
pub use template::{CHEATSHEET_TEMPLATE, INDEX_TEMPLATE, PageTemplates, TemplateSource};
pub use toc::{
    HeadingRecord, Navigation, SearchIndexEntry, TocNode, build_navigation, build_toc,
    extract_headings, flatten, generate_fragments, render_mini_toc, search_index_json,
    splice_fragments,
};
