use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::CheatsheetError;

pub const CHEATSHEET_TEMPLATE: &str = "cheatsheet";
pub const INDEX_TEMPLATE: &str = "index";
const TOC_ENTRY_PARTIAL: &str = "toc_entry";

const EMBEDDED: [(&str, &str); 3] = [
    (
        CHEATSHEET_TEMPLATE,
        include_str!("../templates/cheatsheet.tmpl.html"),
    ),
    (INDEX_TEMPLATE, include_str!("../templates/index.tmpl.html")),
    (
        TOC_ENTRY_PARTIAL,
        include_str!("../templates/toc_entry.tmpl.html"),
    ),
];

/// Where a registered template came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateSource {
    Override(PathBuf),
    Embedded,
}

/// Page templates: `<www_dir>/<name>.tmpl.html` when present, otherwise the
/// copy compiled into the crate.
#[derive(Debug)]
pub struct PageTemplates {
    registry: Handlebars<'static>,
    sources: Vec<(String, TemplateSource)>,
}

impl PageTemplates {
    pub fn embedded() -> Result<Self, CheatsheetError> {
        Self::load(None)
    }

    pub fn load(www_dir: Option<&Path>) -> Result<Self, CheatsheetError> {
        let mut registry = Handlebars::new();
        let mut sources = Vec::new();

        for (name, embedded) in EMBEDDED {
            let override_path = www_dir
                .map(|dir| dir.join(format!("{name}.tmpl.html")))
                .filter(|path| path.is_file());
            let (text, source) = match override_path {
                Some(path) => (
                    std::fs::read_to_string(&path)?,
                    TemplateSource::Override(path),
                ),
                None => (embedded.to_string(), TemplateSource::Embedded),
            };

            let registered = if name == TOC_ENTRY_PARTIAL {
                registry.register_partial(name, text)
            } else {
                registry.register_template_string(name, text)
            };
            registered.map_err(|err| CheatsheetError::from(err).context(name))?;
            sources.push((name.to_string(), source));
        }

        Ok(Self { registry, sources })
    }

    pub fn source(&self, name: &str) -> Option<&TemplateSource> {
        self.sources
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, source)| source)
    }

    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, CheatsheetError> {
        self.registry
            .render(name, context)
            .map_err(|err| CheatsheetError::from(err).context(name))
    }
}
