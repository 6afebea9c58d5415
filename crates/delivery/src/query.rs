use content::MAX_INCLUDE_DEPTH;
use serde::{Deserialize, Serialize};

/// Include depth the delivery API applies when a query sets none.
pub const DEFAULT_INCLUDE: u8 = 1;

/// Field the language selector filters on.
pub const DEFAULT_LANGUAGE_FIELD: &str = "localeId";

/// One entries listing: content type, include depth, locale and equality
/// filters on fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryQuery {
    pub content_type: String,
    #[serde(default)]
    pub include: Option<u8>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub field_filters: Vec<(String, String)>,
}

impl EntryQuery {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Self::default()
        }
    }

    /// Set the include depth, clamped to what the API accepts.
    pub fn include(mut self, depth: u8) -> Self {
        self.include = Some(depth.min(MAX_INCLUDE_DEPTH));
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Add a `fields.<name>=<value>` filter.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field_filters.push((name.into(), value.into()));
        self
    }

    pub fn scoped(self, scope: &LocaleScope, language_field: &str) -> Self {
        scope.apply(self, language_field)
    }

    /// Depth the response will be resolved to.
    pub fn include_depth(&self) -> u8 {
        self.include.unwrap_or(DEFAULT_INCLUDE)
    }

    /// Query-string parameters in a stable order.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("content_type".to_string(), self.content_type.clone())];
        if let Some(include) = self.include {
            params.push(("include".to_string(), include.to_string()));
        }
        if let Some(locale) = &self.locale {
            params.push(("locale".to_string(), locale.clone()));
        }
        for (name, value) in &self.field_filters {
            params.push((format!("fields.{name}"), value.clone()));
        }
        params
    }
}

/// Locale and language selection taken from a request path.
///
/// `locale` is the delivery API's own localisation; `language` selects
/// records by a language field on the content. Neither changes how records
/// are normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleScope {
    pub locale: Option<String>,
    pub language: Option<String>,
}

impl LocaleScope {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn locale(locale: impl Into<String>) -> Self {
        Self {
            locale: Some(locale.into()),
            language: None,
        }
    }

    pub fn language(language: impl Into<String>) -> Self {
        Self {
            locale: None,
            language: Some(language.into()),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.locale.is_none() && self.language.is_none()
    }

    pub fn apply(&self, mut query: EntryQuery, language_field: &str) -> EntryQuery {
        if let Some(locale) = &self.locale {
            query = query.locale(locale.clone());
        }
        if let Some(language) = &self.language {
            query = query.field(language_field, language.clone());
        }
        query
    }
}
