//! Injected collaborators consumed by transformers.
//!
//! Labels, field names, representative strings, routes, translation, and
//! date/precision handling all belong to layers outside the core. They are
//! supplied as functions on a [`Dependencies`] value that is built once,
//! before the registry, and shared read-only through an `Arc`.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use weft_reflect::Precision;
use weft_types::{Object, TypeName};

use crate::config::MapperConfig;

pub type DisplayFn = Arc<dyn Fn(&TypeName, &str) -> String + Send + Sync>;
pub type NameFn = Arc<dyn Fn(&str) -> String + Send + Sync>;
pub type RepresentativeFn = Arc<dyn Fn(&Object) -> String + Send + Sync>;
pub type RouteFn = Arc<dyn Fn(&TypeName) -> String + Send + Sync>;
pub type TranslateFn = Arc<dyn Fn(&str) -> String + Send + Sync>;
pub type FormatDateFn = Arc<dyn Fn(&NaiveDateTime) -> String + Send + Sync>;
pub type ParseDateFn = Arc<dyn Fn(&str) -> Option<NaiveDateTime> + Send + Sync>;
pub type PrecisionFn = Arc<dyn Fn(&TypeName, &str) -> Option<Precision> + Send + Sync>;

/// Functions transformers call into the excluded collaborators.
#[derive(Clone)]
pub struct Dependencies {
    /// Display label of a property (before translation).
    pub display_of: DisplayFn,
    /// Form element id of a property.
    pub field_id_of: NameFn,
    /// Form field name of a property.
    pub field_name_of: NameFn,
    /// Human-readable representative string of an object.
    pub representative_value_of: RepresentativeFn,
    /// Route of a type, without the lookup suffix.
    pub route_of: RouteFn,
    pub tr: TranslateFn,
    pub format_date: FormatDateFn,
    pub parse_date: ParseDateFn,
    pub precision_of: PrecisionFn,
}

impl Default for Dependencies {
    fn default() -> Self {
        Self::from_config(&MapperConfig::default())
    }
}

impl Dependencies {
    /// Safe defaults, with date handling taken from the configuration.
    pub fn from_config(config: &MapperConfig) -> Self {
        let display_format = config.date_format.clone();
        let parse_format = config.date_format.clone();
        Self {
            display_of: Arc::new(|_, property| property.to_string()),
            field_id_of: Arc::new(str::to_string),
            field_name_of: Arc::new(str::to_string),
            representative_value_of: Arc::new(|object| object.type_name().to_string()),
            route_of: Arc::new(|type_name| format!("/{type_name}")),
            tr: Arc::new(str::to_string),
            format_date: Arc::new(move |date| date.format(&display_format).to_string()),
            parse_date: Arc::new(move |text| parse_date(text, &parse_format)),
            precision_of: Arc::new(|_, _| None),
        }
    }

    pub fn with_display_of(
        mut self,
        f: impl Fn(&TypeName, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.display_of = Arc::new(f);
        self
    }

    pub fn with_field_id_of(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.field_id_of = Arc::new(f);
        self
    }

    pub fn with_field_name_of(
        mut self,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.field_name_of = Arc::new(f);
        self
    }

    pub fn with_representative_value_of(
        mut self,
        f: impl Fn(&Object) -> String + Send + Sync + 'static,
    ) -> Self {
        self.representative_value_of = Arc::new(f);
        self
    }

    pub fn with_route_of(mut self, f: impl Fn(&TypeName) -> String + Send + Sync + 'static) -> Self {
        self.route_of = Arc::new(f);
        self
    }

    pub fn with_tr(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.tr = Arc::new(f);
        self
    }

    pub fn with_format_date(
        mut self,
        f: impl Fn(&NaiveDateTime) -> String + Send + Sync + 'static,
    ) -> Self {
        self.format_date = Arc::new(f);
        self
    }

    pub fn with_parse_date(
        mut self,
        f: impl Fn(&str) -> Option<NaiveDateTime> + Send + Sync + 'static,
    ) -> Self {
        self.parse_date = Arc::new(f);
        self
    }

    pub fn with_precision_of(
        mut self,
        f: impl Fn(&TypeName, &str) -> Option<Precision> + Send + Sync + 'static,
    ) -> Self {
        self.precision_of = Arc::new(f);
        self
    }

    /// Translated display label of `owner.property`.
    pub fn label_text(&self, owner: &TypeName, property: &str) -> String {
        (self.tr)(&(self.display_of)(owner, property))
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies").finish_non_exhaustive()
    }
}

/// Parse with the configured format, then fall back to ISO forms.
fn parse_date(text: &str, format: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(text, format)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, format)
                .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
