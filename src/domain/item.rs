use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One scraped listing.
///
/// Identity is the site-assigned `id` alone; fields that could not be located
/// on the page stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub brand: String,
    pub price: String,
    pub size: String,
    pub condition: String,
    pub img_urls: Vec<String>,
    /// Site-specific attributes (e.g. `subtitle`, `category`, `status`).
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

const FIXED_FIELDS: &[&str] = &[
    "id",
    "url",
    "title",
    "description",
    "brand",
    "price",
    "size",
    "condition",
    "img_urls",
];

impl Item {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn num_imgs(&self) -> usize {
        self.img_urls.len()
    }

    /// Stores a site-specific attribute, ignoring empty values.
    ///
    /// Extras are flattened next to the fixed fields when serialized, so a key
    /// that names one of them is stored as `extra_<key>` instead.
    pub fn set_extra(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        let key = if FIXED_FIELDS.contains(&key) {
            format!("extra_{}", key)
        } else {
            key.to_string()
        };
        self.extra.insert(key, value);
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    /// Folds data gathered from the item's detail page into the listing record.
    pub fn apply_detail(&mut self, detail: ItemDetail) {
        if !detail.img_urls.is_empty() {
            self.img_urls = detail.img_urls;
        }
        for (key, value) in detail.extra {
            self.set_extra(&key, value);
        }
    }
}

/// Extra fields read from an item's own page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDetail {
    pub img_urls: Vec<String>,
    pub extra: BTreeMap<String, String>,
}

/// Items captured during one pagination step of a page-paginated site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_idx: usize,
    pub items: Vec<Item>,
}

impl Page {
    pub fn new(page_idx: usize, items: Vec<Item>) -> Self {
        Self { page_idx, items }
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }
}
